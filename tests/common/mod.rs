//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use brandscope_core::error::{BrandscopeError, Result};
use brandscope_core::sources::{InMemoryBrandSource, InMemoryVideoSource};
use brandscope_core::{
    AnalysisResult, Analyst, EmbeddingService, Evaluator, HashingEmbeddingService, Orchestrator,
    PipelineOptions, Relevance, Sentiment, VideoStats,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const BRAND_URL: &str = "https://trailrunner.example/about";

pub const BRAND_PAGE: &str = "TrailRunner makes lightweight running shoes for mountain trails.\n\n\
Our shoes use recycled foam and a grippy outsole built for wet rock.\n\n\
We sponsor local ultramarathons and publish free training plans.";

pub const TRANSCRIPT: &str = "Today I am testing the new TrailRunner shoes on a muddy mountain loop. \
The grip on wet rock is excellent and the foam feels light. \
After twenty kilometres my feet were still comfortable.";

/// A valid analysis with the given relevance
pub fn analysis(relevance: Relevance) -> AnalysisResult {
    AnalysisResult::new(
        relevance,
        Sentiment::Positive,
        vec![
            "Reviewer praises grip on wet rock".to_string(),
            "Audience asks about sizing".to_string(),
            "Strong overlap with the brand's trail focus".to_string(),
        ],
        Some("Thanks for taking our shoes up the mountain!".to_string()),
    )
    .expect("valid analysis")
}

pub fn stats() -> VideoStats {
    VideoStats {
        views: 12_400,
        likes: 830,
        comment_count: 2,
    }
}

pub fn video_source() -> InMemoryVideoSource {
    InMemoryVideoSource::new(
        TRANSCRIPT,
        vec![
            "Do these run true to size?".to_string(),
            "Best trail shoe I've owned".to_string(),
        ],
        stats(),
    )
}

pub fn brand_source() -> InMemoryBrandSource {
    InMemoryBrandSource::new().with_document(BRAND_URL, BRAND_PAGE)
}

/// Orchestrator over in-memory sources and the hashing embedder
pub fn offline_orchestrator(analyst: Arc<dyn Analyst>, evaluator: Arc<dyn Evaluator>) -> Orchestrator {
    Orchestrator::new(
        Arc::new(video_source()),
        Arc::new(brand_source()),
        Arc::new(HashingEmbeddingService::new()),
        analyst,
        evaluator,
    )
    .with_options(PipelineOptions {
        chunk_size: 120,
        chunk_overlap: 20,
        ..PipelineOptions::default()
    })
    .expect("valid options")
}

/// Bag-of-words embedder over a fixed vocabulary.
///
/// Each dimension counts one vocabulary word, so similarity is exactly
/// word overlap. Unknown words are ignored.
pub struct VocabularyEmbedder {
    vocabulary: Vec<&'static str>,
    calls: AtomicUsize,
}

impl VocabularyEmbedder {
    pub fn new(vocabulary: Vec<&'static str>) -> Self {
        Self {
            vocabulary,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        self.vocabulary
            .iter()
            .map(|v| words.iter().filter(|w| *w == v).count() as f32)
            .collect()
    }
}

#[async_trait]
impl EmbeddingService for VocabularyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    fn model_name(&self) -> &str {
        "vocabulary"
    }
}

/// Embedder whose backend is always down
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingService for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(BrandscopeError::Embedding("service unavailable".to_string()))
    }

    async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Err(BrandscopeError::Embedding("service unavailable".to_string()))
    }

    fn dimensions(&self) -> usize {
        8
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}
