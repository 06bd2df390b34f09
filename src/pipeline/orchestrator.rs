//! Request orchestration
//!
//! One `analyze` call: validate URLs, fetch transcript, comments and
//! statistics while ingesting the brand page, then run the revision loop
//! and assemble the report. Every error leaving [`Orchestrator::analyze`]
//! is one of the five caller-facing classes.

use super::revision::{LoopOutcome, RevisionLoop};
use super::state::StateTracker;
use crate::agents::{Analyst, AnalystInput, Evaluator, LlmAnalyst, LlmEvaluator};
use crate::config::BrandscopeConfig;
use crate::embeddings::{create_embedding_service, EmbeddingService};
use crate::error::{BrandscopeError, Result};
use crate::knowledge::{Chunker, KnowledgeStore, RetrievalTool};
use crate::services::{LanguageModel, LlmService};
use crate::sources::{
    validate_brand_url, validate_video_url, BrandSource, HttpBrandSource, VideoSource,
    YouTubeSource,
};
use crate::types::{
    AnalyzeResult, ApprovalStatus, Insights, RequestId, SourceTag, VideoId, VideoStats,
};
use chrono::Utc;
use reqwest::Url;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

/// Per-request tuning, usually derived from [`BrandscopeConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub max_iterations: u32,
    pub max_comments: usize,
    pub request_draft: bool,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub transcript_chunk_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&BrandscopeConfig::default())
    }
}

impl From<&BrandscopeConfig> for PipelineOptions {
    fn from(config: &BrandscopeConfig) -> Self {
        Self {
            max_iterations: config.pipeline.max_iterations,
            max_comments: config.pipeline.max_comments,
            request_draft: config.pipeline.draft_comment,
            chunk_size: config.knowledge.chunk_size,
            chunk_overlap: config.knowledge.chunk_overlap,
            top_k: config.knowledge.top_k,
            transcript_chunk_size: config.pipeline.transcript_chunk_size,
        }
    }
}

impl PipelineOptions {
    pub fn validate(&self) -> Result<()> {
        Chunker::new(self.chunk_size, self.chunk_overlap)?;
        Chunker::new(self.transcript_chunk_size, 0)?;
        if self.max_iterations == 0 {
            return Err(BrandscopeError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.top_k == 0 {
            return Err(BrandscopeError::Config(
                "top_k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything fetched before the agents run
struct Gathered {
    transcript: String,
    comments: Vec<String>,
    stats: VideoStats,
    store: KnowledgeStore,
}

/// Drives the full analysis pipeline
pub struct Orchestrator {
    video: Arc<dyn VideoSource>,
    brand: Arc<dyn BrandSource>,
    embedder: Arc<dyn EmbeddingService>,
    analyst: Arc<dyn Analyst>,
    evaluator: Arc<dyn Evaluator>,
    options: PipelineOptions,
}

impl Orchestrator {
    pub fn new(
        video: Arc<dyn VideoSource>,
        brand: Arc<dyn BrandSource>,
        embedder: Arc<dyn EmbeddingService>,
        analyst: Arc<dyn Analyst>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        Self {
            video,
            brand,
            embedder,
            analyst,
            evaluator,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Result<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// Build the production pipeline: YouTube, HTTP brand pages, the
    /// configured embedder and Anthropic-backed agents.
    pub fn from_config(config: &BrandscopeConfig) -> Result<Self> {
        let video: Arc<dyn VideoSource> = Arc::new(YouTubeSource::new(&config.sources)?);
        let brand: Arc<dyn BrandSource> =
            Arc::new(HttpBrandSource::new(config.sources.request_timeout_secs)?);
        let embedder = create_embedding_service(&config.embeddings)?;
        let model: Arc<dyn LanguageModel> = Arc::new(LlmService::new(config.llm.clone())?);
        let analyst: Arc<dyn Analyst> = Arc::new(
            LlmAnalyst::new(Arc::clone(&model)).with_max_tool_rounds(config.llm.max_tool_rounds),
        );
        let evaluator: Arc<dyn Evaluator> = Arc::new(LlmEvaluator::new(model));

        Self::new(video, brand, embedder, analyst, evaluator).with_options(config.into())
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Analyze one video against one brand
    pub async fn analyze(&self, video_url: &str, brand_url: &str) -> Result<AnalyzeResult> {
        let validation = validate_video_url(video_url);
        let video_id = match validation.video_id {
            Some(id) if validation.valid => id,
            _ => {
                return Err(BrandscopeError::InvalidUrl(format!(
                    "not a recognised video URL: '{}'",
                    video_url
                )))
            }
        };
        let brand_url = validate_brand_url(brand_url)?;

        let request_id = RequestId::new();
        let span = info_span!(
            "analyze",
            request_id = %request_id,
            video = %video_id,
            brand = %brand_url
        );

        self.run(request_id, video_id, brand_url).instrument(span).await
    }

    async fn run(
        &self,
        request_id: RequestId,
        video_id: VideoId,
        brand_url: Url,
    ) -> Result<AnalyzeResult> {
        let mut tracker = StateTracker::new(request_id);

        let gathered = match self.gather(&video_id, &brand_url).await {
            Ok(gathered) => gathered,
            Err(e) => {
                tracker.fail(&e);
                return Err(e);
            }
        };

        let transcript_chunker = match Chunker::new(self.options.transcript_chunk_size, 0) {
            Ok(chunker) => chunker,
            Err(e) => {
                let e = e.into_ingestion();
                tracker.fail(&e);
                return Err(e);
            }
        };
        let transcript_chunks =
            transcript_chunker.chunk(&gathered.transcript, &SourceTag::transcript(&video_id));

        info!(
            "Gathered {} transcript chunks, {} comments, {} brand chunks",
            transcript_chunks.len(),
            gathered.comments.len(),
            gathered.store.len()
        );

        let input = AnalystInput {
            video_id: video_id.clone(),
            brand_url: brand_url.to_string(),
            transcript_chunks,
            comments: gathered.comments,
            stats: gathered.stats,
            request_draft: self.options.request_draft,
        };

        let retrieval = RetrievalTool::with_top_k(&gathered.store, self.options.top_k);
        let outcome = RevisionLoop::new(
            self.analyst.as_ref(),
            self.evaluator.as_ref(),
            self.options.max_iterations,
        )
        .run(&input, &retrieval, &mut tracker)
        .await?;

        info!(
            "Finished in {} attempt(s): {}",
            outcome.iterations(),
            tracker.current()
        );

        Ok(build_result(request_id, video_id, input.stats, outcome))
    }

    /// Fetch video data and build the brand store concurrently, failing fast
    async fn gather(&self, video_id: &VideoId, brand_url: &Url) -> Result<Gathered> {
        let (transcript, comments, stats, store) = tokio::try_join!(
            async {
                self.video
                    .fetch_transcript(video_id)
                    .await
                    .map_err(|e| e.into_fetch("transcript"))
            },
            async {
                self.video
                    .fetch_comments(video_id, self.options.max_comments)
                    .await
                    .map_err(|e| e.into_fetch("comments"))
            },
            async {
                self.video
                    .fetch_statistics(video_id)
                    .await
                    .map_err(|e| e.into_fetch("statistics"))
            },
            self.build_knowledge(brand_url),
        )?;

        Ok(Gathered {
            transcript,
            comments,
            stats,
            store,
        })
    }

    /// Fetch, chunk and embed the brand page into a fresh store
    async fn build_knowledge(&self, brand_url: &Url) -> Result<KnowledgeStore> {
        let document = self
            .brand
            .fetch_brand_document(brand_url)
            .await
            .map_err(|e| e.into_fetch("brand page"))?;

        let chunker = Chunker::new(self.options.chunk_size, self.options.chunk_overlap)
            .map_err(BrandscopeError::into_ingestion)?;
        let chunks = chunker.chunk(&document, &SourceTag::brand(brand_url.as_str()));

        let mut store = KnowledgeStore::new(Arc::clone(&self.embedder));
        store
            .insert(chunks)
            .await
            .map_err(BrandscopeError::into_ingestion)?;
        Ok(store)
    }
}

/// Summary used when no analysis was approved
fn unapproved_summary(outcome_iterations: u32, key_points: &[String]) -> String {
    format!(
        "Not approved after {} review attempt(s). Latest findings: {}",
        outcome_iterations,
        key_points.join("; ")
    )
}

fn build_result(
    request_id: RequestId,
    video_id: VideoId,
    stats: VideoStats,
    outcome: LoopOutcome,
) -> AnalyzeResult {
    let iterations = outcome.iterations();
    let (analysis, summary, status, reviewer_feedback) = match outcome {
        LoopOutcome::Approved {
            analysis, verdict, ..
        } => (
            analysis,
            verdict.output().to_string(),
            ApprovalStatus::Approved,
            None,
        ),
        LoopOutcome::Exhausted {
            analysis,
            last_feedback,
            iterations,
        } => {
            let summary = unapproved_summary(iterations, analysis.key_points());
            (analysis, summary, ApprovalStatus::Exhausted, Some(last_feedback))
        }
    };

    AnalyzeResult {
        request_id,
        video_id,
        relevance: analysis.relevance(),
        insights: Insights {
            summary,
            sentiment: analysis.sentiment(),
            key_points: analysis.key_points().to_vec(),
            video_stats: stats,
            draft_comment: analysis.draft_comment().map(str::to_string),
        },
        approval_status: status,
        iterations,
        reviewer_feedback,
        analyzed_at: Utc::now(),
    }
}
