//! Fixed-data sources for tests and offline runs

use super::{BrandSource, VideoSource};
use crate::error::{BrandscopeError, Result};
use crate::types::{VideoId, VideoStats};
use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;

/// Serves one canned video regardless of id
#[derive(Debug, Clone, Default)]
pub struct InMemoryVideoSource {
    /// `None` behaves like a video without captions
    pub transcript: Option<String>,
    pub comments: Vec<String>,
    pub stats: VideoStats,
}

impl InMemoryVideoSource {
    pub fn new(transcript: impl Into<String>, comments: Vec<String>, stats: VideoStats) -> Self {
        Self {
            transcript: Some(transcript.into()),
            comments,
            stats,
        }
    }
}

#[async_trait]
impl VideoSource for InMemoryVideoSource {
    async fn fetch_transcript(&self, video: &VideoId) -> Result<String> {
        self.transcript.clone().ok_or_else(|| {
            BrandscopeError::fetch("transcript", format!("no captions available for video {}", video))
        })
    }

    async fn fetch_comments(&self, _video: &VideoId, limit: usize) -> Result<Vec<String>> {
        Ok(self.comments.iter().take(limit).cloned().collect())
    }

    async fn fetch_statistics(&self, _video: &VideoId) -> Result<VideoStats> {
        Ok(self.stats)
    }
}

/// Serves brand documents keyed by URL
#[derive(Debug, Clone, Default)]
pub struct InMemoryBrandSource {
    documents: HashMap<String, String>,
}

impl InMemoryBrandSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page; `url` is stored in its parsed, normalized form
    pub fn with_document(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        let url = url.into();
        let key = Url::parse(&url).map(|u| u.to_string()).unwrap_or(url);
        self.documents.insert(key, text.into());
        self
    }
}

#[async_trait]
impl BrandSource for InMemoryBrandSource {
    async fn fetch_brand_document(&self, url: &Url) -> Result<String> {
        self.documents
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| BrandscopeError::fetch("brand page", format!("{} returned 404", url)))
    }
}
