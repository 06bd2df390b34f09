//! Embedding generation services for vector similarity search
//!
//! Provides a remote (Voyage AI) embedder for production and a deterministic
//! hashing embedder for offline runs and tests. Ingestion and query must use
//! the same service instance so vectors live in one space.

pub mod hashing;
pub mod remote;

pub use hashing::{HashingEmbeddingService, HASHING_EMBEDDING_DIM};
pub use remote::RemoteEmbeddingService;

use crate::config::{EmbeddingProvider, EmbeddingSettings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Embedding service trait defining required operations
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batched), in input order
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensionality
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Build the embedding service selected in configuration
pub fn create_embedding_service(settings: &EmbeddingSettings) -> Result<Arc<dyn EmbeddingService>> {
    match settings.provider {
        EmbeddingProvider::Voyage => {
            info!(
                "Using Voyage AI embeddings: model={}, dimensions={}",
                settings.model, settings.dimensions
            );
            Ok(Arc::new(RemoteEmbeddingService::new(
                settings.api_key.clone(),
                Some(settings.model.clone()),
                Some(settings.base_url.clone()),
                settings.dimensions,
            )?))
        }
        EmbeddingProvider::Hashing => {
            info!("Using offline hashing embeddings ({} dimensions)", HASHING_EMBEDDING_DIM);
            Ok(Arc::new(HashingEmbeddingService::new()))
        }
    }
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}
