//! Request-scoped vector store over brand chunks
//!
//! Embedding is the only network-bound step. Similarity scoring and ranking
//! are pure functions over vectors so they can be exercised with synthetic
//! data.

use crate::embeddings::{cosine_similarity, EmbeddingService};
use crate::error::{BrandscopeError, Result};
use crate::types::{Chunk, EmbeddedChunk};
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Chunks per concurrent embedding request during ingestion
pub const INGEST_BATCH_SIZE: usize = 32;

/// A chunk returned by a query, with its similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// In-memory nearest-neighbour index, owned by a single request
pub struct KnowledgeStore {
    embedder: Arc<dyn EmbeddingService>,
    entries: Vec<EmbeddedChunk>,
    dimensions: Option<usize>,
}

impl KnowledgeStore {
    /// Create an empty store bound to one embedding service.
    ///
    /// Ingestion and queries both go through `embedder`.
    pub fn new(embedder: Arc<dyn EmbeddingService>) -> Self {
        Self {
            embedder,
            entries: Vec::new(),
            dimensions: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector dimensionality, fixed by the first insertion
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Stored entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &EmbeddedChunk> {
        self.entries.iter()
    }

    /// Embed and append chunks.
    ///
    /// Batches are embedded concurrently and re-assembled in input order.
    /// Whitespace-only chunks carry no signal and are skipped. Nothing is
    /// appended unless every batch succeeds.
    pub async fn insert(&mut self, chunks: Vec<Chunk>) -> Result<()> {
        let chunks: Vec<Chunk> = chunks
            .into_iter()
            .filter(|c| !c.content().trim().is_empty())
            .collect();

        if chunks.is_empty() {
            debug!("No non-blank chunks to insert");
            return Ok(());
        }

        let mut join_set: JoinSet<(usize, Result<Vec<Vec<f32>>>)> = JoinSet::new();

        for (batch_index, batch) in chunks.chunks(INGEST_BATCH_SIZE).enumerate() {
            let embedder = Arc::clone(&self.embedder);
            let texts: Vec<String> = batch.iter().map(|c| c.content().to_string()).collect();

            join_set.spawn(async move {
                let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
                (batch_index, embedder.embed_batch(&refs).await)
            });
        }

        let batch_count = chunks.len().div_ceil(INGEST_BATCH_SIZE);
        let mut batches: Vec<Option<Vec<Vec<f32>>>> = vec![None; batch_count];

        while let Some(joined) = join_set.join_next().await {
            let (batch_index, result) = joined.map_err(|e| {
                BrandscopeError::IngestionFailure(format!("embedding task failed: {}", e))
            })?;
            batches[batch_index] = Some(result?);
        }

        let vectors: Vec<Vec<f32>> = batches.into_iter().flatten().flatten().collect();
        if vectors.len() != chunks.len() {
            return Err(BrandscopeError::IngestionFailure(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let mut dimensions = self.dimensions;
        for vector in &vectors {
            match dimensions {
                Some(expected) if expected != vector.len() => {
                    return Err(BrandscopeError::DimensionMismatch {
                        expected,
                        actual: vector.len(),
                    });
                }
                Some(_) => {}
                None => dimensions = Some(vector.len()),
            }
        }

        self.dimensions = dimensions;
        self.entries.extend(
            chunks
                .into_iter()
                .zip(vectors)
                .map(|(chunk, vector)| EmbeddedChunk { chunk, vector }),
        );

        info!(
            "Knowledge store holds {} chunks ({} dims, model {})",
            self.entries.len(),
            self.dimensions.unwrap_or_default(),
            self.embedder.model_name()
        );
        Ok(())
    }

    /// Return up to `k` chunks most similar to `text`, best first.
    ///
    /// Fails with [`BrandscopeError::EmptyKnowledgeStore`] when nothing has
    /// been inserted, which is distinct from a successful empty result.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() {
            return Err(BrandscopeError::EmptyKnowledgeStore);
        }

        let query_vector = self.embedder.embed(text).await?;
        if let Some(expected) = self.dimensions {
            if query_vector.len() != expected {
                return Err(BrandscopeError::DimensionMismatch {
                    expected,
                    actual: query_vector.len(),
                });
            }
        }

        let ranked = rank(&query_vector, &self.entries, k);
        debug!("Query matched {} of {} chunks", ranked.len(), self.entries.len());

        Ok(ranked
            .into_iter()
            .map(|(index, score)| ScoredChunk {
                chunk: self.entries[index].chunk.clone(),
                score,
            })
            .collect())
    }
}

/// Top `k` entries by cosine similarity to `query`, as `(index, score)`.
///
/// Ties resolve to the earlier insertion.
pub fn rank(query: &[f32], entries: &[EmbeddedChunk], k: usize) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (i, cosine_similarity(query, &e.vector)))
        .collect();

    scored.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(&b.0),
        other => other,
    });
    scored.truncate(k);
    scored
}
