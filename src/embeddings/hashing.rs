//! Deterministic offline embedder
//!
//! Hashes character n-grams (2..=4) and whole words into a fixed number of
//! buckets, then L2-normalises. No network, no model download; identical
//! input always yields the identical vector. Lexical rather than semantic,
//! which is enough for offline runs and for exercising the store in tests.

use super::EmbeddingService;
use crate::error::Result;
use async_trait::async_trait;

/// Embedding dimension (matches all-MiniLM-L6-v2 so stores can be swapped)
pub const HASHING_EMBEDDING_DIM: usize = 384;

/// Weight of a whole-word hit relative to an n-gram hit
const WORD_WEIGHT: f32 = 2.0;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone, Default)]
pub struct HashingEmbeddingService;

impl HashingEmbeddingService {
    pub fn new() -> Self {
        Self
    }

    /// Pure embedding function behind the service
    pub fn hash_embedding(text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; HASHING_EMBEDDING_DIM];

        // Character n-grams hashing
        let text_lower = text.to_lowercase();
        let chars: Vec<char> = text_lower.chars().collect();

        for window_size in 2..=4 {
            for window in chars.windows(window_size) {
                let gram: String = window.iter().collect();
                embedding[bucket(&gram)] += 1.0;
            }
        }

        // Word-level hashing
        for word in text_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            embedding[bucket(word)] += WORD_WEIGHT;
        }

        // Normalize
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in &mut embedding {
                *val /= magnitude;
            }
        }

        embedding
    }
}

/// FNV-1a over the UTF-8 bytes; fixed so vectors stay comparable across
/// builds and toolchains
fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

fn bucket(token: &str) -> usize {
    (fnv1a(token) % HASHING_EMBEDDING_DIM as u64) as usize
}

#[async_trait]
impl EmbeddingService for HashingEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::hash_embedding(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::hash_embedding(t)).collect())
    }

    fn dimensions(&self) -> usize {
        HASHING_EMBEDDING_DIM
    }

    fn model_name(&self) -> &str {
        "hashing-ngram-384"
    }
}
