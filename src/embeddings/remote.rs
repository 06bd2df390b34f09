//! Remote embedding service using Voyage AI API
//!
//! Provides semantic embeddings via Voyage AI's text embedding models. The
//! same instance embeds brand chunks at ingestion and queries at retrieval.

use super::EmbeddingService;
use crate::error::{BrandscopeError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Default Voyage AI endpoint
pub const VOYAGE_BASE_URL: &str = "https://api.voyageai.com/v1";

/// Maximum texts per batch request
pub const MAX_BATCH_SIZE: usize = 128;

/// Maximum retry attempts for rate limiting
const MAX_RETRIES: usize = 3;

/// Backoff base duration in milliseconds
const BACKOFF_BASE_MS: u64 = 1000;

/// Request timeout duration
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Voyage AI embedding service
pub struct RemoteEmbeddingService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    dimensions: usize,
}

/// Voyage AI API request structure
#[derive(Debug, Serialize)]
struct VoyageRequest {
    input: Vec<String>,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dimension: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    truncation: Option<bool>,
}

/// Voyage AI API response structure
#[derive(Debug, Deserialize)]
struct VoyageResponse {
    data: Vec<EmbeddingData>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: usize,
}

/// API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<String>,
}

impl RemoteEmbeddingService {
    /// Create a new remote embedding service
    ///
    /// # Arguments
    /// * `api_key` - Voyage AI API key
    /// * `model` - Model name (defaults to "voyage-3-large")
    /// * `base_url` - API base URL (defaults to Voyage AI endpoint)
    /// * `dimensions` - Requested output dimension
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        dimensions: usize,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(BrandscopeError::Config(
                "VOYAGE_API_KEY not set (or use embeddings.provider = \"hashing\")".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let model = model.unwrap_or_else(|| "voyage-3-large".to_string());
        let base_url = base_url.unwrap_or_else(|| VOYAGE_BASE_URL.to_string());

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            dimensions,
        })
    }

    /// Call Voyage AI API with retry logic and rate limiting
    async fn call_api_with_retry(&self, texts: &[String]) -> Result<VoyageResponse> {
        let mut retries = 0;

        loop {
            match self.call_api(texts).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if retries >= MAX_RETRIES {
                        return Err(e);
                    }

                    let should_retry = match &e {
                        BrandscopeError::RateLimitExceeded(_) => true,
                        BrandscopeError::Http(err) => err.is_timeout() || err.is_connect(),
                        _ => false,
                    };

                    if !should_retry {
                        return Err(e);
                    }

                    // Exponential backoff
                    let backoff_ms = BACKOFF_BASE_MS * 2_u64.pow(retries as u32);
                    warn!(
                        "Embedding call failed, retrying after {}ms (attempt {}/{})",
                        backoff_ms,
                        retries + 1,
                        MAX_RETRIES
                    );

                    sleep(Duration::from_millis(backoff_ms)).await;
                    retries += 1;
                }
            }
        }
    }

    /// Call Voyage AI API once (no retry)
    async fn call_api(&self, texts: &[String]) -> Result<VoyageResponse> {
        debug!(
            "Calling Voyage AI API: {} texts, model: {}",
            texts.len(),
            self.model
        );

        let request = VoyageRequest {
            input: texts.to_vec(),
            model: self.model.clone(),
            output_dimension: Some(self.dimensions),
            truncation: Some(true),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        match status {
            StatusCode::OK => {
                let voyage_response = response.json::<VoyageResponse>().await.map_err(|e| {
                    BrandscopeError::Embedding(format!("Failed to parse response: {}", e))
                })?;

                debug!(
                    "Generated {} embeddings ({} tokens)",
                    voyage_response.data.len(),
                    voyage_response.usage.total_tokens
                );

                Ok(voyage_response)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(BrandscopeError::Embedding(
                "Invalid or missing Voyage AI API key".to_string(),
            )),
            StatusCode::TOO_MANY_REQUESTS => Err(BrandscopeError::RateLimitExceeded(
                "Voyage AI rate limit exceeded".to_string(),
            )),
            StatusCode::BAD_REQUEST => {
                let error_msg = response
                    .json::<ErrorResponse>()
                    .await
                    .ok()
                    .and_then(|e| e.detail)
                    .unwrap_or_else(|| "Bad request".to_string());

                Err(BrandscopeError::Embedding(error_msg))
            }
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                Err(BrandscopeError::Embedding(format!(
                    "API error (status {}): {}",
                    status, error_text
                )))
            }
        }
    }

    /// Validate text input
    fn validate_text(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(BrandscopeError::Embedding(
                "Text cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate embedding dimensions
    fn validate_embedding(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(BrandscopeError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        // Check for invalid values (NaN, Inf)
        if embedding.iter().any(|&x| !x.is_finite()) {
            return Err(BrandscopeError::Embedding(
                "Embedding contains invalid values (NaN or Inf)".to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl EmbeddingService for RemoteEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.validate_text(text)?;

        let texts = vec![text.to_string()];
        let response = self.call_api_with_retry(&texts).await?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| BrandscopeError::Embedding("Empty response from API".to_string()))?
            .embedding;

        self.validate_embedding(&embedding)?;

        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        for text in texts {
            self.validate_text(text)?;
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        // Process in chunks to respect batch size limit
        for chunk in texts.chunks(MAX_BATCH_SIZE) {
            let text_strings: Vec<String> = chunk.iter().map(|s| s.to_string()).collect();
            let response = self.call_api_with_retry(&text_strings).await?;

            if response.data.len() != chunk.len() {
                return Err(BrandscopeError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    response.data.len()
                )));
            }

            // Sort by index to maintain order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            for embedding_data in embeddings {
                self.validate_embedding(&embedding_data.embedding)?;
                all_embeddings.push(embedding_data.embedding);
            }
        }

        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> RemoteEmbeddingService {
        RemoteEmbeddingService::new("test-key".to_string(), None, None, 1024).unwrap()
    }

    #[test]
    fn test_service_creation() {
        let service = RemoteEmbeddingService::new(
            "test-key".to_string(),
            Some("voyage-3-large".to_string()),
            Some("https://proxy.internal/v1/".to_string()),
            1024,
        )
        .unwrap();

        assert_eq!(service.dimensions(), 1024);
        assert_eq!(service.model_name(), "voyage-3-large");
        assert_eq!(service.base_url, "https://proxy.internal/v1");
    }

    #[test]
    fn test_empty_api_key_error() {
        let result = RemoteEmbeddingService::new("".to_string(), None, None, 1024);
        assert!(matches!(result, Err(BrandscopeError::Config(_))));
    }

    #[test]
    fn test_validate_text() {
        let service = service();

        assert!(service.validate_text("valid text").is_ok());
        assert!(service.validate_text("").is_err());
        assert!(service.validate_text("   ").is_err());
    }

    #[test]
    fn test_validate_embedding() {
        let service = service();

        assert!(service.validate_embedding(&vec![0.5; 1024]).is_ok());

        let wrong_dims = service.validate_embedding(&vec![0.5; 512]);
        assert!(matches!(
            wrong_dims,
            Err(BrandscopeError::DimensionMismatch {
                expected: 1024,
                actual: 512
            })
        ));

        let mut nan_embedding = vec![0.5; 1024];
        nan_embedding[0] = f32::NAN;
        assert!(service.validate_embedding(&nan_embedding).is_err());

        let mut inf_embedding = vec![0.5; 1024];
        inf_embedding[0] = f32::INFINITY;
        assert!(service.validate_embedding(&inf_embedding).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires VOYAGE_API_KEY; run with: cargo test -- --ignored
    async fn test_embed_single_text() {
        let api_key = std::env::var("VOYAGE_API_KEY").expect("VOYAGE_API_KEY not set");
        let service = RemoteEmbeddingService::new(api_key, None, None, 1024).unwrap();

        let embedding = service.embed("Trail running shoes review").await.unwrap();
        assert_eq!(embedding.len(), 1024);
    }
}
