//! Error types for the Brandscope analysis pipeline
//!
//! This module provides structured error definitions using thiserror, with
//! anyhow accepted at the binary edge and converted on the way in.
//!
//! Five variants form the caller-facing failure taxonomy returned by
//! [`Orchestrator::analyze`](crate::pipeline::Orchestrator::analyze):
//! `InvalidUrl`, `FetchFailure`, `IngestionFailure`, `AgentUnavailable` and
//! `SchemaViolation`. The remaining variants are internal and get mapped onto
//! one of those five by the pipeline stage that observes them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Brandscope operations
#[derive(Error, Debug)]
pub enum BrandscopeError {
    /// A video or brand URL failed precondition checks
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// An upstream collaborator (transcript, comments, statistics, brand page) failed
    #[error("Failed to fetch {resource}: {message}")]
    FetchFailure { resource: String, message: String },

    /// Embedding or knowledge-store setup failed
    #[error("Knowledge ingestion failed: {0}")]
    IngestionFailure(String),

    /// The reasoning capability behind an agent could not be reached
    #[error("Agent unavailable: {0}")]
    AgentUnavailable(String),

    /// An agent's output could not be coerced into its required shape
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Knowledge store queried before anything was inserted
    #[error("Knowledge store is empty")]
    EmptyKnowledgeStore,

    /// Embedding dimensionality differs from the store's existing entries
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// LLM API request failed
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Remote API throttled the request
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Brandscope operations
pub type Result<T> = std::result::Result<T, BrandscopeError>;

/// Caller-facing failure classes, one per distinct retry decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    InvalidUrl,
    FetchFailure,
    IngestionFailure,
    AgentUnavailable,
    SchemaViolation,
}

impl FailureKind {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FailureKind::FetchFailure | FailureKind::IngestionFailure | FailureKind::AgentUnavailable
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidUrl => "InvalidUrl",
            FailureKind::FetchFailure => "FetchFailure",
            FailureKind::IngestionFailure => "IngestionFailure",
            FailureKind::AgentUnavailable => "AgentUnavailable",
            FailureKind::SchemaViolation => "SchemaViolation",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BrandscopeError {
    /// Shorthand for a fetch failure on a named resource
    pub fn fetch(resource: impl Into<String>, message: impl ToString) -> Self {
        BrandscopeError::FetchFailure {
            resource: resource.into(),
            message: message.to_string(),
        }
    }

    /// Classify into the caller-facing taxonomy.
    ///
    /// Returns `None` for internal variants that have not yet been mapped by
    /// a pipeline stage.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            BrandscopeError::InvalidUrl(_) => Some(FailureKind::InvalidUrl),
            BrandscopeError::FetchFailure { .. } => Some(FailureKind::FetchFailure),
            BrandscopeError::IngestionFailure(_) => Some(FailureKind::IngestionFailure),
            BrandscopeError::AgentUnavailable(_) => Some(FailureKind::AgentUnavailable),
            BrandscopeError::SchemaViolation(_) => Some(FailureKind::SchemaViolation),
            _ => None,
        }
    }

    /// Re-tag an error raised during brand ingestion.
    pub(crate) fn into_ingestion(self) -> Self {
        match self {
            e @ (BrandscopeError::IngestionFailure(_)
            | BrandscopeError::FetchFailure { .. }
            | BrandscopeError::InvalidUrl(_)) => e,
            other => BrandscopeError::IngestionFailure(other.to_string()),
        }
    }

    /// Re-tag an error raised by an agent invocation.
    pub(crate) fn into_agent_failure(self) -> Self {
        match self {
            e @ (BrandscopeError::AgentUnavailable(_) | BrandscopeError::SchemaViolation(_)) => e,
            BrandscopeError::Serialization(e) => BrandscopeError::SchemaViolation(e.to_string()),
            other => BrandscopeError::AgentUnavailable(other.to_string()),
        }
    }

    /// Re-tag an error raised by a source collaborator.
    pub(crate) fn into_fetch(self, resource: &str) -> Self {
        match self {
            e @ (BrandscopeError::FetchFailure { .. } | BrandscopeError::InvalidUrl(_)) => e,
            other => BrandscopeError::fetch(resource, other),
        }
    }
}

/// Convert anyhow::Error to BrandscopeError
impl From<anyhow::Error> for BrandscopeError {
    fn from(err: anyhow::Error) -> Self {
        BrandscopeError::Other(err.to_string())
    }
}

impl From<config::ConfigError> for BrandscopeError {
    fn from(err: config::ConfigError) -> Self {
        BrandscopeError::Config(err.to_string())
    }
}
