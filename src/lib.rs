//! Brandscope - Brand-relevance assessment for video content
//!
//! Judges how relevant a video is to a brand and how its audience feels
//! about it:
//! - Fetches transcript, comments and statistics for the video
//! - Builds a per-request knowledge store from the brand's web page
//! - An Analyst agent drafts an assessment, pulling brand context through
//!   a retrieval tool
//! - An Evaluator agent approves it or sends feedback for a bounded number
//!   of revisions
//!
//! # Architecture
//!
//! - **Types**: Core data structures (Chunk, AnalysisResult, AnalyzeResult)
//! - **Sources**: Video and brand collaborators behind traits
//! - **Knowledge**: Chunking, embedding storage and similarity retrieval
//! - **Agents**: Analyst and Evaluator, LLM-backed or scripted
//! - **Pipeline**: State machine, revision loop and orchestrator
//!
//! # Example
//!
//! ```ignore
//! use brandscope_core::{BrandscopeConfig, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BrandscopeConfig::load(None)?;
//!     let orchestrator = Orchestrator::from_config(&config)?;
//!
//!     let result = orchestrator
//!         .analyze("https://youtu.be/dQw4w9WgXcQ", "https://brand.example/about")
//!         .await?;
//!     println!("{}: {}", result.relevance, result.insights.summary);
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod knowledge;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use agents::{Analyst, AnalystInput, Evaluator, LlmAnalyst, LlmEvaluator};
pub use config::BrandscopeConfig;
pub use embeddings::{EmbeddingService, HashingEmbeddingService, RemoteEmbeddingService};
pub use error::{BrandscopeError, FailureKind, Result};
pub use knowledge::{Chunker, KnowledgeStore, RetrievalTool};
pub use pipeline::{Orchestrator, PipelineOptions, PipelineState};
pub use services::{LanguageModel, LlmService};
pub use sources::{validate_video_url, BrandSource, UrlValidation, VideoSource};
pub use types::{
    AnalysisResult, AnalyzeResult, ApprovalStatus, Chunk, EvaluationVerdict, Insights, Relevance,
    Sentiment, SourceTag, VideoId, VideoStats,
};
