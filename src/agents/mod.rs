//! The two cooperating agents of the review loop
//!
//! - **Analyst**: turns transcript, comments, statistics and retrieved brand
//!   context into an [`AnalysisResult`]
//! - **Evaluator**: approves an analysis or rejects it with feedback
//!
//! Both are traits. Production implementations call a language model
//! ([`LlmAnalyst`], [`LlmEvaluator`]); the scripted implementations return
//! canned output for deterministic tests.
//!
//! # Example
//!
//! ```ignore
//! let analysis = analyst.analyze(&input, &revisions, &retrieval).await?;
//! let verdict = evaluator.evaluate(&analysis, &input, &retrieval.review_context("brand values").await).await?;
//! ```

pub mod analyst;
pub mod evaluator;
pub mod prompts;
pub mod schema;
pub mod scripted;

pub use analyst::LlmAnalyst;
pub use evaluator::LlmEvaluator;
pub use scripted::{ScriptedAnalyst, ScriptedEvaluator};

use crate::error::Result;
use crate::knowledge::RetrievalTool;
use crate::types::{AnalysisResult, Chunk, EvaluationVerdict, RevisionContext, VideoId, VideoStats};
use async_trait::async_trait;

/// Everything the Analyst sees about one video
#[derive(Debug, Clone)]
pub struct AnalystInput {
    pub video_id: VideoId,
    pub brand_url: String,
    pub transcript_chunks: Vec<Chunk>,
    pub comments: Vec<String>,
    pub stats: VideoStats,
    /// Whether an engagement draft should be produced
    pub request_draft: bool,
}

/// Producer agent
#[async_trait]
pub trait Analyst: Send + Sync {
    fn name(&self) -> &str;

    /// Produce one analysis.
    ///
    /// `revisions` holds earlier rejected attempts; the latest feedback must
    /// be addressed. `retrieval` may be queried any number of times.
    /// Failures are fatal for the attempt and are not retried here.
    async fn analyze(
        &self,
        input: &AnalystInput,
        revisions: &RevisionContext,
        retrieval: &RetrievalTool<'_>,
    ) -> Result<AnalysisResult>;
}

/// Gatekeeper agent
#[async_trait]
pub trait Evaluator: Send + Sync {
    fn name(&self) -> &str;

    /// Review `analysis` against the request data and the brand context
    /// the analysis was grounded on
    async fn evaluate(
        &self,
        analysis: &AnalysisResult,
        input: &AnalystInput,
        brand_context: &str,
    ) -> Result<EvaluationVerdict>;
}
