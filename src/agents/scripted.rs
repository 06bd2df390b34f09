//! Deterministic agents that replay canned output
//!
//! Used by the revision loop tests and for offline dry runs. Each keeps a
//! call counter so tests can assert how many attempts were made.

use super::{Analyst, AnalystInput, Evaluator};
use crate::error::{BrandscopeError, Result};
use crate::knowledge::RetrievalTool;
use crate::types::{AnalysisResult, EvaluationVerdict, RevisionContext};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Analyst returning a fixed sequence of results, repeating the last
#[derive(Debug, Default)]
pub struct ScriptedAnalyst {
    results: Vec<AnalysisResult>,
    retrieval_query: Option<String>,
    unavailable: bool,
    calls: AtomicUsize,
    revision_lengths: Mutex<Vec<usize>>,
    feedback_seen: Mutex<Vec<Option<String>>>,
}

impl ScriptedAnalyst {
    pub fn new(result: AnalysisResult) -> Self {
        Self::sequence(vec![result])
    }

    pub fn sequence(results: Vec<AnalysisResult>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    /// An analyst whose reasoning backend is down
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Issue one retrieval query per attempt before answering
    pub fn with_retrieval(mut self, query: impl Into<String>) -> Self {
        self.retrieval_query = Some(query.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Revision history length seen on each call
    pub fn revision_lengths(&self) -> Vec<usize> {
        self.revision_lengths
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    /// Latest feedback seen on each call
    pub fn feedback_seen(&self) -> Vec<Option<String>> {
        self.feedback_seen
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Analyst for ScriptedAnalyst {
    fn name(&self) -> &str {
        "scripted-analyst"
    }

    async fn analyze(
        &self,
        input: &AnalystInput,
        revisions: &RevisionContext,
        retrieval: &RetrievalTool<'_>,
    ) -> Result<AnalysisResult> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut lengths) = self.revision_lengths.lock() {
            lengths.push(revisions.len());
        }
        if let Ok(mut seen) = self.feedback_seen.lock() {
            seen.push(revisions.latest_feedback().map(str::to_string));
        }

        if let Some(query) = &self.retrieval_query {
            retrieval.search(query).await?;
        }

        if self.unavailable {
            return Err(BrandscopeError::AgentUnavailable(
                "scripted analyst is unavailable".to_string(),
            ));
        }

        let result = self
            .results
            .get(attempt)
            .or_else(|| self.results.last())
            .cloned()
            .ok_or_else(|| {
                BrandscopeError::AgentUnavailable("no scripted analysis configured".to_string())
            })?;

        Ok(if input.request_draft {
            result
        } else {
            result.without_draft()
        })
    }
}

/// Evaluator returning a fixed sequence of verdicts, repeating the last
#[derive(Debug, Default)]
pub struct ScriptedEvaluator {
    verdicts: Vec<(bool, String)>,
    unavailable: bool,
    calls: AtomicUsize,
    contexts_seen: Mutex<Vec<String>>,
}

impl ScriptedEvaluator {
    /// Approves every analysis with `summary` as the final output
    pub fn approving(summary: impl Into<String>) -> Self {
        Self::sequence(vec![(true, summary.into())])
    }

    /// Rejects every analysis with `feedback`
    pub fn rejecting(feedback: impl Into<String>) -> Self {
        Self::sequence(vec![(false, feedback.into())])
    }

    /// Replays `(approved, output)` pairs in order.
    ///
    /// An empty output produces a `SchemaViolation` on that call.
    pub fn sequence(verdicts: Vec<(bool, String)>) -> Self {
        Self {
            verdicts,
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Brand context passed in on each call
    pub fn contexts_seen(&self) -> Vec<String> {
        self.contexts_seen
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Evaluator for ScriptedEvaluator {
    fn name(&self) -> &str {
        "scripted-evaluator"
    }

    async fn evaluate(
        &self,
        _analysis: &AnalysisResult,
        _input: &AnalystInput,
        brand_context: &str,
    ) -> Result<EvaluationVerdict> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.contexts_seen.lock() {
            seen.push(brand_context.to_string());
        }
        if self.unavailable {
            return Err(BrandscopeError::AgentUnavailable(
                "scripted evaluator is unavailable".to_string(),
            ));
        }

        let (approved, output) = self
            .verdicts
            .get(attempt)
            .or_else(|| self.verdicts.last())
            .cloned()
            .ok_or_else(|| {
                BrandscopeError::AgentUnavailable("no scripted verdict configured".to_string())
            })?;

        EvaluationVerdict::new(approved, output)
    }
}
