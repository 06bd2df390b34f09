//! Bounded Analyst/Evaluator revision loop

use super::state::{PipelineState, StateTracker};
use crate::agents::{Analyst, AnalystInput, Evaluator};
use crate::error::{BrandscopeError, Result};
use crate::knowledge::RetrievalTool;
use crate::types::{AnalysisResult, EvaluationVerdict, RevisionContext};
use tracing::debug;

/// How the loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    Approved {
        analysis: AnalysisResult,
        verdict: EvaluationVerdict,
        iterations: u32,
    },
    /// Every attempt was rejected; `analysis` is the last one
    Exhausted {
        analysis: AnalysisResult,
        last_feedback: String,
        iterations: u32,
    },
}

impl LoopOutcome {
    pub fn iterations(&self) -> u32 {
        match self {
            LoopOutcome::Approved { iterations, .. } | LoopOutcome::Exhausted { iterations, .. } => {
                *iterations
            }
        }
    }

    pub fn analysis(&self) -> &AnalysisResult {
        match self {
            LoopOutcome::Approved { analysis, .. } | LoopOutcome::Exhausted { analysis, .. } => {
                analysis
            }
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, LoopOutcome::Approved { .. })
    }
}

/// Drives Analyst and Evaluator until approval or the attempt budget runs out
pub struct RevisionLoop<'a> {
    analyst: &'a dyn Analyst,
    evaluator: &'a dyn Evaluator,
    max_iterations: u32,
}

impl<'a> RevisionLoop<'a> {
    /// At least one attempt is always made, whatever `max_iterations` says.
    pub fn new(analyst: &'a dyn Analyst, evaluator: &'a dyn Evaluator, max_iterations: u32) -> Self {
        Self {
            analyst,
            evaluator,
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run the loop. Agent calls are strictly sequential.
    ///
    /// Errors are `AgentUnavailable` or `SchemaViolation`; the tracker is
    /// left in FAILED.
    pub async fn run(
        &self,
        input: &AnalystInput,
        retrieval: &RetrievalTool<'_>,
        tracker: &mut StateTracker,
    ) -> Result<LoopOutcome> {
        let mut revisions = RevisionContext::new();

        for attempt in 1..=self.max_iterations {
            tracker.transition(PipelineState::Analyzing);
            let analysis = match self.analyst.analyze(input, &revisions, retrieval).await {
                Ok(analysis) => analysis,
                Err(e) => return Err(Self::fail(tracker, e)),
            };

            tracker.transition(PipelineState::Evaluating);
            let brand_context = retrieval
                .review_context(&analysis.key_points().join("; "))
                .await;
            let verdict = match self
                .evaluator
                .evaluate(&analysis, input, &brand_context)
                .await
            {
                Ok(verdict) => verdict,
                Err(e) => return Err(Self::fail(tracker, e)),
            };

            if verdict.approved() {
                tracker.transition(PipelineState::Approved);
                return Ok(LoopOutcome::Approved {
                    analysis,
                    verdict,
                    iterations: attempt,
                });
            }

            debug!("Attempt {} rejected: {}", attempt, verdict.output());

            if attempt == self.max_iterations {
                tracker.transition(PipelineState::Exhausted);
                return Ok(LoopOutcome::Exhausted {
                    analysis,
                    last_feedback: verdict.output().to_string(),
                    iterations: attempt,
                });
            }

            tracker.transition(PipelineState::Revising);
            revisions.push(analysis, verdict);
        }

        // max_iterations >= 1, so the loop always returns
        Err(BrandscopeError::AgentUnavailable(
            "revision loop made no attempts".to_string(),
        ))
    }

    fn fail(tracker: &mut StateTracker, err: BrandscopeError) -> BrandscopeError {
        let err = err.into_agent_failure();
        tracker.fail(&err);
        err
    }
}
