//! Request lifecycle state machine
//!
//! ```text
//! BUILDING_KNOWLEDGE -> ANALYZING -> EVALUATING -> APPROVED
//!                                              -> REVISING -> ANALYZING
//!                                              -> EXHAUSTED
//! any non-terminal state -> FAILED
//! ```

use crate::types::RequestId;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    /// Fetching sources and ingesting brand content
    BuildingKnowledge,
    Analyzing,
    Evaluating,
    /// Rejected with budget left; feedback recorded for the next attempt
    Revising,
    Approved,
    /// Rejected on the final attempt
    Exhausted,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Approved | PipelineState::Exhausted | PipelineState::Failed
        )
    }

    /// Check if a transition is allowed
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (BuildingKnowledge, Analyzing) => true,
            (Analyzing, Evaluating) => true,
            (Evaluating, Approved | Exhausted | Revising) => true,
            (Revising, Analyzing) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::BuildingKnowledge => "BUILDING_KNOWLEDGE",
            PipelineState::Analyzing => "ANALYZING",
            PipelineState::Evaluating => "EVALUATING",
            PipelineState::Revising => "REVISING",
            PipelineState::Approved => "APPROVED",
            PipelineState::Exhausted => "EXHAUSTED",
            PipelineState::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks and logs the state of one request
#[derive(Debug, Clone)]
pub struct StateTracker {
    request_id: RequestId,
    current: PipelineState,
    attempt: u32,
    history: Vec<PipelineState>,
}

impl StateTracker {
    pub fn new(request_id: RequestId) -> Self {
        info!("[{}] state: {}", request_id, PipelineState::BuildingKnowledge);
        Self {
            request_id,
            current: PipelineState::BuildingKnowledge,
            attempt: 0,
            history: vec![PipelineState::BuildingKnowledge],
        }
    }

    pub fn current(&self) -> PipelineState {
        self.current
    }

    /// Analyst attempts started so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Every state entered, in order
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.current.can_transition_to(next),
            "invalid transition {} -> {}",
            self.current,
            next
        );
        if next == PipelineState::Analyzing {
            self.attempt += 1;
        }
        info!(
            "[{}] state: {} -> {} (attempt {})",
            self.request_id, self.current, next, self.attempt
        );
        self.current = next;
        self.history.push(next);
    }

    /// Enter FAILED, logging the cause
    pub fn fail(&mut self, cause: &dyn std::fmt::Display) {
        if self.current.is_terminal() {
            return;
        }
        warn!(
            "[{}] state: {} -> {}: {}",
            self.request_id,
            self.current,
            PipelineState::Failed,
            cause
        );
        self.current = PipelineState::Failed;
        self.history.push(PipelineState::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn test_valid_transitions() {
        assert!(BuildingKnowledge.can_transition_to(Analyzing));
        assert!(Evaluating.can_transition_to(Revising));
        assert!(Revising.can_transition_to(Analyzing));
        assert!(Analyzing.can_transition_to(Failed));

        assert!(!BuildingKnowledge.can_transition_to(Evaluating));
        assert!(!Approved.can_transition_to(Analyzing));
        assert!(!Exhausted.can_transition_to(Failed));
    }

    #[test]
    fn test_tracker_counts_attempts() {
        let mut tracker = StateTracker::new(RequestId::new());
        for next in [Analyzing, Evaluating, Revising, Analyzing, Evaluating, Approved] {
            tracker.transition(next);
        }

        assert_eq!(tracker.attempt(), 2);
        assert_eq!(tracker.current(), Approved);
        assert_eq!(tracker.history().len(), 7);
    }

    #[test]
    fn test_fail_is_idempotent_after_terminal() {
        let mut tracker = StateTracker::new(RequestId::new());
        tracker.fail(&"transcript unavailable");
        tracker.fail(&"again");
        assert_eq!(tracker.current(), Failed);
        assert_eq!(tracker.history(), &[BuildingKnowledge, Failed]);
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&BuildingKnowledge).unwrap(),
            "\"BUILDING_KNOWLEDGE\""
        );
        assert_eq!(Exhausted.to_string(), "EXHAUSTED");
    }
}
