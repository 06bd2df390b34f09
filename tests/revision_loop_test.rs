//! Revision loop bounds and feedback threading

mod common;

use brandscope_core::agents::{ScriptedAnalyst, ScriptedEvaluator};
use brandscope_core::pipeline::{LoopOutcome, RevisionLoop, StateTracker};
use brandscope_core::types::RequestId;
use brandscope_core::{
    AnalystInput, HashingEmbeddingService, KnowledgeStore, PipelineState, Relevance,
    RetrievalTool, VideoId,
};
use common::{analysis, stats};
use std::sync::Arc;

fn input() -> AnalystInput {
    AnalystInput {
        video_id: VideoId::new("dQw4w9WgXcQ"),
        brand_url: common::BRAND_URL.to_string(),
        transcript_chunks: Vec::new(),
        comments: vec!["Love it".to_string()],
        stats: stats(),
        request_draft: true,
    }
}

#[tokio::test]
async fn test_always_reject_runs_exactly_max_iterations() {
    for max in 1..=4 {
        let analyst = ScriptedAnalyst::new(analysis(Relevance::Medium));
        let evaluator = ScriptedEvaluator::rejecting("Key point two lacks evidence");
        let store = KnowledgeStore::new(Arc::new(HashingEmbeddingService::new()));
        let retrieval = RetrievalTool::new(&store);
        let mut tracker = StateTracker::new(RequestId::new());

        let outcome = RevisionLoop::new(&analyst, &evaluator, max)
            .run(&input(), &retrieval, &mut tracker)
            .await
            .unwrap();

        assert_eq!(analyst.calls(), max as usize);
        assert_eq!(evaluator.calls(), max as usize);
        assert_eq!(tracker.current(), PipelineState::Exhausted);
        match outcome {
            LoopOutcome::Exhausted {
                last_feedback,
                iterations,
                ..
            } => {
                assert_eq!(iterations, max);
                assert_eq!(last_feedback, "Key point two lacks evidence");
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_first_approval_stops_the_loop() {
    let analyst = ScriptedAnalyst::new(analysis(Relevance::High));
    let evaluator = ScriptedEvaluator::approving("Strong brand fit with an enthusiastic audience.");
    let store = KnowledgeStore::new(Arc::new(HashingEmbeddingService::new()));
    let retrieval = RetrievalTool::new(&store);
    let mut tracker = StateTracker::new(RequestId::new());

    let outcome = RevisionLoop::new(&analyst, &evaluator, 3)
        .run(&input(), &retrieval, &mut tracker)
        .await
        .unwrap();

    assert!(outcome.is_approved());
    assert_eq!(outcome.iterations(), 1);
    assert_eq!(analyst.calls(), 1);
    assert_eq!(evaluator.calls(), 1);
    assert_eq!(
        tracker.history(),
        &[
            PipelineState::BuildingKnowledge,
            PipelineState::Analyzing,
            PipelineState::Evaluating,
            PipelineState::Approved
        ]
    );
}

#[tokio::test]
async fn test_revision_history_grows_by_one_per_rejection() {
    let analyst = ScriptedAnalyst::new(analysis(Relevance::Low));
    let evaluator = ScriptedEvaluator::sequence(vec![
        (false, "Too generic".to_string()),
        (true, "Approved summary".to_string()),
    ]);
    let store = KnowledgeStore::new(Arc::new(HashingEmbeddingService::new()));
    let retrieval = RetrievalTool::new(&store);
    let mut tracker = StateTracker::new(RequestId::new());

    let outcome = RevisionLoop::new(&analyst, &evaluator, 3)
        .run(&input(), &retrieval, &mut tracker)
        .await
        .unwrap();

    assert_eq!(outcome.iterations(), 2);
    assert_eq!(analyst.revision_lengths(), vec![0, 1]);
    assert_eq!(
        analyst.feedback_seen(),
        vec![None, Some("Too generic".to_string())]
    );
    assert_eq!(tracker.attempt(), 2);
}

#[tokio::test]
async fn test_analyst_failure_fails_without_evaluation() {
    let analyst = ScriptedAnalyst::unavailable();
    let evaluator = ScriptedEvaluator::approving("unused");
    let store = KnowledgeStore::new(Arc::new(HashingEmbeddingService::new()));
    let retrieval = RetrievalTool::new(&store);
    let mut tracker = StateTracker::new(RequestId::new());

    let err = RevisionLoop::new(&analyst, &evaluator, 3)
        .run(&input(), &retrieval, &mut tracker)
        .await
        .unwrap_err();

    assert_eq!(
        err.failure_kind(),
        Some(brandscope_core::FailureKind::AgentUnavailable)
    );
    assert_eq!(evaluator.calls(), 0);
    assert_eq!(tracker.current(), PipelineState::Failed);
}
