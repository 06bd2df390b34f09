//! End-to-end pipeline runs over in-memory collaborators

mod common;

use async_trait::async_trait;
use brandscope_core::agents::{ScriptedAnalyst, ScriptedEvaluator};
use brandscope_core::error::{BrandscopeError, Result};
use brandscope_core::sources::InMemoryBrandSource;
use brandscope_core::{
    ApprovalStatus, FailureKind, HashingEmbeddingService, Orchestrator, PipelineOptions,
    Relevance, VideoId, VideoSource, VideoStats,
};
use common::{
    analysis, brand_source, offline_orchestrator, video_source, FailingEmbedder, BRAND_URL,
    VIDEO_URL,
};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Video {}

    #[async_trait]
    impl VideoSource for Video {
        async fn fetch_transcript(&self, video: &VideoId) -> Result<String>;
        async fn fetch_comments(&self, video: &VideoId, limit: usize) -> Result<Vec<String>>;
        async fn fetch_statistics(&self, video: &VideoId) -> Result<VideoStats>;
    }
}

#[tokio::test]
async fn test_approved_analysis_end_to_end() {
    let analyst = Arc::new(
        ScriptedAnalyst::new(analysis(Relevance::High)).with_retrieval("running shoes grip"),
    );
    let evaluator = Arc::new(ScriptedEvaluator::approving(
        "High relevance: a trail review of TrailRunner shoes with a positive audience.",
    ));
    let orchestrator = offline_orchestrator(analyst.clone(), evaluator.clone());

    let result = orchestrator.analyze(VIDEO_URL, BRAND_URL).await.unwrap();

    assert_eq!(result.approval_status, ApprovalStatus::Approved);
    assert_eq!(result.relevance, Relevance::High);
    assert_eq!(result.iterations, 1);
    assert_eq!(result.video_id.as_str(), "dQw4w9WgXcQ");
    assert_eq!(result.insights.video_stats, common::stats());
    assert_eq!(result.insights.key_points.len(), 3);
    assert!(result.insights.summary.starts_with("High relevance"));
    assert!(result.insights.draft_comment.is_some());
    assert!(result.reviewer_feedback.is_none());
    assert_eq!(analyst.calls(), 1);
    assert_eq!(evaluator.calls(), 1);
}

#[tokio::test]
async fn test_exhausted_analysis_is_returned_and_marked() {
    let analyst = Arc::new(ScriptedAnalyst::new(analysis(Relevance::Medium)));
    let evaluator = Arc::new(ScriptedEvaluator::rejecting("Sentiment is overstated"));
    let orchestrator = offline_orchestrator(analyst.clone(), evaluator);

    let result = orchestrator.analyze(VIDEO_URL, BRAND_URL).await.unwrap();

    assert_eq!(result.approval_status, ApprovalStatus::Exhausted);
    assert_eq!(result.iterations, 3);
    assert_eq!(analyst.calls(), 3);
    assert_eq!(
        result.reviewer_feedback.as_deref(),
        Some("Sentiment is overstated")
    );
}

#[tokio::test]
async fn test_draft_is_omitted_when_not_requested() {
    let analyst = Arc::new(ScriptedAnalyst::new(analysis(Relevance::High)));
    let evaluator = Arc::new(ScriptedEvaluator::approving("Fine."));
    let orchestrator = offline_orchestrator(analyst, evaluator)
        .with_options(PipelineOptions {
            request_draft: false,
            ..PipelineOptions::default()
        })
        .unwrap();

    let result = orchestrator.analyze(VIDEO_URL, BRAND_URL).await.unwrap();
    assert!(result.insights.draft_comment.is_none());
}

#[tokio::test]
async fn test_short_links_are_accepted() {
    let orchestrator = offline_orchestrator(
        Arc::new(ScriptedAnalyst::new(analysis(Relevance::Low))),
        Arc::new(ScriptedEvaluator::approving("Low fit.")),
    );

    let result = orchestrator
        .analyze("https://youtu.be/dQw4w9WgXcQ", BRAND_URL)
        .await
        .unwrap();
    assert_eq!(result.video_id.as_str(), "dQw4w9WgXcQ");
}

#[tokio::test]
async fn test_invalid_video_url_is_rejected_before_any_work() {
    let analyst = Arc::new(ScriptedAnalyst::new(analysis(Relevance::High)));
    let evaluator = Arc::new(ScriptedEvaluator::approving("unused"));
    let orchestrator = offline_orchestrator(analyst.clone(), evaluator.clone());

    for bad in [
        "https://vimeo.com/123456",
        "https://www.youtube.com/watch?v=short",
        "not a url",
    ] {
        let err = orchestrator.analyze(bad, BRAND_URL).await.unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::InvalidUrl), "{}", bad);
    }

    let err = orchestrator.analyze(VIDEO_URL, "ftp://brand.example").await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::InvalidUrl));

    assert_eq!(analyst.calls(), 0);
    assert_eq!(evaluator.calls(), 0);
}

#[tokio::test]
async fn test_transcript_failure_fails_fast_without_agents() {
    let mut video = MockVideo::new();
    video
        .expect_fetch_transcript()
        .returning(|_| Err(BrandscopeError::fetch("transcript", "captions disabled")));
    video.expect_fetch_comments().returning(|_, _| Ok(Vec::new()));
    video
        .expect_fetch_statistics()
        .returning(|_| Ok(VideoStats::default()));

    let analyst = Arc::new(ScriptedAnalyst::new(analysis(Relevance::High)));
    let evaluator = Arc::new(ScriptedEvaluator::approving("unused"));
    let orchestrator = Orchestrator::new(
        Arc::new(video),
        Arc::new(brand_source()),
        Arc::new(HashingEmbeddingService::new()),
        analyst.clone(),
        evaluator.clone(),
    );

    let err = orchestrator.analyze(VIDEO_URL, BRAND_URL).await.unwrap_err();

    assert_eq!(err.failure_kind(), Some(FailureKind::FetchFailure));
    assert_eq!(analyst.calls(), 0);
    assert_eq!(evaluator.calls(), 0);
}

#[tokio::test]
async fn test_unmapped_source_error_is_reported_as_fetch_failure() {
    let mut video = MockVideo::new();
    video
        .expect_fetch_transcript()
        .returning(|_| Ok("transcript".to_string()));
    video
        .expect_fetch_comments()
        .returning(|_, _| Err(BrandscopeError::Other("connection reset".to_string())));
    video
        .expect_fetch_statistics()
        .returning(|_| Ok(VideoStats::default()));

    let orchestrator = Orchestrator::new(
        Arc::new(video),
        Arc::new(brand_source()),
        Arc::new(HashingEmbeddingService::new()),
        Arc::new(ScriptedAnalyst::new(analysis(Relevance::High))),
        Arc::new(ScriptedEvaluator::approving("unused")),
    );

    let err = orchestrator.analyze(VIDEO_URL, BRAND_URL).await.unwrap_err();
    match err {
        BrandscopeError::FetchFailure { resource, .. } => assert_eq!(resource, "comments"),
        other => panic!("expected fetch failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_brand_page_is_fetch_failure() {
    let orchestrator = Orchestrator::new(
        Arc::new(video_source()),
        Arc::new(InMemoryBrandSource::new()),
        Arc::new(HashingEmbeddingService::new()),
        Arc::new(ScriptedAnalyst::new(analysis(Relevance::High))),
        Arc::new(ScriptedEvaluator::approving("unused")),
    );

    let err = orchestrator.analyze(VIDEO_URL, BRAND_URL).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::FetchFailure));
}

#[tokio::test]
async fn test_embedding_outage_is_ingestion_failure() {
    let analyst = Arc::new(ScriptedAnalyst::new(analysis(Relevance::High)));
    let orchestrator = Orchestrator::new(
        Arc::new(video_source()),
        Arc::new(brand_source()),
        Arc::new(FailingEmbedder),
        analyst.clone(),
        Arc::new(ScriptedEvaluator::approving("unused")),
    );

    let err = orchestrator.analyze(VIDEO_URL, BRAND_URL).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::IngestionFailure));
    assert_eq!(analyst.calls(), 0);
}

#[tokio::test]
async fn test_empty_brand_page_still_analyzes() {
    let analyst = Arc::new(ScriptedAnalyst::new(analysis(Relevance::None)).with_retrieval("values"));
    let orchestrator = Orchestrator::new(
        Arc::new(video_source()),
        Arc::new(InMemoryBrandSource::new().with_document(BRAND_URL, "   ")),
        Arc::new(HashingEmbeddingService::new()),
        analyst.clone(),
        Arc::new(ScriptedEvaluator::approving("No brand context; unrelated.")),
    );

    let result = orchestrator.analyze(VIDEO_URL, BRAND_URL).await.unwrap();
    assert_eq!(result.relevance, Relevance::None);
    assert!(result.is_approved());
}

#[tokio::test]
async fn test_schema_violation_from_evaluator_surfaces() {
    let orchestrator = offline_orchestrator(
        Arc::new(ScriptedAnalyst::new(analysis(Relevance::High))),
        Arc::new(ScriptedEvaluator::sequence(vec![(true, String::new())])),
    );

    let err = orchestrator.analyze(VIDEO_URL, BRAND_URL).await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::SchemaViolation));
}
