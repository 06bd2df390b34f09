//! Core data types for the Brandscope pipeline
//!
//! This module defines the data structures passed between the chunker, the
//! knowledge store, the two agents and the orchestrator: chunks, analysis
//! results, evaluation verdicts, revision history and the final report.

use crate::error::{BrandscopeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Minimum number of key points an analysis must carry
pub const MIN_KEY_POINTS: usize = 3;

/// Maximum number of key points an analysis may carry
pub const MAX_KEY_POINTS: usize = 5;

/// Unique identifier for a single `analyze` request
///
/// Used to correlate log lines across the concurrent fetch and ingestion
/// stages of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Create a new random request ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform identifier of a video (e.g. the 11-character YouTube id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Origin of a chunk: which document it was cut from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceTag(String);

impl SourceTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Tag for chunks cut from a video transcript
    pub fn transcript(video: &VideoId) -> Self {
        Self(format!("transcript:{}", video))
    }

    /// Tag for chunks cut from a brand page
    pub fn brand(url: &str) -> Self {
        Self(format!("brand:{}", url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bounded-length contiguous slice of a source text
///
/// Immutable once created. `offset` is the position of the first character
/// of `content` in the source document, counted in `char`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    content: String,
    source_tag: SourceTag,
    offset: usize,
}

impl Chunk {
    pub fn new(content: impl Into<String>, source_tag: SourceTag) -> Self {
        Self {
            content: content.into(),
            source_tag,
            offset: 0,
        }
    }

    pub(crate) fn at_offset(content: String, source_tag: SourceTag, offset: usize) -> Self {
        Self {
            content,
            source_tag,
            offset,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source_tag(&self) -> &SourceTag {
        &self.source_tag
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A chunk together with its embedding vector
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// How relevant a video is to the brand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    High,
    Medium,
    Low,
    None,
}

impl Relevance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relevance::High => "high",
            Relevance::Medium => "medium",
            Relevance::Low => "low",
            Relevance::None => "none",
        }
    }
}

impl FromStr for Relevance {
    type Err = BrandscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Relevance::High),
            "medium" => Ok(Relevance::Medium),
            "low" => Ok(Relevance::Low),
            "none" => Ok(Relevance::None),
            other => Err(BrandscopeError::SchemaViolation(format!(
                "relevance must be one of high|medium|low|none, got '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Relevance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall audience sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl FromStr for Sentiment {
    type Err = BrandscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(BrandscopeError::SchemaViolation(format!(
                "sentiment must be one of positive|neutral|negative, got '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The Analyst's output
///
/// Constructed only through [`AnalysisResult::new`], which enforces the
/// 3–5 key point bound and normalises an empty draft to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    relevance: Relevance,
    sentiment: Sentiment,
    key_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    draft_comment: Option<String>,
}

impl AnalysisResult {
    pub fn new(
        relevance: Relevance,
        sentiment: Sentiment,
        key_points: Vec<String>,
        draft_comment: Option<String>,
    ) -> Result<Self> {
        let key_points: Vec<String> = key_points
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if key_points.len() < MIN_KEY_POINTS || key_points.len() > MAX_KEY_POINTS {
            return Err(BrandscopeError::SchemaViolation(format!(
                "keyPoints must contain {}-{} entries, got {}",
                MIN_KEY_POINTS,
                MAX_KEY_POINTS,
                key_points.len()
            )));
        }

        let draft_comment = draft_comment
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            relevance,
            sentiment,
            key_points,
            draft_comment,
        })
    }

    pub fn relevance(&self) -> Relevance {
        self.relevance
    }

    pub fn sentiment(&self) -> Sentiment {
        self.sentiment
    }

    pub fn key_points(&self) -> &[String] {
        &self.key_points
    }

    pub fn draft_comment(&self) -> Option<&str> {
        self.draft_comment.as_deref()
    }

    /// Drop the draft, used when no draft was requested
    pub fn without_draft(mut self) -> Self {
        self.draft_comment = None;
        self
    }
}

/// The Evaluator's verdict
///
/// `output` is the finalized user-facing text when approved, and actionable
/// revision feedback otherwise. Always non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationVerdict {
    approved: bool,
    output: String,
}

impl EvaluationVerdict {
    pub fn new(approved: bool, output: impl Into<String>) -> Result<Self> {
        let output = output.into().trim().to_string();
        if output.is_empty() {
            return Err(BrandscopeError::SchemaViolation(if approved {
                "approved verdict must carry the finalized output".to_string()
            } else {
                "rejected verdict must carry revision feedback".to_string()
            }));
        }
        Ok(Self { approved, output })
    }

    pub fn approved(&self) -> bool {
        self.approved
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

/// One rejected attempt: what the Analyst produced and what the Evaluator said
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionEntry {
    pub analysis: AnalysisResult,
    pub verdict: EvaluationVerdict,
}

/// Accumulated history of rejected attempts for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevisionContext {
    entries: Vec<RevisionEntry>,
}

impl RevisionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, analysis: AnalysisResult, verdict: EvaluationVerdict) {
        self.entries.push(RevisionEntry { analysis, verdict });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RevisionEntry] {
        &self.entries
    }

    /// The most recent attempt, which the next analysis must address
    pub fn latest(&self) -> Option<&RevisionEntry> {
        self.entries.last()
    }

    pub fn latest_feedback(&self) -> Option<&str> {
        self.latest().map(|e| e.verdict.output())
    }
}

/// Engagement statistics for a video
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStats {
    pub views: u64,
    pub likes: u64,
    pub comment_count: u64,
}

/// Whether the result passed review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// The Evaluator approved an analysis
    Approved,
    /// The revision budget ran out without approval; content is not final
    Exhausted,
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Approved => write!(f, "APPROVED"),
            ApprovalStatus::Exhausted => write!(f, "EXHAUSTED"),
        }
    }
}

/// Insight block of the final report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub summary: String,
    pub sentiment: Sentiment,
    pub key_points: Vec<String>,
    pub video_stats: VideoStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_comment: Option<String>,
}

/// Final report returned by [`Orchestrator::analyze`](crate::pipeline::Orchestrator::analyze)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    pub request_id: RequestId,
    pub video_id: VideoId,
    pub relevance: Relevance,
    pub insights: Insights,
    pub approval_status: ApprovalStatus,
    /// Number of Analyst attempts made
    pub iterations: u32,
    /// Last rejection feedback when the review budget ran out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_feedback: Option<String>,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalyzeResult {
    pub fn is_approved(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("point {}", i)).collect()
    }

    #[test]
    fn test_relevance_parsing_is_case_insensitive() {
        assert_eq!(" High ".parse::<Relevance>().unwrap(), Relevance::High);
        assert_eq!("none".parse::<Relevance>().unwrap(), Relevance::None);
        assert!("very high".parse::<Relevance>().is_err());
    }

    #[test]
    fn test_sentiment_parsing() {
        assert_eq!("NEGATIVE".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert!("mixed".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_analysis_key_point_bounds() {
        for n in 3..=5 {
            assert!(
                AnalysisResult::new(Relevance::Low, Sentiment::Neutral, points(n), None).is_ok()
            );
        }
        for n in [0, 2, 6] {
            let err = AnalysisResult::new(Relevance::Low, Sentiment::Neutral, points(n), None)
                .unwrap_err();
            assert!(matches!(err, BrandscopeError::SchemaViolation(_)));
        }
    }

    #[test]
    fn test_blank_key_points_do_not_count() {
        let mut kp = points(2);
        kp.push("   ".to_string());
        assert!(AnalysisResult::new(Relevance::High, Sentiment::Positive, kp, None).is_err());
    }

    #[test]
    fn test_empty_draft_is_unset() {
        let analysis = AnalysisResult::new(
            Relevance::High,
            Sentiment::Positive,
            points(3),
            Some("  ".to_string()),
        )
        .unwrap();
        assert_eq!(analysis.draft_comment(), None);

        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json.get("draftComment").is_none());
        assert_eq!(json["keyPoints"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_verdict_requires_output() {
        assert!(EvaluationVerdict::new(true, "Looks good").is_ok());
        assert!(EvaluationVerdict::new(false, "").is_err());
        assert!(EvaluationVerdict::new(true, "   ").is_err());
    }

    #[test]
    fn test_revision_context_tracks_latest_feedback() {
        let mut ctx = RevisionContext::new();
        assert!(ctx.latest_feedback().is_none());

        let analysis =
            AnalysisResult::new(Relevance::Low, Sentiment::Neutral, points(3), None).unwrap();
        ctx.push(
            analysis.clone(),
            EvaluationVerdict::new(false, "cite the comments").unwrap(),
        );
        ctx.push(
            analysis,
            EvaluationVerdict::new(false, "mention the product line").unwrap(),
        );

        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.latest_feedback(), Some("mention the product line"));
    }

    #[test]
    fn test_approval_status_serialization() {
        let json = serde_json::to_string(&ApprovalStatus::Exhausted).unwrap();
        assert_eq!(json, "\"EXHAUSTED\"");
    }

    #[test]
    fn test_source_tags() {
        let video = VideoId::new("dQw4w9WgXcQ");
        assert_eq!(SourceTag::transcript(&video).as_str(), "transcript:dQw4w9WgXcQ");
        assert_eq!(
            SourceTag::brand("https://example.com").as_str(),
            "brand:https://example.com"
        );
    }
}
