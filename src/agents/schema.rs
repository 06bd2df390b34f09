//! Validation boundary for agent output
//!
//! Model text goes in, a validated [`AnalysisResult`] or
//! [`EvaluationVerdict`] comes out, or a `SchemaViolation`. Nothing
//! downstream inspects raw model text.

use crate::error::{BrandscopeError, Result};
use crate::types::{AnalysisResult, EvaluationVerdict, Relevance, Sentiment};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// ```json fenced block, capturing its body
fn fenced_block() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\n?(.*?)```").expect("Valid fenced block regex")
    });
    &PATTERN
}

/// The complete JSON object starting at the first `{` of `text`, if any
fn leading_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let rest = &text[start..];
    let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
    match stream.next() {
        Some(Ok(Value::Object(_))) => Some(&rest[..stream.byte_offset()]),
        _ => None,
    }
}

/// Every JSON object in model output, fenced blocks first.
///
/// Each object is cut at its own closing brace, so trailing prose or a
/// second block never leaks into it.
pub fn json_candidates(text: &str) -> Vec<&str> {
    let mut candidates: Vec<&str> = fenced_block()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter_map(|m| leading_object(m.as_str()))
        .collect();

    for (i, _) in text.match_indices('{') {
        if let Some(object) = leading_object(&text[i..]) {
            if !candidates.contains(&object) {
                candidates.push(object);
            }
        }
    }
    candidates
}

/// Locate the first JSON object in model output.
///
/// Accepts a bare object, an object inside a code fence, or an object
/// surrounded by prose.
pub fn extract_json(text: &str) -> Result<&str> {
    json_candidates(text).into_iter().next().ok_or_else(|| {
        BrandscopeError::SchemaViolation("no JSON object found in agent output".to_string())
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    relevance: String,
    sentiment: String,
    #[serde(alias = "key_points")]
    key_points: Vec<String>,
    #[serde(default, alias = "draft_comment")]
    draft_comment: Option<String>,
}

/// Exactly two fields; anything else is rejected
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVerdict {
    approved: bool,
    output: String,
}

/// First candidate object that deserializes as `T`
fn parse<T: DeserializeOwned>(text: &str, what: &str) -> Result<T> {
    let mut last_error = None;
    for candidate in json_candidates(text) {
        match serde_json::from_str(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }
    Err(match last_error {
        Some(e) => BrandscopeError::SchemaViolation(format!("{} does not match schema: {}", what, e)),
        None => BrandscopeError::SchemaViolation("no JSON object found in agent output".to_string()),
    })
}

/// Coerce Analyst output into an [`AnalysisResult`].
///
/// When `draft_requested` is false any draft in the output is discarded.
pub fn validate_analysis(text: &str, draft_requested: bool) -> Result<AnalysisResult> {
    let raw: RawAnalysis = parse(text, "analysis")?;

    let relevance: Relevance = raw.relevance.parse()?;
    let sentiment: Sentiment = raw.sentiment.parse()?;
    let draft = if draft_requested {
        raw.draft_comment
    } else {
        None
    };

    AnalysisResult::new(relevance, sentiment, raw.key_points, draft)
}

/// Coerce Evaluator output into an [`EvaluationVerdict`].
pub fn validate_verdict(text: &str) -> Result<EvaluationVerdict> {
    let raw: RawVerdict = parse(text, "verdict")?;
    EvaluationVerdict::new(raw.approved, raw.output)
}
