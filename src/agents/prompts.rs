//! Prompt construction for the Analyst and Evaluator

use super::AnalystInput;
use crate::knowledge::RetrievalTool;
use crate::types::{AnalysisResult, RevisionContext, MAX_KEY_POINTS, MIN_KEY_POINTS};
use crate::utils::string::truncate_at_char_boundary;
use std::fmt::Write;

/// Transcript characters included in a prompt
const MAX_TRANSCRIPT_CHARS: usize = 24_000;

/// Characters kept per comment
const MAX_COMMENT_CHARS: usize = 300;

/// Brand context characters shown to the Evaluator
const MAX_BRAND_CONTEXT_CHARS: usize = 6_000;

pub fn analyst_system() -> String {
    format!(
        r#"You are a brand-partnership analyst. You judge how relevant a video is to a brand and how its audience feels about it.

Use the {tool} tool to look up the brand's own positioning, products and values before judging relevance. Base every claim on the transcript, comments, statistics or retrieved brand passages.

Respond with a single JSON object and nothing else:
{{
  "relevance": "high" | "medium" | "low" | "none",
  "sentiment": "positive" | "neutral" | "negative",
  "keyPoints": [{min} to {max} short, specific findings],
  "draftComment": "a friendly comment the brand could post" (only when requested)
}}"#,
        tool = RetrievalTool::NAME,
        min = MIN_KEY_POINTS,
        max = MAX_KEY_POINTS,
    )
}

pub fn analyst_prompt(input: &AnalystInput, revisions: &RevisionContext) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Video: {}", input.video_id);
    let _ = writeln!(prompt, "Brand website: {}", input.brand_url);
    let _ = writeln!(
        prompt,
        "Statistics: {} views, {} likes, {} comments\n",
        input.stats.views, input.stats.likes, input.stats.comment_count
    );

    prompt.push_str("## Transcript\n");
    let mut budget = MAX_TRANSCRIPT_CHARS;
    for (i, chunk) in input.transcript_chunks.iter().enumerate() {
        if budget == 0 {
            let _ = writeln!(
                prompt,
                "[{} further parts omitted]",
                input.transcript_chunks.len() - i
            );
            break;
        }
        let part = truncate_at_char_boundary(chunk.content(), budget);
        budget = budget.saturating_sub(chunk.char_len());
        let _ = writeln!(prompt, "[Part {}] {}", i + 1, part.trim());
    }
    if input.transcript_chunks.is_empty() {
        prompt.push_str("(no transcript available)\n");
    }

    prompt.push_str("\n## Comments\n");
    if input.comments.is_empty() {
        prompt.push_str("(no comments)\n");
    }
    for comment in &input.comments {
        let _ = writeln!(
            prompt,
            "- {}",
            truncate_at_char_boundary(comment.trim(), MAX_COMMENT_CHARS)
        );
    }

    if !revisions.is_empty() {
        prompt.push_str("\n## Previous attempts\n");
        for (i, entry) in revisions.entries().iter().enumerate() {
            let _ = writeln!(
                prompt,
                "Attempt {}: {}\nReviewer feedback: {}\n",
                i + 1,
                render_analysis(&entry.analysis),
                entry.verdict.output()
            );
        }
        if let Some(latest) = revisions.latest_feedback() {
            let _ = writeln!(
                prompt,
                "Your new analysis must resolve the most recent feedback: {}\nDo not resubmit the previous attempt unchanged.",
                latest
            );
        }
    }

    prompt.push_str("\n## Task\n");
    if input.request_draft {
        prompt.push_str("Produce the analysis JSON, including a draftComment.\n");
    } else {
        prompt.push_str("Produce the analysis JSON. Do not include a draftComment.\n");
    }

    prompt
}

pub fn evaluator_system() -> String {
    r#"You are the quality reviewer for brand-relevance analyses. Check the analysis against the supplied data for:
- factual grounding: every key point is supported by the transcript, comments or statistics
- brand alignment: the relevance tier is consistent with the brand context provided, i.e. what the brand sells and stands for
- completeness: the key points cover the video's main content and audience reaction
- tone: any draft comment is appropriate for a brand account to post

Respond with a single JSON object with exactly two fields and nothing else:
{"approved": true | false, "output": string}

If approved, "output" is a concise final summary for the brand team (2-4 sentences).
If rejected, "output" lists the specific changes the analyst must make. Do not merely restate that it was rejected."#
        .to_string()
}

pub fn evaluator_prompt(
    analysis: &AnalysisResult,
    input: &AnalystInput,
    brand_context: &str,
) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "## Analysis under review\n{}\n", render_analysis(analysis));
    let _ = writeln!(
        prompt,
        "## Source data\nVideo: {}\nBrand website: {}\nStatistics: {} views, {} likes, {} comments",
        input.video_id,
        input.brand_url,
        input.stats.views,
        input.stats.likes,
        input.stats.comment_count
    );

    let transcript: String = input
        .transcript_chunks
        .iter()
        .map(|c| c.content())
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(
        prompt,
        "\nTranscript excerpt:\n{}",
        truncate_at_char_boundary(transcript.trim(), MAX_TRANSCRIPT_CHARS / 2)
    );

    prompt.push_str("\nComment sample:\n");
    for comment in input.comments.iter().take(20) {
        let _ = writeln!(
            prompt,
            "- {}",
            truncate_at_char_boundary(comment.trim(), MAX_COMMENT_CHARS)
        );
    }

    let _ = writeln!(
        prompt,
        "\n## Brand context\n{}",
        truncate_at_char_boundary(brand_context.trim(), MAX_BRAND_CONTEXT_CHARS)
    );

    prompt
}

fn render_analysis(analysis: &AnalysisResult) -> String {
    serde_json::to_string(analysis).unwrap_or_else(|_| {
        format!(
            "relevance={}, sentiment={}, keyPoints={:?}",
            analysis.relevance(),
            analysis.sentiment(),
            analysis.key_points()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::NO_BRAND_CONTEXT;
    use crate::types::{
        Chunk, EvaluationVerdict, Relevance, Sentiment, SourceTag, VideoId, VideoStats,
    };

    fn input(request_draft: bool) -> AnalystInput {
        let video_id = VideoId::new("abcdefghijk");
        AnalystInput {
            transcript_chunks: vec![Chunk::new(
                "Today we test trail shoes.",
                SourceTag::transcript(&video_id),
            )],
            video_id,
            brand_url: "https://brand.example".to_string(),
            comments: vec!["Great review".to_string()],
            stats: VideoStats {
                views: 1000,
                likes: 50,
                comment_count: 1,
            },
            request_draft,
        }
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult::new(
            Relevance::Medium,
            Sentiment::Positive,
            vec!["a".into(), "b".into(), "c".into()],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_first_attempt_has_no_revision_section() {
        let prompt = analyst_prompt(&input(true), &RevisionContext::new());
        assert!(prompt.contains("trail shoes"));
        assert!(prompt.contains("1000 views"));
        assert!(!prompt.contains("Previous attempts"));
        assert!(prompt.contains("including a draftComment"));
    }

    #[test]
    fn test_revision_prompt_targets_latest_feedback() {
        let mut revisions = RevisionContext::new();
        revisions.push(
            analysis(),
            EvaluationVerdict::new(false, "Ground point b in the comments").unwrap(),
        );
        revisions.push(
            analysis(),
            EvaluationVerdict::new(false, "Relevance should reflect the shoe line").unwrap(),
        );

        let prompt = analyst_prompt(&input(false), &revisions);
        assert!(prompt.contains("Attempt 2"));
        assert!(prompt.contains("must resolve the most recent feedback: Relevance should reflect the shoe line"));
        assert!(prompt.contains("Do not include a draftComment"));
    }

    #[test]
    fn test_evaluator_prompt_includes_analysis_and_data() {
        let prompt = evaluator_prompt(
            &analysis(),
            &input(false),
            "We make trail running shoes.\n---\nFree repairs for life.",
        );
        assert!(prompt.contains("\"relevance\":\"medium\""));
        assert!(prompt.contains("Great review"));
        assert!(prompt.contains("## Brand context\nWe make trail running shoes.\n---\nFree repairs for life."));
    }

    #[test]
    fn test_evaluator_prompt_shows_missing_brand_context() {
        let prompt = evaluator_prompt(&analysis(), &input(false), NO_BRAND_CONTEXT);
        assert!(prompt.contains(&format!("## Brand context\n{}", NO_BRAND_CONTEXT)));
    }

    #[test]
    fn test_system_prompts_name_the_contract() {
        assert!(analyst_system().contains(RetrievalTool::NAME));
        assert!(evaluator_system().contains("\"approved\""));
    }
}
