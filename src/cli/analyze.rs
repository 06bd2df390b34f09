//! Full video/brand analysis command

use brandscope_core::{error::Result, AnalyzeResult, BrandscopeConfig, Orchestrator};
use tracing::{debug, error};

/// Handle analyze command
pub async fn handle(
    video: &str,
    brand: &str,
    format: &str,
    config: &BrandscopeConfig,
) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config)?;
    debug!("Pipeline options: {:?}", orchestrator.options());

    let result = match orchestrator.analyze(video, brand).await {
        Ok(result) => result,
        Err(e) => {
            if let Some(kind) = e.failure_kind() {
                error!("Analysis failed ({}): {}", kind.as_str(), e);
            }
            return Err(e);
        }
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_text(&result);
    }
    Ok(())
}

fn print_text(result: &AnalyzeResult) {
    let insights = &result.insights;
    let stats = &insights.video_stats;

    println!("Video:      {}", result.video_id);
    println!("Relevance:  {}", result.relevance.as_str());
    println!("Sentiment:  {}", insights.sentiment.as_str());
    println!(
        "Status:     {} after {} attempt(s)",
        result.approval_status, result.iterations
    );
    println!(
        "Stats:      {} views, {} likes, {} comments",
        stats.views, stats.likes, stats.comment_count
    );
    println!();
    println!("{}", insights.summary);
    println!();
    for point in &insights.key_points {
        println!("  - {}", point);
    }
    if let Some(draft) = &insights.draft_comment {
        println!();
        println!("Draft comment: {}", draft);
    }
    if let Some(feedback) = &result.reviewer_feedback {
        println!();
        println!("Reviewer feedback: {}", feedback);
    }
}
