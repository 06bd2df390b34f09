//! YouTube adapter
//!
//! Statistics and comments come from the Data API v3; captions come from the
//! public timed-text endpoint.

use super::VideoSource;
use crate::config::SourceSettings;
use crate::error::{BrandscopeError, Result};
use crate::types::{VideoId, VideoStats};
use async_trait::async_trait;
use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Data API page size ceiling for commentThreads
const MAX_PAGE_SIZE: usize = 100;

/// Caption languages tried in order
const CAPTION_LANGUAGES: [&str; 2] = ["en", "en-US"];

pub struct YouTubeSource {
    client: Client,
    api_key: String,
    api_base: String,
    timedtext_base: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    #[serde(default)]
    statistics: RawStatistics,
}

/// The Data API returns counts as decimal strings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

impl RawStatistics {
    fn into_stats(self) -> VideoStats {
        let parse = |v: Option<String>| v.and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);
        VideoStats {
            views: parse(self.view_count),
            likes: parse(self.like_count),
            comment_count: parse(self.comment_count),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadList {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_display: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorEnvelope {
    #[serde(default)]
    error: ApiError,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    reason: String,
}

impl YouTubeSource {
    pub fn new(settings: &SourceSettings) -> Result<Self> {
        if settings.youtube_api_key.is_empty() {
            return Err(BrandscopeError::Config(
                "YOUTUBE_API_KEY not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: settings.youtube_api_key.clone(),
            api_base: settings.youtube_api_base.trim_end_matches('/').to_string(),
            timedtext_base: settings.timedtext_base.clone(),
        })
    }

    async fn api_error(resource: &str, response: reqwest::Response) -> BrandscopeError {
        let status = response.status();
        let envelope: ApiErrorEnvelope = response.json().await.unwrap_or_default();
        BrandscopeError::fetch(
            resource,
            format!("YouTube API returned {}: {}", status, envelope.error.message),
        )
    }
}

#[async_trait]
impl VideoSource for YouTubeSource {
    async fn fetch_transcript(&self, video: &VideoId) -> Result<String> {
        for lang in CAPTION_LANGUAGES {
            debug!("Fetching {} captions for {}", lang, video);
            let response = self
                .client
                .get(&self.timedtext_base)
                .query(&[("lang", lang), ("v", video.as_str())])
                .send()
                .await
                .map_err(|e| BrandscopeError::fetch("transcript", e))?;

            if !response.status().is_success() {
                continue;
            }

            let body = response
                .text()
                .await
                .map_err(|e| BrandscopeError::fetch("transcript", e))?;
            let transcript = parse_timedtext(&body);
            if !transcript.is_empty() {
                return Ok(transcript);
            }
        }

        Err(BrandscopeError::fetch(
            "transcript",
            format!("no captions available for video {}", video),
        ))
    }

    async fn fetch_comments(&self, video: &VideoId, limit: usize) -> Result<Vec<String>> {
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        while comments.len() < limit {
            let page_size = (limit - comments.len()).min(MAX_PAGE_SIZE).to_string();
            let mut query = vec![
                ("part", "snippet"),
                ("videoId", video.as_str()),
                ("maxResults", page_size.as_str()),
                ("order", "relevance"),
                ("textFormat", "plainText"),
                ("key", self.api_key.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let response = self
                .client
                .get(format!("{}/commentThreads", self.api_base))
                .query(&query)
                .send()
                .await
                .map_err(|e| BrandscopeError::fetch("comments", e))?;

            if response.status() == StatusCode::FORBIDDEN {
                let envelope: ApiErrorEnvelope = response.json().await.unwrap_or_default();
                if envelope
                    .error
                    .errors
                    .iter()
                    .any(|e| e.reason == "commentsDisabled")
                {
                    warn!("Comments are disabled for {}", video);
                    return Ok(Vec::new());
                }
                return Err(BrandscopeError::fetch(
                    "comments",
                    format!("YouTube API returned 403: {}", envelope.error.message),
                ));
            }
            if !response.status().is_success() {
                return Err(Self::api_error("comments", response).await);
            }

            let page: CommentThreadList = response
                .json()
                .await
                .map_err(|e| BrandscopeError::fetch("comments", e))?;

            comments.extend(
                page.items
                    .into_iter()
                    .map(|t| t.snippet.top_level_comment.snippet.text_display)
                    .filter(|c| !c.trim().is_empty()),
            );

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        comments.truncate(limit);
        debug!("Fetched {} comments for {}", comments.len(), video);
        Ok(comments)
    }

    async fn fetch_statistics(&self, video: &VideoId) -> Result<VideoStats> {
        let response = self
            .client
            .get(format!("{}/videos", self.api_base))
            .query(&[
                ("part", "statistics"),
                ("id", video.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| BrandscopeError::fetch("statistics", e))?;

        if !response.status().is_success() {
            return Err(Self::api_error("statistics", response).await);
        }

        let list: VideoListResponse = response
            .json()
            .await
            .map_err(|e| BrandscopeError::fetch("statistics", e))?;

        list.items
            .into_iter()
            .next()
            .map(|item| item.statistics.into_stats())
            .ok_or_else(|| BrandscopeError::fetch("statistics", format!("video {} not found", video)))
    }
}

fn caption_line() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?s)<text[^>]*>(.*?)</text>").expect("Valid caption line regex")
    });
    &PATTERN
}

/// Flatten a timed-text XML document into plain text
fn parse_timedtext(xml: &str) -> String {
    caption_line()
        .captures_iter(xml)
        .filter_map(|c| c.get(1))
        .map(|m| unescape_entities(m.as_str()).replace('\n', " "))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode named and numeric entities; timed-text escapes captions twice
fn unescape_entities(s: &str) -> String {
    let once = decode_html_entities(s);
    decode_html_entities(&once).replace('\u{a0}', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0" dur="1.5">Today we&amp;#39;re testing</text>
<text start="1.5" dur="2">trail shoes &amp;amp; socks</text>
<text start="3.5" dur="1"> </text>
</transcript>"#;

        assert_eq!(parse_timedtext(xml), "Today we're testing trail shoes & socks");
    }

    #[test]
    fn test_numeric_entities_are_decoded() {
        let xml = r#"<transcript><text start="0" dur="1">it&amp;#8217;s &amp;#x27;great&amp;#x27; &amp;#34;ok&amp;#34;</text></transcript>"#;

        assert_eq!(parse_timedtext(xml), "it\u{2019}s 'great' \"ok\"");
    }

    #[test]
    fn test_non_breaking_space_becomes_space() {
        let xml = r#"<transcript><text start="0" dur="1">trail&amp;nbsp;shoes</text></transcript>"#;
        assert_eq!(parse_timedtext(xml), "trail shoes");
    }

    #[test]
    fn test_empty_timedtext() {
        assert_eq!(parse_timedtext(""), "");
        assert_eq!(parse_timedtext("<transcript></transcript>"), "");
    }

    #[test]
    fn test_statistics_strings_parsed() {
        let item: VideoListResponse = serde_json::from_str(
            r#"{"items":[{"statistics":{"viewCount":"1200","likeCount":"87","favoriteCount":"0"}}]}"#,
        )
        .unwrap();
        let stats = item.items.into_iter().next().unwrap().statistics.into_stats();
        assert_eq!(
            stats,
            VideoStats {
                views: 1200,
                likes: 87,
                comment_count: 0
            }
        );
    }

    #[test]
    fn test_comment_page_parsing() {
        let page: CommentThreadList = serde_json::from_str(
            r#"{"nextPageToken":"abc","items":[
                {"snippet":{"topLevelComment":{"snippet":{"textDisplay":"Love these shoes"}}}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
        assert_eq!(
            page.items[0].snippet.top_level_comment.snippet.text_display,
            "Love these shoes"
        );
    }

    #[test]
    fn test_requires_api_key() {
        let settings = SourceSettings::default();
        assert!(YouTubeSource::new(&settings).is_err());
    }
}
