//! Upstream data collaborators
//!
//! The pipeline depends only on the [`VideoSource`] and [`BrandSource`]
//! traits. Production adapters talk to YouTube and to brand websites; the
//! in-memory adapters serve fixed data.

pub mod brand;
pub mod memory;
pub mod youtube;

pub use brand::{html_to_text, HttpBrandSource};
pub use memory::{InMemoryBrandSource, InMemoryVideoSource};
pub use youtube::YouTubeSource;

use crate::error::{BrandscopeError, Result};
use crate::types::{VideoId, VideoStats};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

/// Video transcript, comments and statistics
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Full transcript text. Fails when no transcript is available.
    async fn fetch_transcript(&self, video: &VideoId) -> Result<String>;

    /// Up to `limit` top-level comments. Zero comments is not an error.
    async fn fetch_comments(&self, video: &VideoId, limit: usize) -> Result<Vec<String>>;

    async fn fetch_statistics(&self, video: &VideoId) -> Result<VideoStats>;
}

/// Brand web content
#[async_trait]
pub trait BrandSource: Send + Sync {
    /// Readable text of the page at `url`
    async fn fetch_brand_document(&self, url: &Url) -> Result<String>;
}

/// Outcome of [`validate_video_url`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlValidation {
    pub valid: bool,
    pub video_id: Option<VideoId>,
}

impl UrlValidation {
    fn invalid() -> Self {
        Self {
            valid: false,
            video_id: None,
        }
    }

    fn valid(id: &str) -> Self {
        Self {
            valid: true,
            video_id: Some(VideoId::new(id)),
        }
    }
}

fn video_id_pattern() -> &'static Regex {
    static PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("Valid video id regex"));
    &PATTERN
}

fn parse_lenient(url: &str) -> Option<Url> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    Url::parse(&with_scheme).ok()
}

/// Check a YouTube URL and extract its video id.
///
/// Accepts `watch?v=`, `youtu.be/`, `/shorts/`, `/embed/` and `/live/`
/// forms on the `www.`, `m.` and `music.` hosts. A missing scheme is
/// treated as https.
pub fn validate_video_url(url: &str) -> UrlValidation {
    let Some(parsed) = parse_lenient(url) else {
        return UrlValidation::invalid();
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return UrlValidation::invalid();
    }
    let Some(host) = parsed.host_str() else {
        return UrlValidation::invalid();
    };

    let candidate = match host.to_ascii_lowercase().as_str() {
        "youtu.be" => parsed
            .path_segments()
            .and_then(|mut s| s.next())
            .map(str::to_string),
        "youtube.com" | "www.youtube.com" | "m.youtube.com" | "music.youtube.com" => {
            let segments: Vec<&str> = parsed
                .path_segments()
                .map(|s| s.filter(|p| !p.is_empty()).collect())
                .unwrap_or_default();
            match segments.as_slice() {
                ["watch"] => parsed
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                ["shorts" | "embed" | "live", id, ..] => Some(id.to_string()),
                _ => None,
            }
        }
        _ => None,
    };

    match candidate {
        Some(id) if video_id_pattern().is_match(&id) => UrlValidation::valid(&id),
        _ => UrlValidation::invalid(),
    }
}

/// Check a brand URL: absolute http(s) with a host
pub fn validate_brand_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| BrandscopeError::InvalidUrl(format!("brand URL '{}': {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(BrandscopeError::InvalidUrl(format!(
            "brand URL '{}' must be an absolute http(s) URL",
            url
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_of(url: &str) -> Option<String> {
        validate_video_url(url).video_id.map(|v| v.as_str().to_string())
    }

    #[test]
    fn test_accepted_forms() {
        let id = Some("dQw4w9WgXcQ".to_string());
        assert_eq!(id_of("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(id_of("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ"), id);
        assert_eq!(id_of("http://m.youtube.com/watch?v=dQw4w9WgXcQ&t=42"), id);
        assert_eq!(id_of("https://music.youtube.com/watch?v=dQw4w9WgXcQ"), id);
        assert_eq!(id_of("https://youtu.be/dQw4w9WgXcQ?si=abc"), id);
        assert_eq!(id_of("https://www.youtube.com/shorts/dQw4w9WgXcQ"), id);
        assert_eq!(id_of("https://www.youtube.com/embed/dQw4w9WgXcQ"), id);
        assert_eq!(id_of("https://www.youtube.com/live/dQw4w9WgXcQ"), id);
        assert_eq!(id_of("youtu.be/dQw4w9WgXcQ"), id);
    }

    #[test]
    fn test_rejected_forms() {
        for url in [
            "",
            "not a url",
            "https://vimeo.com/12345",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ!",
            "https://www.youtube.com/channel/UC123",
            "ftp://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://evil-youtube.com/watch?v=dQw4w9WgXcQ",
        ] {
            let result = validate_video_url(url);
            assert!(!result.valid, "accepted {}", url);
            assert!(result.video_id.is_none());
        }
    }

    #[test]
    fn test_brand_url_validation() {
        assert!(validate_brand_url("https://brand.example/about").is_ok());
        assert!(matches!(
            validate_brand_url("brand.example"),
            Err(BrandscopeError::InvalidUrl(_))
        ));
        assert!(validate_brand_url("mailto:team@brand.example").is_err());
    }
}
