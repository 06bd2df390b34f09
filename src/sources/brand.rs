//! Brand website adapter
//!
//! Fetches a page and reduces it to readable text. The content root is the
//! first `<article>`, else `<main>`, else `<body>`; headings, paragraphs,
//! list items and table cells are kept, one block per paragraph, while
//! anything inside script, style, nav, header or footer is dropped.

use super::BrandSource;
use crate::error::{BrandscopeError, Result};
use crate::utils::string::normalize_whitespace;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{header, Client, Url};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("brandscope/", env!("CARGO_PKG_VERSION"));

/// Elements whose text never belongs to the brand content
const DROPPED_TAGS: [&str; 8] = [
    "script", "style", "noscript", "template", "svg", "nav", "header", "footer",
];

struct ContentSelectors {
    article: Selector,
    main: Selector,
    body: Selector,
    blocks: Selector,
}

impl ContentSelectors {
    fn get() -> &'static ContentSelectors {
        static SELECTORS: Lazy<ContentSelectors> = Lazy::new(|| ContentSelectors {
            article: Selector::parse("article").expect("article selector"),
            main: Selector::parse("main").expect("main selector"),
            body: Selector::parse("body").expect("body selector"),
            blocks: Selector::parse("h1, h2, h3, h4, h5, h6, p, li, td, th, blockquote")
                .expect("block selector"),
        });
        &SELECTORS
    }

    fn pick_root<'a>(&self, document: &'a Html) -> ElementRef<'a> {
        document
            .select(&self.article)
            .next()
            .or_else(|| document.select(&self.main).next())
            .or_else(|| document.select(&self.body).next())
            .unwrap_or_else(|| document.root_element())
    }
}

/// Whether `element` sits inside a dropped tag or inside another text block
fn is_shadowed(element: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value().as_element().is_some_and(|e| {
            let name = e.name();
            DROPPED_TAGS.contains(&name)
                || matches!(name, "p" | "li" | "td" | "th" | "blockquote")
        })
    })
}

/// Reduce an HTML document to paragraph-separated text
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let selectors = ContentSelectors::get();
    let root = selectors.pick_root(&document);

    let blocks: Vec<String> = root
        .select(&selectors.blocks)
        .filter(|el| !is_shadowed(el))
        .map(|el| {
            el.text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .collect();

    blocks.join("\n\n")
}

/// Fetches brand pages over HTTP
pub struct HttpBrandSource {
    client: Client,
}

impl HttpBrandSource {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BrandSource for HttpBrandSource {
    async fn fetch_brand_document(&self, url: &Url) -> Result<String> {
        debug!("Fetching brand page {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| BrandscopeError::fetch("brand page", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrandscopeError::fetch(
                "brand page",
                format!("{} returned {}", url, status),
            ));
        }

        let is_html = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(true, |ct| ct.contains("html"));

        let body = response
            .text()
            .await
            .map_err(|e| BrandscopeError::fetch("brand page", e))?;

        let text = if is_html {
            html_to_text(&body)
        } else {
            normalize_whitespace(&body)
        };

        if text.is_empty() {
            warn!("Brand page {} has no readable text", url);
        }
        Ok(text)
    }
}
