//! Retrieval tool handed to the Analyst
//!
//! Wraps a borrowed [`KnowledgeStore`] and renders query results as one text
//! block. Every query and every snippet handed out is recorded, so the
//! Evaluator can review an analysis against the same brand context.

use super::store::KnowledgeStore;
use crate::error::{BrandscopeError, Result};
use serde_json::{json, Value};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Marker returned when the store holds no brand content
pub const NO_BRAND_CONTEXT: &str = "[no brand context available]";

/// Separator placed between snippets in the rendered block
pub const SNIPPET_SEPARATOR: &str = "\n---\n";

/// Default number of snippets per query
pub const DEFAULT_TOP_K: usize = 3;

/// Brand-context search capability
pub struct RetrievalTool<'a> {
    store: &'a KnowledgeStore,
    top_k: usize,
    queries: Mutex<Vec<String>>,
    retrieved: Mutex<Vec<String>>,
}

impl<'a> RetrievalTool<'a> {
    /// Tool name as exposed to the language model
    pub const NAME: &'static str = "search_brand_context";

    pub fn new(store: &'a KnowledgeStore) -> Self {
        Self::with_top_k(store, DEFAULT_TOP_K)
    }

    pub fn with_top_k(store: &'a KnowledgeStore, top_k: usize) -> Self {
        Self {
            store,
            top_k: top_k.max(1),
            queries: Mutex::new(Vec::new()),
            retrieved: Mutex::new(Vec::new()),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Tool description for the language model
    pub fn description(&self) -> &'static str {
        "Search the brand's own web content. Pass a natural-language query \
         describing what you need (products, values, audience, campaigns) and \
         receive the most relevant passages, separated by '---' lines."
    }

    /// JSON schema of the tool input
    pub fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for in the brand content"
                }
            },
            "required": ["query"]
        })
    }

    /// Run a query and render the top snippets as one text block.
    ///
    /// An empty store yields [`NO_BRAND_CONTEXT`] instead of an error.
    pub async fn search(&self, query: &str) -> Result<String> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }

        match self.store.query(query, self.top_k).await {
            Ok(results) if results.is_empty() => Ok(NO_BRAND_CONTEXT.to_string()),
            Ok(results) => {
                debug!("Retrieved {} snippets for '{}'", results.len(), query);
                let snippets: Vec<&str> = results.iter().map(|r| r.chunk.content().trim()).collect();
                self.record(&snippets);
                Ok(snippets.join(SNIPPET_SEPARATOR))
            }
            Err(BrandscopeError::EmptyKnowledgeStore) => {
                debug!("Knowledge store empty; returning no-context marker");
                Ok(NO_BRAND_CONTEXT.to_string())
            }
            Err(e) => Err(e),
        }
    }

    /// Queries issued so far, in call order
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    /// Distinct snippets returned so far, in first-seen order
    pub fn retrieved(&self) -> Vec<String> {
        self.retrieved
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Brand context for reviewing an analysis.
    ///
    /// Everything already handed to the Analyst when it searched; otherwise
    /// the result of searching for `fallback_query`. A failing search yields
    /// [`NO_BRAND_CONTEXT`].
    pub async fn review_context(&self, fallback_query: &str) -> String {
        let seen = self.retrieved();
        if !seen.is_empty() {
            return seen.join(SNIPPET_SEPARATOR);
        }

        match self.search(fallback_query).await {
            Ok(block) => block,
            Err(e) => {
                warn!("Brand context for review unavailable: {}", e);
                NO_BRAND_CONTEXT.to_string()
            }
        }
    }

    fn record(&self, snippets: &[&str]) {
        if let Ok(mut retrieved) = self.retrieved.lock() {
            for snippet in snippets {
                if !retrieved.iter().any(|s| s == snippet) {
                    retrieved.push(snippet.to_string());
                }
            }
        }
    }
}
