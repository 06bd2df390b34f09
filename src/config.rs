//! Layered configuration for Brandscope
//!
//! Sources, lowest precedence first:
//! 1. Compiled-in defaults
//! 2. TOML file (`--config <path>`, else `<config_dir>/brandscope/config.toml` if present)
//! 3. Environment variables `BRANDSCOPE__<SECTION>__<KEY>`
//!
//! API keys are read from the environment only (`ANTHROPIC_API_KEY`,
//! `VOYAGE_API_KEY`, `YOUTUBE_API_KEY`) and are never serialized.

use crate::error::{BrandscopeError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_PREFIX: &str = "BRANDSCOPE";

/// Language model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Upper bound on retrieval tool round-trips per Analyst call
    pub max_tool_rounds: usize,
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "claude-3-5-haiku-20241022".to_string(),
            max_tokens: 2048,
            temperature: 0.2,
            max_tool_rounds: 4,
            base_url: "https://api.anthropic.com/v1".to_string(),
            api_key: String::new(),
        }
    }
}

/// Which embedding backend to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Voyage AI HTTP API
    Voyage,
    /// Offline deterministic hashing embedder
    Hashing,
}

/// Embedding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimensions: usize,
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Voyage,
            model: "voyage-3-large".to_string(),
            dimensions: 1024,
            base_url: crate::embeddings::remote::VOYAGE_BASE_URL.to_string(),
            api_key: String::new(),
        }
    }
}

/// Brand knowledge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSettings {
    /// Target chunk length in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
    /// Snippets returned per retrieval call
    pub top_k: usize,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
        }
    }
}

/// Revision loop and request-shaping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Maximum Analyst attempts before the result is marked EXHAUSTED
    pub max_iterations: u32,
    pub max_comments: usize,
    /// Whether the Analyst is asked for an engagement draft
    pub draft_comment: bool,
    pub transcript_chunk_size: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            max_comments: 50,
            draft_comment: true,
            transcript_chunk_size: 2000,
        }
    }
}

/// Upstream source endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    pub youtube_api_base: String,
    pub timedtext_base: String,
    pub request_timeout_secs: u64,
    #[serde(default, skip_serializing)]
    pub youtube_api_key: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            youtube_api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            timedtext_base: "https://video.google.com/timedtext".to_string(),
            request_timeout_secs: 20,
            youtube_api_key: String::new(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandscopeConfig {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub embeddings: EmbeddingSettings,
    #[serde(default)]
    pub knowledge: KnowledgeSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub sources: SourceSettings,
}

impl BrandscopeConfig {
    /// Load configuration from defaults, file and environment
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        match path {
            Some(p) => {
                debug!("Loading configuration from {}", p.display());
                builder = builder.add_source(File::from(p).required(true));
            }
            None => {
                if let Some(p) = default_config_path() {
                    debug!("Looking for configuration at {}", p.display());
                    builder = builder.add_source(File::from(p).required(false));
                }
            }
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: BrandscopeConfig = settings.try_deserialize()?;
        config.apply_secrets_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Fill API keys from the process environment
    pub fn apply_secrets_from_env(&mut self) {
        if let Ok(key) = env::var("ANTHROPIC_API_KEY") {
            self.llm.api_key = key;
        }
        if let Ok(key) = env::var("VOYAGE_API_KEY") {
            self.embeddings.api_key = key;
        }
        if let Ok(key) = env::var("YOUTUBE_API_KEY") {
            self.sources.youtube_api_key = key;
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let k = &self.knowledge;
        if k.chunk_size == 0 {
            return Err(BrandscopeError::Config(
                "knowledge.chunk_size must be greater than 0".to_string(),
            ));
        }
        if k.chunk_overlap >= k.chunk_size {
            return Err(BrandscopeError::Config(format!(
                "knowledge.chunk_overlap ({}) must be smaller than knowledge.chunk_size ({})",
                k.chunk_overlap, k.chunk_size
            )));
        }
        if k.top_k == 0 {
            return Err(BrandscopeError::Config(
                "knowledge.top_k must be at least 1".to_string(),
            ));
        }
        if self.pipeline.max_iterations == 0 {
            return Err(BrandscopeError::Config(
                "pipeline.max_iterations must be at least 1".to_string(),
            ));
        }
        if self.pipeline.transcript_chunk_size == 0 {
            return Err(BrandscopeError::Config(
                "pipeline.transcript_chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.embeddings.dimensions == 0 {
            return Err(BrandscopeError::Config(
                "embeddings.dimensions must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective configuration as TOML, without secrets
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BrandscopeError::Config(e.to_string()))
    }
}

/// `<config_dir>/brandscope/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("brandscope").join("config.toml"))
}
