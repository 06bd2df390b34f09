//! CLI command handlers
//!
//! Each subcommand is implemented in its own module.

pub mod analyze;
pub mod chunk;
pub mod config;
pub mod search;

use brandscope_core::config::EmbeddingProvider;
use brandscope_core::BrandscopeConfig;
use tracing::debug;

/// Switch to the hashing embedder when requested on the command line
pub fn apply_offline_embeddings(config: &mut BrandscopeConfig, offline: bool) {
    if offline {
        debug!("Using offline hashing embeddings");
        config.embeddings.provider = EmbeddingProvider::Hashing;
    }
}
