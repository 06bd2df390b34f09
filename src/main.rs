//! Brandscope - brand-relevance assessment for video content
//!
//! Command-line entry point: runs the full analysis pipeline, or one of its
//! stages on its own for inspection.

mod cli;

use brandscope_core::{error::Result, BrandscopeConfig};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "brandscope")]
#[command(about = "Assess how relevant a video is to a brand, with reviewed insights", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Configuration file (defaults to <config_dir>/brandscope/config.toml)
    #[arg(short, long, global = true, env = "BRANDSCOPE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a video against a brand's web page
    Analyze {
        /// Video URL (youtube.com/watch, youtu.be, shorts, embed, live)
        #[arg(short, long)]
        video: String,

        /// Brand page URL
        #[arg(short, long)]
        brand: String,

        /// Maximum Analyst attempts before giving up on approval
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Skip the draft reply comment
        #[arg(long)]
        no_draft: bool,

        /// Use the deterministic hashing embedder instead of Voyage
        #[arg(long)]
        offline_embeddings: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Split a local text file into retrieval chunks
    Chunk {
        /// File to chunk
        #[arg(short, long)]
        file: PathBuf,

        /// Target chunk size in characters
        #[arg(short, long)]
        size: Option<usize>,

        /// Characters shared between consecutive chunks
        #[arg(short, long)]
        overlap: Option<usize>,
    },

    /// Ingest a brand page and show the chunks closest to a query
    Search {
        /// Brand page URL
        #[arg(short, long)]
        brand: String,

        /// Query text
        #[arg(short, long)]
        query: String,

        /// Number of chunks to return
        #[arg(short)]
        k: Option<usize>,

        /// Use the deterministic hashing embedder instead of Voyage
        #[arg(long)]
        offline_embeddings: bool,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let level = level.as_str().to_lowercase();

    // Keep HTTP client internals quiet unless explicitly asked for
    let filter = EnvFilter::new(format!(
        "brandscope={},brandscope_core={},reqwest=warn,hyper=warn",
        level, level
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Brandscope v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = BrandscopeConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            video,
            brand,
            max_iterations,
            no_draft,
            offline_embeddings,
            format,
        } => {
            if let Some(n) = max_iterations {
                config.pipeline.max_iterations = n;
            }
            if no_draft {
                config.pipeline.draft_comment = false;
            }
            cli::apply_offline_embeddings(&mut config, offline_embeddings);
            config.validate()?;
            cli::analyze::handle(&video, &brand, format.as_str(), &config).await
        }
        Commands::Chunk {
            file,
            size,
            overlap,
        } => cli::chunk::handle(&file, size, overlap, &config),
        Commands::Search {
            brand,
            query,
            k,
            offline_embeddings,
        } => {
            cli::apply_offline_embeddings(&mut config, offline_embeddings);
            cli::search::handle(&brand, &query, k, &config).await
        }
        Commands::Config => cli::config::handle(&config),
    }
}
