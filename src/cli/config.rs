//! Effective configuration command

use brandscope_core::config::default_config_path;
use brandscope_core::{error::Result, BrandscopeConfig};

/// Print the merged configuration, secrets omitted
pub fn handle(config: &BrandscopeConfig) -> Result<()> {
    match default_config_path() {
        Some(path) if path.exists() => println!("# Config file: {}", path.display()),
        Some(path) => println!("# Config file: {} (not present)", path.display()),
        None => println!("# Config file: none"),
    }

    let keys = [
        ("ANTHROPIC_API_KEY", !config.llm.api_key.is_empty()),
        ("VOYAGE_API_KEY", !config.embeddings.api_key.is_empty()),
        ("YOUTUBE_API_KEY", !config.sources.youtube_api_key.is_empty()),
    ];
    for (name, set) in keys {
        println!("# {}: {}", name, if set { "set" } else { "not set" });
    }
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
