//! Chunk a local text file

use brandscope_core::utils::string::truncate_at_char_boundary;
use brandscope_core::{error::Result, BrandscopeConfig, Chunker, SourceTag};
use std::path::Path;

const PREVIEW_CHARS: usize = 80;

/// Handle chunk command
pub fn handle(
    file: &Path,
    size: Option<usize>,
    overlap: Option<usize>,
    config: &BrandscopeConfig,
) -> Result<()> {
    let text = std::fs::read_to_string(file)?;
    let chunker = Chunker::new(
        size.unwrap_or(config.knowledge.chunk_size),
        overlap.unwrap_or(config.knowledge.chunk_overlap),
    )?;
    let chunks = chunker.chunk(&text, &SourceTag::new(file.display().to_string()));

    println!(
        "{} chunk(s) from {} ({} chars, size {}, overlap {})",
        chunks.len(),
        file.display(),
        text.chars().count(),
        chunker.target_size(),
        chunker.overlap()
    );
    for (i, chunk) in chunks.iter().enumerate() {
        let preview = chunk.content().replace('\n', " ");
        println!(
            "{:>4}  @{:<8} {:>5} chars  {}",
            i,
            chunk.offset(),
            chunk.char_len(),
            truncate_at_char_boundary(&preview, PREVIEW_CHARS)
        );
    }
    Ok(())
}
