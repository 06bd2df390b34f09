//! Boundary-aware text chunker
//!
//! Splits text into windows of at most `target_size` characters, sharing
//! exactly `overlap` characters between neighbours. Each cut is placed at
//! the coarsest boundary available inside the window: paragraph break, then
//! sentence end, then whitespace, then a hard cut.

use crate::error::{BrandscopeError, Result};
use crate::types::{Chunk, SourceTag};

/// Boundary classes, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Paragraph,
    Sentence,
    Word,
}

const BOUNDARY_PRIORITY: [Boundary; 3] = [Boundary::Paragraph, Boundary::Sentence, Boundary::Word];

/// Deterministic overlapping chunker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    target_size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker. `overlap` must be smaller than `target_size`.
    pub fn new(target_size: usize, overlap: usize) -> Result<Self> {
        if target_size == 0 {
            return Err(BrandscopeError::Config(
                "chunk target size must be greater than 0".to_string(),
            ));
        }
        if overlap >= target_size {
            return Err(BrandscopeError::Config(format!(
                "chunk overlap ({}) must be smaller than target size ({})",
                overlap, target_size
            )));
        }
        Ok(Self {
            target_size,
            overlap,
        })
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into chunks tagged with `source_tag`.
    ///
    /// Empty input yields no chunks. Chunk `i + 1` starts exactly `overlap`
    /// characters before chunk `i` ends, so the text is recoverable from
    /// the first chunk plus each later chunk minus its first `overlap` chars.
    pub fn chunk(&self, text: &str, source_tag: &SourceTag) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();
        let mut chunks = Vec::new();
        let mut pos = 0;

        while pos < n {
            let window_end = (pos + self.target_size).min(n);
            let end = if window_end == n {
                n
            } else {
                // Every cut must leave room for forward progress past the overlap
                let lo = pos + self.overlap + 1;
                self.find_cut(&chars, lo, window_end)
            };

            let content: String = chars[pos..end].iter().collect();
            chunks.push(Chunk::at_offset(content, source_tag.clone(), pos));

            if end == n {
                break;
            }
            pos = end - self.overlap;
        }

        chunks
    }

    /// Latest cut in `[lo, hi]` at the coarsest boundary class that has one
    fn find_cut(&self, chars: &[char], lo: usize, hi: usize) -> usize {
        BOUNDARY_PRIORITY
            .iter()
            .find_map(|&boundary| (lo..=hi).rev().find(|&e| is_boundary(chars, e, boundary)))
            .unwrap_or(hi)
    }
}

/// Whether cutting before index `e` lands on `boundary`
fn is_boundary(chars: &[char], e: usize, boundary: Boundary) -> bool {
    if e == 0 || e > chars.len() {
        return false;
    }
    let prev = chars[e - 1];
    let next = chars.get(e).copied();

    match boundary {
        Boundary::Paragraph => e >= 2 && chars[e - 2] == '\n' && prev == '\n',
        Boundary::Sentence => {
            prev == '\n'
                || (matches!(prev, '.' | '!' | '?') && next.map_or(true, char::is_whitespace))
        }
        Boundary::Word => prev.is_whitespace() || next.map_or(false, char::is_whitespace),
    }
}

/// Convenience wrapper: `chunk(text, target_size, overlap)`
pub fn chunk(
    text: &str,
    target_size: usize,
    overlap: usize,
    source_tag: &SourceTag,
) -> Result<Vec<Chunk>> {
    Ok(Chunker::new(target_size, overlap)?.chunk(text, source_tag))
}
