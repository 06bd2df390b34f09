//! Query a brand page's knowledge store

use brandscope_core::embeddings::create_embedding_service;
use brandscope_core::sources::{validate_brand_url, HttpBrandSource};
use brandscope_core::{
    error::Result, BrandSource, BrandscopeConfig, Chunker, KnowledgeStore, SourceTag,
};
use tracing::debug;

/// Handle search command
pub async fn handle(
    brand: &str,
    query: &str,
    k: Option<usize>,
    config: &BrandscopeConfig,
) -> Result<()> {
    let url = validate_brand_url(brand)?;
    let source = HttpBrandSource::new(config.sources.request_timeout_secs)?;
    let document = source.fetch_brand_document(&url).await?;

    let chunker = Chunker::new(config.knowledge.chunk_size, config.knowledge.chunk_overlap)?;
    let chunks = chunker.chunk(&document, &SourceTag::brand(url.as_str()));
    debug!("{} chunk(s) from {}", chunks.len(), url);

    let mut store = KnowledgeStore::new(create_embedding_service(&config.embeddings)?);
    store.insert(chunks).await?;

    let k = k.unwrap_or(config.knowledge.top_k);
    let results = store.query(query, k).await?;

    println!("Top {} of {} chunk(s) for '{}':", results.len(), store.len(), query);
    for (rank, scored) in results.iter().enumerate() {
        println!();
        println!(
            "#{} score {:.4} @{}",
            rank + 1,
            scored.score,
            scored.chunk.offset()
        );
        println!("{}", scored.chunk.content());
    }
    Ok(())
}
