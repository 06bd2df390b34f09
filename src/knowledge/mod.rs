//! Brand knowledge: chunking, the per-request vector store and the
//! retrieval tool exposed to the Analyst

pub mod chunker;
pub mod retrieval;
pub mod store;

pub use chunker::{chunk, Chunker};
pub use retrieval::{RetrievalTool, NO_BRAND_CONTEXT, SNIPPET_SEPARATOR};
pub use store::{rank, KnowledgeStore, ScoredChunk};
