//! localrag-retriever
//!
//! Answers "which k chunks are most relevant to this query" from local state.
//! An [`Index`] is built once from a chunk batch and never mutated; the
//! [`Retriever`] handle swaps in a freshly built index on every reindex, so
//! readers always see either the old or the new index in full.
pub mod context;
pub mod index;
pub mod retriever;
pub mod strategy;

pub use context::{extractive_answer, format_context};
pub use index::{Index, IndexStats, RetrieverConfig};
pub use retriever::Retriever;
pub use strategy::EmbeddingVectorizer;
