//! localrag-core
//!
//! Shared vocabulary for the retrieval crates: chunk and hit types, the
//! `Embedder`/`Vectorizer` seams, vector math, configuration, ingestion and
//! the per-session conversation store.

pub mod config;
pub mod error;
pub mod loader;
pub mod session;
pub mod splitter;
pub mod traits;
pub mod types;
pub mod vector;

pub use error::{Error, Result};
pub use types::{Chunk, MetaValue, Metadata, SearchHit, SourceKind};
pub use vector::{cosine_similarity, SparseVector, Vector};
