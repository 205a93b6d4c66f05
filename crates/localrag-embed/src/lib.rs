//! localrag-embed
//!
//! Embedding providers behind `localrag_core::traits::Embedder`:
//! - `ollama`: Ollama-compatible HTTP server
//! - `hash`: deterministic offline projection, used in tests
//! - `model`: local XLM-RoBERTa encoder (feature `local-model`)
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use localrag_core::config::{EmbeddingProvider, EmbeddingSettings};
use localrag_core::traits::Embedder;

pub mod hash;
#[cfg(feature = "local-model")]
pub mod model;
pub mod ollama;

pub use hash::HashEmbedder;
pub use ollama::OllamaEmbedder;

/// Build the configured provider, or `None` when embeddings are disabled.
///
/// Construction only fails on local misconfiguration (callers then run
/// lexical-only); an unreachable server is discovered at index time, where the
/// retriever degrades to the lexical strategy.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Option<Arc<dyn Embedder>>> {
    let embedder: Arc<dyn Embedder> = match settings.provider {
        EmbeddingProvider::None => return Ok(None),
        EmbeddingProvider::Hash => Arc::new(HashEmbedder::new(settings.dim)),
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(settings)?),
        EmbeddingProvider::Local => local_model(settings)?,
    };
    info!(provider = ?settings.provider, model = embedder.id(), dim = embedder.dim(), "embedding provider ready");
    Ok(Some(embedder))
}

#[cfg(feature = "local-model")]
fn local_model(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> { Ok(Arc::new(model::LocalModelEmbedder::new(settings)?)) }

#[cfg(not(feature = "local-model"))]
fn local_model(_settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    Err(anyhow::anyhow!("embedding.provider = \"local\" requires the `local-model` feature"))
}
