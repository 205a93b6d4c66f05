use std::sync::{Arc, RwLock};
use tracing::info;

use localrag_core::config::{Settings, StrategyKind};
use localrag_core::error::Result;
use localrag_core::traits::Embedder;
use localrag_core::types::{Chunk, SearchHit};

use crate::index::{Index, IndexStats, RetrieverConfig};

/// Shared handle over the current [`Index`].
///
/// `index` builds the replacement off to the side and swaps it in under a
/// short write lock; searches clone the `Arc` and run without holding it.
pub struct Retriever {
    config: RetrieverConfig,
    embedder: Option<Arc<dyn Embedder>>,
    current: RwLock<Arc<Index>>,
}

impl Retriever {
    pub fn new(config: RetrieverConfig, embedder: Option<Arc<dyn Embedder>>) -> Self {
        Self { config, embedder, current: RwLock::new(Arc::new(Index::empty())) }
    }

    /// The embedder is only kept when the configured strategy asks for it.
    pub fn from_settings(settings: &Settings, embedder: Option<Arc<dyn Embedder>>) -> Self {
        let embedder = match settings.retriever.strategy {
            StrategyKind::Embedding => embedder,
            StrategyKind::Lexical => None,
        };
        Self::new(RetrieverConfig::from(settings), embedder)
    }

    /// Replace everything previously indexed with `chunks`.
    ///
    /// On error the previous index stays in place.
    pub fn index(&self, chunks: Vec<Chunk>) -> Result<()> {
        let next = Arc::new(Index::build(chunks, &self.config, self.embedder.as_ref())?);
        let stats = next.stats();
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = next;
        info!(chunks = stats.chunks, skipped = stats.skipped, strategy = ?stats.strategy, "index swapped");
        Ok(())
    }

    pub fn snapshot(&self) -> Arc<Index> { Arc::clone(&self.current.read().unwrap_or_else(|e| e.into_inner())) }

    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> { self.snapshot().search(query, k) }

    pub fn keyword_search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> { self.snapshot().keyword_search(query, k) }

    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> { self.snapshot().retrieve(query, k) }

    pub fn stats(&self) -> IndexStats { self.snapshot().stats() }
}
