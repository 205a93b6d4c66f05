use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use localrag_core::config::{Settings, TfIdfConfig};
use localrag_core::error::{Error, Result};
use localrag_core::traits::{Embedder, Vectorizer};
use localrag_core::types::{Chunk, SearchHit, SourceKind};
use localrag_core::vector::{cosine_similarity, Vector};
use localrag_text::{keyword_scores, TfIdfVectorizer};

use crate::strategy::EmbeddingVectorizer;

#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    pub tfidf: TfIdfConfig,
    pub keyword_min_len: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self { Self { tfidf: TfIdfConfig::default(), keyword_min_len: 1 } }
}

impl From<&Settings> for RetrieverConfig {
    fn from(settings: &Settings) -> Self {
        Self { tfidf: settings.tfidf.clone(), keyword_min_len: settings.retriever.keyword_min_len }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IndexStats {
    pub chunks: usize,
    pub skipped: usize,
    pub strategy: Option<SourceKind>,
    pub dim: usize,
}

/// Chunks plus row-aligned vectors, produced by a single vectorizer.
///
/// `vectors[i]` always belongs to `chunks[i]`. Immutable once built.
pub struct Index {
    chunks: Vec<Chunk>,
    vectors: Vec<Vector>,
    vectorizer: Option<Arc<dyn Vectorizer>>,
    keyword_min_len: usize,
    skipped: usize,
}

impl Index {
    pub fn empty() -> Self {
        Self { chunks: Vec::new(), vectors: Vec::new(), vectorizer: None, keyword_min_len: 1, skipped: 0 }
    }

    /// Vectorize `chunks` and freeze the result.
    ///
    /// With an embedder, the embedding strategy is tried first; if the provider
    /// fails for any chunk the whole batch is re-vectorized lexically, so one
    /// index never mixes strategies. Blank chunks are skipped.
    pub fn build(chunks: Vec<Chunk>, config: &RetrieverConfig, embedder: Option<&Arc<dyn Embedder>>) -> Result<Self> {
        let total = chunks.len();
        let chunks: Vec<Chunk> = chunks
            .into_iter()
            .enumerate()
            .filter_map(|(i, c)| {
                if c.is_blank() {
                    warn!(position = i, source = c.source().as_deref().unwrap_or("unknown"), "skipping chunk without text");
                    None
                } else {
                    Some(c)
                }
            })
            .collect();
        let skipped = total - chunks.len();
        let keyword_min_len = config.keyword_min_len;

        if chunks.is_empty() {
            info!(skipped, "indexed an empty collection");
            return Ok(Self { keyword_min_len, skipped, ..Self::empty() });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();

        if let Some(embedder) = embedder {
            let vectorizer = EmbeddingVectorizer::new(Arc::clone(embedder));
            match vectorizer.vectorize_batch(&texts) {
                Ok(vectors) => {
                    info!(chunks = chunks.len(), skipped, model = vectorizer.model_id(), "built embedding index");
                    return Ok(Self { chunks, vectors, vectorizer: Some(Arc::new(vectorizer)), keyword_min_len, skipped });
                }
                Err(e) => warn!(error = %e, "embedding provider unavailable; falling back to lexical strategy"),
            }
        }

        let tfidf = TfIdfVectorizer::fit(&texts, &config.tfidf).map_err(|e| Error::Config(e.to_string()))?;
        let vectors = tfidf.vectorize_batch(&texts).map_err(|e| Error::Config(e.to_string()))?;
        info!(chunks = chunks.len(), skipped, terms = tfidf.vocabulary_len(), "built lexical index");
        Ok(Self { chunks, vectors, vectorizer: Some(Arc::new(tfidf)), keyword_min_len, skipped })
    }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn chunks(&self) -> &[Chunk] { &self.chunks }

    pub fn strategy(&self) -> Option<SourceKind> { self.vectorizer.as_ref().map(|v| v.kind()) }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            chunks: self.chunks.len(),
            skipped: self.skipped,
            strategy: self.strategy(),
            dim: self.vectorizer.as_ref().map_or(0, |v| v.dim()),
        }
    }

    /// Top `k` chunks by cosine similarity, best first.
    ///
    /// Chunks scoring `<= 0` are left out, so fewer than `k` hits means fewer
    /// than `k` relevant chunks. Equal scores keep ingestion order. If the
    /// query cannot be vectorized (provider down), falls back to
    /// [`Index::keyword_search`].
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        check_k(k)?;
        let Some(vectorizer) = self.vectorizer.as_ref() else { return Ok(vec![]) };
        if query.trim().is_empty() {
            return Ok(vec![]);
        }
        let query_vec = match vectorizer.vectorize(query) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "query vectorization failed; using keyword search");
                return self.keyword_search(query, k);
            }
        };
        if query_vec.is_zero() {
            debug!(query, "query vector is zero");
            return Ok(vec![]);
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(row, v)| (row, cosine_similarity(&query_vec, v)))
            .filter(|(_, sim)| *sim > 0.0)
            .collect();
        // stable: ties stay in ingestion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        let kind = vectorizer.kind();
        Ok(scored.into_iter().map(|(row, score)| self.hit(row, score, kind)).collect())
    }

    /// Rank by keyword overlap (occurrences × word length); zero scores are dropped.
    pub fn keyword_search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        check_k(k)?;
        let scored = keyword_scores(query, self.chunks.iter().map(|c| c.content.as_str()), self.keyword_min_len);
        Ok(scored.into_iter().take(k).map(|(row, score)| self.hit(row, score as f32, SourceKind::Keyword)).collect())
    }

    /// [`Index::search`], falling back to [`Index::keyword_search`] when it finds nothing.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let hits = self.search(query, k)?;
        if !hits.is_empty() {
            return Ok(hits);
        }
        debug!(query, "vector search found nothing; trying keyword search");
        self.keyword_search(query, k)
    }

    fn hit(&self, row: usize, score: f32, source: SourceKind) -> SearchHit {
        SearchHit { row, score, source, chunk: self.chunks[row].clone() }
    }
}

fn check_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(Error::InvalidArgument("k must be at least 1".to_string()));
    }
    Ok(())
}
