use anyhow::{anyhow, Result};
use std::sync::Arc;

use localrag_core::error::Error;
use localrag_core::traits::{Embedder, Vectorizer};
use localrag_core::types::SourceKind;
use localrag_core::vector::Vector;

/// Dense strategy: delegates to an [`Embedder`] and checks its output shape.
pub struct EmbeddingVectorizer {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingVectorizer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self { Self { embedder } }

    pub fn model_id(&self) -> &str { self.embedder.id() }
}

impl Vectorizer for EmbeddingVectorizer {
    fn kind(&self) -> SourceKind { SourceKind::Embedding }

    fn dim(&self) -> usize { self.embedder.dim() }

    fn vectorize(&self, text: &str) -> Result<Vector> {
        self.vectorize_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow!("Embedder {} returned no vector", self.embedder.id()))
    }

    fn vectorize_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        let embeddings = self
            .embedder
            .embed_batch(texts)
            .map_err(|e| Error::Embedding(format!("{}: {e:#}", self.embedder.id())))?;
        if embeddings.len() != texts.len() {
            return Err(anyhow!(
                "Embedder {} returned {} vectors for {} texts",
                self.embedder.id(),
                embeddings.len(),
                texts.len()
            ));
        }
        let dim = self.embedder.dim();
        embeddings
            .into_iter()
            .map(|e| {
                if e.len() == dim {
                    Ok(Vector::Dense(e))
                } else {
                    Err(Error::DimensionMismatch { expected: dim, got: e.len() }.into())
                }
            })
            .collect()
    }
}
