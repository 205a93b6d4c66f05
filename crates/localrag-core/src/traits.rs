use crate::types::SourceKind;
use crate::vector::Vector;

/// Opaque `text -> fixed-length vector` function (network service or local model).
///
/// Implementations must return exactly one vector of length `dim()` per input text.
pub trait Embedder: Send + Sync {
    /// Stable identity of the underlying model, used in logs and stats.
    fn id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// A vectorization strategy that is frozen once built: the same instance turns
/// both indexed chunks and later queries into comparable vectors.
pub trait Vectorizer: Send + Sync {
    fn kind(&self) -> SourceKind;
    /// Length of produced vectors (vocabulary size for sparse strategies).
    fn dim(&self) -> usize;
    fn vectorize(&self, text: &str) -> anyhow::Result<Vector>;

    fn vectorize_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vector>> {
        texts.iter().map(|t| self.vectorize(t)).collect()
    }
}
