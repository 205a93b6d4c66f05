//! Domain types shared by the lexical and embedding strategies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Well-known metadata keys.
pub const META_SOURCE: &str = "source";
pub const META_PAGE: &str = "page";
pub const META_TYPE: &str = "type";
pub const META_QUESTION: &str = "question";

/// A metadata value: free text or a number (page numbers, offsets).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Text(s) => f.write_str(s),
            // Integral numbers print as `3`, not `3.0`.
            MetaValue::Number(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{}", *n as i64),
            MetaValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self { MetaValue::Text(value.to_string()) }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self { MetaValue::Text(value) }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self { MetaValue::Number(value) }
}

impl From<usize> for MetaValue {
    fn from(value: usize) -> Self { MetaValue::Number(value as f64) }
}

pub type Metadata = BTreeMap<String, MetaValue>;

/// An immutable unit of retrievable text.
///
/// - `content`: the text payload that gets vectorized
/// - `metadata`: citation data (`source`, `page`, ...); never used for ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Chunk {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), metadata: Metadata::new() }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn source(&self) -> Option<String> { self.metadata.get(META_SOURCE).map(ToString::to_string) }

    pub fn page(&self) -> Option<String> { self.metadata.get(META_PAGE).map(ToString::to_string) }

    /// A chunk with no non-whitespace text cannot be indexed.
    pub fn is_blank(&self) -> bool { self.content.trim().is_empty() }
}

/// Indicates which scorer produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Lexical,
    Embedding,
    Keyword,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Lexical => "lexical",
            SourceKind::Embedding => "embedding",
            SourceKind::Keyword => "keyword",
        };
        f.write_str(s)
    }
}

/// One ranked result.
///
/// `row` is the chunk's ingestion position inside the index it came from.
/// `score` is scorer-specific but higher is always better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub row: usize,
    pub score: f32,
    pub source: SourceKind,
    pub chunk: Chunk,
}
