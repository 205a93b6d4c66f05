//! localrag-text
//!
//! The lexical strategy: a Tantivy token pipeline with Snowball stemming, a
//! TF-IDF vectorizer frozen after its first fit, and the keyword-overlap
//! scorer used as a fallback when vector similarity finds nothing.
pub mod analyzer;
pub mod keyword;
pub mod tfidf;

pub use analyzer::Analyzer;
pub use keyword::{keyword_scores, query_words};
pub use tfidf::TfIdfVectorizer;
