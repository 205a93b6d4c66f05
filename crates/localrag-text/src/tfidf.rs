//! TF-IDF vectorizer.
//!
//! Fitted once on the first indexed batch; the vocabulary and IDF weights are
//! frozen afterwards so every later vector (chunks or queries) lives in the
//! same space. Weighting follows the common smoothed scheme:
//! `tf * (ln((1 + n) / (1 + df)) + 1)`, L2-normalized per row.

use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use localrag_core::config::TfIdfConfig;
use localrag_core::traits::Vectorizer;
use localrag_core::types::SourceKind;
use localrag_core::vector::{SparseVector, Vector};

use crate::analyzer::Analyzer;

#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    analyzer: Analyzer,
    ngram_max: usize,
    vocabulary: HashMap<String, u32>,
    idf: Vec<f32>,
}

impl TfIdfVectorizer {
    /// Learn vocabulary and IDF from `texts`.
    pub fn fit(texts: &[String], config: &TfIdfConfig) -> Result<Self> {
        let analyzer = Analyzer::new(&config.language, &config.stop_words)?;
        let ngram_max = config.ngram_max.max(1);
        let n_docs = texts.len();

        // term -> (document frequency, corpus frequency); BTreeMap keeps term order stable
        let mut stats: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for text in texts {
            let counts = term_counts(&analyzer.tokens(text), ngram_max);
            for (term, count) in counts {
                let entry = stats.entry(term).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += count;
            }
        }

        let max_doc_count = (config.max_df as f64 * n_docs as f64).floor() as usize;
        let mut kept: Vec<(String, usize, usize)> = stats
            .into_iter()
            .filter(|(_, (df, _))| *df >= config.min_df && *df <= max_doc_count)
            .map(|(term, (df, cf))| (term, df, cf))
            .collect();

        if let Some(limit) = config.max_features {
            if kept.len() > limit {
                kept.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
                kept.truncate(limit);
                kept.sort_by(|a, b| a.0.cmp(&b.0));
            }
        }

        if kept.is_empty() && n_docs > 0 {
            warn!(docs = n_docs, "TF-IDF vocabulary is empty after pruning; lexical search will match nothing");
        }

        let mut vocabulary = HashMap::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (i, (term, df, _)) in kept.into_iter().enumerate() {
            vocabulary.insert(term, i as u32);
            idf.push((((1 + n_docs) as f64 / (1 + df) as f64).ln() + 1.0) as f32);
        }
        debug!(terms = vocabulary.len(), docs = n_docs, "fitted TF-IDF vocabulary");
        Ok(Self { analyzer, ngram_max, vocabulary, idf })
    }

    pub fn vocabulary_len(&self) -> usize { self.vocabulary.len() }

    pub fn contains_term(&self, term: &str) -> bool { self.vocabulary.contains_key(term) }

    pub fn analyzer(&self) -> &Analyzer { &self.analyzer }

    /// Weighted, L2-normalized row for `text`; out-of-vocabulary terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let counts = term_counts(&self.analyzer.tokens(text), self.ngram_max);
        let mut pairs: Vec<(u32, f32)> = counts
            .into_iter()
            .filter_map(|(term, tf)| self.vocabulary.get(&term).map(|&i| (i, tf as f32 * self.idf[i as usize])))
            .collect();
        let norm = pairs.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut pairs { *w /= norm; }
        }
        SparseVector::from_pairs(pairs)
    }
}

impl Vectorizer for TfIdfVectorizer {
    fn kind(&self) -> SourceKind { SourceKind::Lexical }

    fn dim(&self) -> usize { self.vocabulary.len() }

    fn vectorize(&self, text: &str) -> Result<Vector> { Ok(Vector::Sparse(self.transform(text))) }
}

/// Counts of every n-gram (1..=ngram_max) over `tokens`; n-grams are space-joined.
fn term_counts(tokens: &[String], ngram_max: usize) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for n in 1..=ngram_max {
        if tokens.len() < n { break; }
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> { texts.iter().map(|s| s.to_string()).collect() }

    fn english() -> TfIdfConfig { TfIdfConfig { language: "english".to_string(), ngram_max: 1, ..TfIdfConfig::default() } }

    #[test]
    fn bigrams_extend_the_vocabulary() {
        let texts = docs(&["red apple", "green apple"]);
        let uni = TfIdfVectorizer::fit(&texts, &english()).expect("fit");
        let bi = TfIdfVectorizer::fit(&texts, &TfIdfConfig { ngram_max: 2, ..english() }).expect("fit");
        assert_eq!(uni.vocabulary_len(), 3);
        assert_eq!(bi.vocabulary_len(), 5);
        assert!(bi.contains_term("red appl"));
    }

    #[test]
    fn rows_are_unit_length_and_rare_terms_weigh_more() {
        let texts = docs(&["apple banana", "apple cherry", "apple date"]);
        let v = TfIdfVectorizer::fit(&texts, &english()).expect("fit");
        let row = v.transform("apple banana");
        assert!((row.norm() - 1.0).abs() < 1e-5);
        let apple = row.values[row.indices.iter().position(|&i| i == v.vocabulary["appl"]).expect("apple")];
        let banana = row.values[row.indices.iter().position(|&i| i == v.vocabulary["banana"]).expect("banana")];
        assert!(banana > apple, "banana={banana} apple={apple}");
    }

    #[test]
    fn unknown_terms_give_a_zero_vector() {
        let v = TfIdfVectorizer::fit(&docs(&["alpha beta"]), &english()).expect("fit");
        assert_eq!(v.transform("gamma").nnz(), 0);
        assert_eq!(v.transform("").nnz(), 0);
    }

    #[test]
    fn max_df_and_max_features_prune_terms() {
        let texts = docs(&["common one", "common two two", "common three"]);
        let pruned = TfIdfVectorizer::fit(&texts, &TfIdfConfig { max_df: 0.9, ..english() }).expect("fit");
        assert!(!pruned.contains_term("common"));
        assert_eq!(pruned.vocabulary_len(), 3);

        let top = TfIdfVectorizer::fit(&texts, &TfIdfConfig { max_features: Some(2), ..english() }).expect("fit");
        assert_eq!(top.vocabulary_len(), 2);
        assert!(top.contains_term("common"));
        assert!(top.contains_term("two"));
    }

    #[test]
    fn vocabulary_is_frozen_after_fit() {
        let v = TfIdfVectorizer::fit(&docs(&["alpha beta"]), &english()).expect("fit");
        let before = v.vocabulary_len();
        let _ = v.transform("entirely new words here");
        assert_eq!(v.vocabulary_len(), before);
    }
}
