use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use localrag_core::config::{Settings, StrategyKind};
use localrag_core::error::Error;
use localrag_core::traits::Embedder;
use localrag_core::types::{Chunk, SourceKind, META_SOURCE};
use localrag_embed::HashEmbedder;
use localrag_retriever::{Retriever, RetrieverConfig};

fn corpus() -> Vec<Chunk> {
    ["потратил 500 рублей на продукты", "получил зарплату 50000 рублей", "купил билеты в кино"]
        .into_iter()
        .enumerate()
        .map(|(i, t)| Chunk::new(t).with_meta(META_SOURCE, format!("note-{i}.txt")))
        .collect()
}

fn lexical() -> Retriever { Retriever::new(RetrieverConfig::default(), None) }

fn rows(hits: &[localrag_core::types::SearchHit]) -> Vec<usize> { hits.iter().map(|h| h.row).collect() }

/// Fails every call after the first `ok_calls`.
struct FlakyEmbedder {
    inner: HashEmbedder,
    ok_calls: usize,
    calls: AtomicUsize,
}

impl FlakyEmbedder {
    fn new(ok_calls: usize) -> Self { Self { inner: HashEmbedder::new(128), ok_calls, calls: AtomicUsize::new(0) } }
}

impl Embedder for FlakyEmbedder {
    fn id(&self) -> &str { "flaky" }

    fn dim(&self) -> usize { 128 }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.ok_calls {
            return Err(anyhow!("connection refused"));
        }
        self.inner.embed_batch(texts)
    }
}

/// Claims one dimension, returns another.
struct LyingEmbedder;

impl Embedder for LyingEmbedder {
    fn id(&self) -> &str { "lying" }

    fn dim(&self) -> usize { 4 }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect()) }
}

/// Points cinema texts one way and everything else the opposite way.
struct PolarEmbedder;

impl Embedder for PolarEmbedder {
    fn id(&self) -> &str { "polar" }

    fn dim(&self) -> usize { 2 }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| if t.contains("кино") { vec![-1.0, 0.0] } else { vec![1.0, 0.1] }).collect())
    }
}

#[test]
fn salary_query_ranks_salary_chunk_first() {
    let r = lexical();
    r.index(corpus()).expect("index");
    let hits = r.search("зарплата", 3).expect("search");
    assert!(!hits.is_empty());
    assert_eq!(hits[0].row, 1);
    assert_eq!(hits[0].chunk.content, "получил зарплату 50000 рублей");
    assert_eq!(hits[0].source, SourceKind::Lexical);
    assert_eq!(hits[0].chunk.source().as_deref(), Some("note-1.txt"));
}

#[test]
fn unrelated_query_returns_nothing() {
    let r = lexical();
    r.index(corpus()).expect("index");
    assert!(r.search("автомобиль", 3).expect("search").is_empty());
    assert!(r.keyword_search("автомобиль", 3).expect("keyword").is_empty());
    assert!(r.retrieve("автомобиль", 3).expect("retrieve").is_empty());
}

#[test]
fn k_larger_than_index_returns_what_exists() {
    let r = lexical();
    r.index(vec![Chunk::new("получил зарплату 50000 рублей")]).expect("index");
    let hits = r.search("зарплата", 3).expect("search");
    assert_eq!(hits.len(), 1);
    assert!(hits[0].score > 0.0);
}

#[test]
fn results_are_bounded_sorted_and_positive() {
    let r = lexical();
    r.index(corpus()).expect("index");
    for k in 1..=4 {
        let hits = r.search("рублей на продукты", k).expect("search");
        assert!(hits.len() <= k.min(3));
        assert!(hits.iter().all(|h| h.score > 0.0));
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }
    assert_eq!(rows(&r.search("рублей на продукты", 3).expect("search")), vec![0, 1]);
}

#[test]
fn equal_scores_keep_ingestion_order() {
    let r = lexical();
    r.index(vec![Chunk::new("кино"), Chunk::new("кино"), Chunk::new("театр")]).expect("index");
    let hits = r.search("кино", 3).expect("search");
    assert_eq!(rows(&hits), vec![0, 1]);
    assert_eq!(hits[0].score, hits[1].score);
}

#[test]
fn repeated_builds_are_deterministic() {
    let a = lexical();
    let b = lexical();
    a.index(corpus()).expect("index a");
    b.index(corpus()).expect("index b");
    for q in ["зарплата", "рублей", "билеты в кино", "500"] {
        let ha = a.search(q, 3).expect("search a");
        let hb = b.search(q, 3).expect("search b");
        assert_eq!(rows(&ha), rows(&hb), "query {q}");
        for (x, y) in ha.iter().zip(&hb) {
            assert_eq!(x.score.to_bits(), y.score.to_bits());
        }
    }
}

#[test]
fn reindex_replaces_previous_contents() {
    let r = lexical();
    r.index(corpus()).expect("index");
    let first = r.search("зарплата", 3).expect("search");
    r.index(corpus()).expect("reindex");
    let again = r.search("зарплата", 3).expect("search");
    assert_eq!(rows(&first), rows(&again));
    assert_eq!(r.stats().chunks, 3);

    r.index(vec![Chunk::new("купил новый автомобиль")]).expect("replace");
    assert!(r.search("зарплата", 3).expect("search").is_empty());
    assert_eq!(r.search("автомобиль", 3).expect("search").len(), 1);
    assert_eq!(r.stats().chunks, 1);
}

#[test]
fn snapshot_survives_reindex() {
    let r = lexical();
    r.index(corpus()).expect("index");
    let old = r.snapshot();
    r.index(vec![Chunk::new("совсем другое")]).expect("reindex");
    assert_eq!(old.len(), 3);
    assert_eq!(old.search("зарплата", 1).expect("search")[0].row, 1);
}

#[test]
fn failing_embedder_falls_back_to_lexical_at_index_time() {
    let embedder: Arc<dyn Embedder> = Arc::new(FlakyEmbedder::new(0));
    let r = Retriever::new(RetrieverConfig::default(), Some(embedder));
    r.index(corpus()).expect("index still succeeds");
    assert_eq!(r.stats().strategy, Some(SourceKind::Lexical));
    let hits = r.search("зарплата", 3).expect("search");
    assert_eq!(hits[0].row, 1);
    assert_eq!(hits[0].source, SourceKind::Lexical);
}

#[test]
fn failing_embedder_at_query_time_uses_keywords() {
    let embedder: Arc<dyn Embedder> = Arc::new(FlakyEmbedder::new(1));
    let r = Retriever::new(RetrieverConfig::default(), Some(embedder));
    r.index(corpus()).expect("index");
    assert_eq!(r.stats().strategy, Some(SourceKind::Embedding));

    let hits = r.search("зарплату", 3).expect("search degrades instead of failing");
    assert_eq!(rows(&hits), vec![1]);
    assert_eq!(hits[0].source, SourceKind::Keyword);
    assert_eq!(hits[0].score, 8.0);
}

#[test]
fn wrong_dimension_falls_back_to_lexical() {
    let embedder: Arc<dyn Embedder> = Arc::new(LyingEmbedder);
    let r = Retriever::new(RetrieverConfig::default(), Some(embedder));
    r.index(corpus()).expect("index");
    assert_eq!(r.stats().strategy, Some(SourceKind::Lexical));
}

#[test]
fn embedding_strategy_ranks_by_shared_words() {
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(512));
    let r = Retriever::new(RetrieverConfig::default(), Some(embedder));
    r.index(corpus()).expect("index");
    let stats = r.stats();
    assert_eq!(stats.strategy, Some(SourceKind::Embedding));
    assert_eq!(stats.dim, 512);
    let hits = r.search("билеты в кино", 3).expect("search");
    assert_eq!(hits[0].row, 2);
    assert_eq!(hits[0].source, SourceKind::Embedding);
}

#[test]
fn lexical_setting_ignores_embedder() {
    let mut settings = Settings::default();
    settings.retriever.strategy = StrategyKind::Lexical;
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(64));
    let r = Retriever::from_settings(&settings, Some(embedder));
    r.index(corpus()).expect("index");
    assert_eq!(r.stats().strategy, Some(SourceKind::Lexical));
}

#[test]
fn blank_chunks_are_skipped() {
    let r = lexical();
    r.index(vec![Chunk::new("   "), Chunk::new("купил билеты в кино"), Chunk::new("")]).expect("index");
    let stats = r.stats();
    assert_eq!(stats.chunks, 1);
    assert_eq!(stats.skipped, 2);
    let hits = r.search("кино", 3).expect("search");
    assert_eq!(rows(&hits), vec![0]);
    assert_eq!(hits[0].chunk.content, "купил билеты в кино");
}

#[test]
fn zero_k_is_rejected() {
    let r = lexical();
    r.index(corpus()).expect("index");
    assert!(matches!(r.search("кино", 0), Err(Error::InvalidArgument(_))));
    assert!(matches!(r.keyword_search("кино", 0), Err(Error::InvalidArgument(_))));
    assert!(matches!(r.retrieve("кино", 0), Err(Error::InvalidArgument(_))));
}

#[test]
fn empty_index_and_blank_query() {
    let r = lexical();
    assert!(r.search("кино", 3).expect("search").is_empty());
    assert!(r.keyword_search("кино", 3).expect("keyword").is_empty());
    assert_eq!(r.stats().strategy, None);

    r.index(corpus()).expect("index");
    assert!(r.search("   ", 3).expect("search").is_empty());
    assert!(r.search("!!!", 3).expect("search").is_empty());
}

#[test]
fn keyword_scores_by_length_and_occurrences() {
    let r = lexical();
    r.index(corpus()).expect("index");
    let hits = r.keyword_search("рублей продукты", 3).expect("keyword");
    // "рублей" (6) in rows 0 and 1, "продукты" (8) only in row 0
    assert_eq!(rows(&hits), vec![0, 1]);
    assert_eq!(hits[0].score, 14.0);
    assert_eq!(hits[1].score, 6.0);
    assert!(hits.iter().all(|h| h.source == SourceKind::Keyword));
}

#[test]
fn retrieve_falls_back_to_keywords_when_vectors_miss() {
    let r = lexical();
    r.index(corpus()).expect("index");
    assert!(r.search("50", 3).expect("search").is_empty());
    let hits = r.retrieve("50", 3).expect("retrieve");
    assert_eq!(rows(&hits), vec![0, 1]);
    assert!(hits.iter().all(|h| h.source == SourceKind::Keyword));
}

#[test]
fn negative_similarity_is_excluded_even_when_k_allows_more() {
    let embedder: Arc<dyn Embedder> = Arc::new(PolarEmbedder);
    let r = Retriever::new(RetrieverConfig::default(), Some(embedder));
    r.index(corpus()).expect("index");
    assert_eq!(r.stats().strategy, Some(SourceKind::Embedding));

    let hits = r.search("зарплата", 3).expect("search");
    assert_eq!(rows(&hits), vec![0, 1]);
    assert!(hits.iter().all(|h| h.score > 0.0));

    let hits = r.search("кино", 3).expect("search");
    assert_eq!(rows(&hits), vec![2]);
}
