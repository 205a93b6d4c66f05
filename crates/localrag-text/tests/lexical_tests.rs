use localrag_core::config::TfIdfConfig;
use localrag_core::traits::Vectorizer;
use localrag_core::vector::cosine_similarity;
use localrag_text::{keyword_scores, TfIdfVectorizer};

fn corpus() -> Vec<String> {
    vec![
        "потратил 500 рублей на продукты".to_string(),
        "получил зарплату 50000 рублей".to_string(),
        "купил билеты в кино".to_string(),
    ]
}

#[test]
fn inflected_query_matches_through_stems() {
    let texts = corpus();
    let v = TfIdfVectorizer::fit(&texts, &TfIdfConfig::default()).expect("fit");
    let rows = v.vectorize_batch(&texts).expect("rows");
    let q = v.vectorize("зарплата").expect("query");

    let sims: Vec<f32> = rows.iter().map(|r| cosine_similarity(&q, r)).collect();
    assert_eq!(sims[0], 0.0);
    assert!(sims[1] > 0.0, "sims={sims:?}");
    assert_eq!(sims[2], 0.0);
}

#[test]
fn shared_terms_rank_by_weight() {
    let texts = corpus();
    let v = TfIdfVectorizer::fit(&texts, &TfIdfConfig::default()).expect("fit");
    let rows = v.vectorize_batch(&texts).expect("rows");
    let q = v.vectorize("рубли на продукты").expect("query");

    let sims: Vec<f32> = rows.iter().map(|r| cosine_similarity(&q, r)).collect();
    assert!(sims[0] > sims[1], "sims={sims:?}");
    assert!(sims[1] > 0.0, "both chunks mention roubles");
    assert_eq!(sims[2], 0.0);
}

#[test]
fn unrelated_query_is_zero_everywhere_and_keyword_finds_nothing() {
    let texts = corpus();
    let v = TfIdfVectorizer::fit(&texts, &TfIdfConfig::default()).expect("fit");
    let q = v.vectorize("автомобиль").expect("query");
    assert!(q.is_zero());
    assert!(keyword_scores("автомобиль", texts.iter().map(String::as_str), 1).is_empty());
}
