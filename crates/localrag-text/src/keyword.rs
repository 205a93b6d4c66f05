//! Keyword-overlap scoring, the last-resort fallback when vector similarity
//! finds nothing (e.g. a query in a script the vectorizer handles poorly).
//!
//! Each query word scores `occurrences × word length` per chunk, so longer and
//! usually rarer words dominate. Occurrences are non-overlapping substring
//! matches in the lowercased chunk, so `карт` also hits `карты`.

/// Lowercased query words, split on anything that is not alphanumeric.
pub fn query_words(query: &str, min_len: usize) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && w.chars().count() >= min_len)
        .map(str::to_string)
        .collect()
}

/// Score every content against `query`, returning `(position, score)` for
/// positive scores, best first; equal scores keep ingestion order.
pub fn keyword_scores<'a, I>(query: &str, contents: I, min_len: usize) -> Vec<(usize, u64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let words = query_words(query, min_len);
    if words.is_empty() {
        return vec![];
    }
    let mut scored: Vec<(usize, u64)> = contents
        .into_iter()
        .enumerate()
        .filter_map(|(i, content)| {
            let lowered = content.to_lowercase();
            let score: u64 = words
                .iter()
                .map(|w| (lowered.matches(w.as_str()).count() * w.chars().count()) as u64)
                .sum();
            (score > 0).then_some((i, score))
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
}
