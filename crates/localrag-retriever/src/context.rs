use std::path::Path;

use localrag_core::types::SearchHit;

pub const NO_CONTEXT: &str = "No relevant information available.";
pub const NO_ANSWER: &str = "Sorry, I could not find an answer to your question in the available documents.";
const ANSWER_HEADING: &str = "Based on the available information:";
const EXCERPT_CHARS: usize = 500;

/// Render hits as a numbered, source-attributed context block for a prompt.
pub fn format_context(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_CONTEXT.to_string();
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let page = hit.chunk.page().unwrap_or_else(|| "N/A".to_string());
            format!("[Source {}: {}, p. {}]\n{}", i + 1, source_name(hit), page, hit.chunk.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Reply assembled straight from the hits, for when no generator is available.
pub fn extractive_answer(hits: &[SearchHit], limit: usize) -> String {
    if hits.is_empty() || limit == 0 {
        return NO_ANSWER.to_string();
    }
    let mut out = String::from(ANSWER_HEADING);
    for (i, hit) in hits.iter().take(limit).enumerate() {
        let excerpt: String = hit.chunk.content.chars().take(EXCERPT_CHARS).collect();
        out.push_str(&format!("\n\n{}. {}...", i + 1, excerpt));
    }
    out
}

fn source_name(hit: &SearchHit) -> String {
    match hit.chunk.source() {
        Some(source) => Path::new(&source)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or(source),
        None => "Unknown".to_string(),
    }
}
