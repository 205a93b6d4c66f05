//! Recursive character splitter.
//!
//! Text is cut on the coarsest separator that occurs in it; pieces that are
//! still too long are cut again on the next separator. Short pieces are then
//! merged back greedily up to `chunk_size`, carrying whole trailing pieces
//! (at most `chunk_overlap` characters) into the next chunk.

use crate::config::ChunkingConfig;

pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n\n", "\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for TextSplitter {
    fn default() -> Self { Self::new(&ChunkingConfig::default()) }
}

impl TextSplitter {
    pub fn new(config: &ChunkingConfig) -> Self {
        let chunk_size = config.chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: config.chunk_overlap.min(chunk_size - 1),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_separators(mut self, separators: &[&str]) -> Self {
        self.separators = separators.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn split(&self, text: &str) -> Vec<String> { self.split_recursive(text, &self.separators) }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = "";
        let mut rest: &[String] = &[];
        for (i, s) in separators.iter().enumerate() {
            if s.is_empty() {
                separator = "";
                break;
            }
            if text.contains(s.as_str()) {
                separator = s;
                rest = &separators[i + 1..];
                break;
            }
        }

        let mut out = Vec::new();
        let mut fitting: Vec<String> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                out.extend(self.merge(&fitting));
                fitting.clear();
            }
            if rest.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() { out.push(trimmed.to_string()); }
            } else {
                out.extend(self.split_recursive(&piece, rest));
            }
        }
        if !fitting.is_empty() {
            out.extend(self.merge(&fitting));
        }
        out
    }

    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut window: Vec<&str> = Vec::new();
        let mut total = 0usize;
        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                push_trimmed(&mut docs, &window.concat());
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    total -= char_len(window[0]);
                    window.remove(0);
                }
            }
            window.push(piece);
            total += len;
        }
        push_trimmed(&mut docs, &window.concat());
        docs
    }
}

fn split_keep_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    let mut pieces = Vec::new();
    for (i, part) in text.split(separator).enumerate() {
        let piece = if i == 0 { part.to_string() } else { format!("{separator}{part}") };
        if !piece.is_empty() { pieces.push(piece); }
    }
    pieces
}

fn push_trimmed(docs: &mut Vec<String>, doc: &str) {
    let trimmed = doc.trim();
    if !trimmed.is_empty() { docs.push(trimmed.to_string()); }
}

fn char_len(s: &str) -> usize { s.chars().count() }
