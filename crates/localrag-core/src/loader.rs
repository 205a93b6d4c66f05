//! Document ingestion: turn a directory of text and Q&A files into chunks.
//!
//! - `.txt` / `.md`: form feeds (`\x0c`) separate pages; every page is split
//!   with [`TextSplitter`] and tagged with `source` and a 1-based `page`.
//! - `.json`: an array of `{"question", "answer"}` or `{"full_text"}` items,
//!   one chunk per item, never split further.
//!
//! Unreadable or malformed files are logged and skipped.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::splitter::TextSplitter;
use crate::types::{Chunk, META_PAGE, META_QUESTION, META_SOURCE, META_TYPE};

const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];
const PAGE_BREAK: char = '\x0c';

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonItem {
    Qna { question: String, answer: String },
    FullText { full_text: String },
}

#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    splitter: TextSplitter,
}

impl DocumentLoader {
    pub fn new(config: &ChunkingConfig) -> Self { Self { splitter: TextSplitter::new(config) } }

    pub fn load_directory(&self, data_dir: &Path) -> Result<Vec<Chunk>> { self.load_directory_limited(data_dir, None) }

    pub fn load_directory_limited(&self, data_dir: &Path, limit: Option<usize>) -> Result<Vec<Chunk>> {
        let mut files = self.list_files(data_dir);
        if files.is_empty() {
            warn!(dir = %data_dir.display(), "no supported documents found");
            return Ok(vec![]);
        }
        if let Some(limit) = limit {
            if files.len() > limit {
                files.truncate(limit);
                info!(limit, "limited to first files");
            }
        }
        let mut all_chunks = Vec::new();
        let (mut text_count, mut qna_count) = (0usize, 0usize);
        for (file_index, file_path) in files.iter().enumerate() {
            debug!(file = %file_path.display(), "processing file {}/{}", file_index + 1, files.len());
            let chunks = if has_extension(file_path, &["json"]) {
                let chunks = self.load_json_file(file_path);
                qna_count += chunks.len();
                chunks
            } else {
                let chunks = self.load_text_file(file_path);
                text_count += chunks.len();
                chunks
            };
            all_chunks.extend(chunks);
        }
        info!(files = files.len(), chunks = all_chunks.len(), text = text_count, json = qna_count, "loaded documents");
        Ok(all_chunks)
    }

    /// Split one text file; pages are taken from form feeds.
    pub fn load_text_file(&self, file_path: &Path) -> Vec<Chunk> {
        let content = match read_file_content(file_path) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %file_path.display(), error = %e, "skipping unreadable file");
                return vec![];
            }
        };
        self.chunk_text(&content, &file_path.to_string_lossy())
    }

    pub fn chunk_text(&self, content: &str, source: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for (page_index, page) in content.split(PAGE_BREAK).enumerate() {
            for piece in self.splitter.split(page) {
                chunks.push(
                    Chunk::new(piece)
                        .with_meta(META_SOURCE, source)
                        .with_meta(META_PAGE, page_index + 1)
                        .with_meta(META_TYPE, "text"),
                );
            }
        }
        chunks
    }

    pub fn load_json_file(&self, file_path: &Path) -> Vec<Chunk> {
        let parsed = read_file_content(file_path)
            .map_err(crate::error::Error::from)
            .and_then(|raw| Ok(serde_json::from_str::<Vec<serde_json::Value>>(&raw)?));
        let items = match parsed {
            Ok(items) => items,
            Err(e) => {
                warn!(file = %file_path.display(), error = %e, "skipping malformed JSON document");
                return vec![];
            }
        };
        let source = file_path.to_string_lossy().to_string();
        let mut chunks = Vec::new();
        for (i, value) in items.into_iter().enumerate() {
            match serde_json::from_value::<JsonItem>(value) {
                Ok(JsonItem::Qna { question, answer }) => chunks.push(
                    Chunk::new(format!("Вопрос: {question}\nОтвет: {answer}"))
                        .with_meta(META_SOURCE, source.as_str())
                        .with_meta(META_TYPE, "qna")
                        .with_meta(META_QUESTION, question),
                ),
                Ok(JsonItem::FullText { full_text }) => chunks.push(
                    Chunk::new(full_text)
                        .with_meta(META_SOURCE, source.as_str())
                        .with_meta(META_TYPE, "qna"),
                ),
                Err(_) => debug!(file = %file_path.display(), item = i, "skipping unrecognized JSON item"),
            }
        }
        info!(file = %file_path.display(), items = chunks.len(), "loaded Q&A items");
        chunks
    }

    fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            if has_extension(path, TEXT_EXTENSIONS) || has_extension(path, &["json"]) { files.push(path.to_path_buf()); }
        }
        files.sort();
        files
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn read_file_content(file_path: &Path) -> std::io::Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
    }
}
