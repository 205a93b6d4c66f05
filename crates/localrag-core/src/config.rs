//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_EMBEDDING__PROVIDER=hash`). `expand_path` handles `~` and `${VAR}`.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub chunking: ChunkingConfig,
    pub retriever: RetrieverSettings,
    pub tfidf: TfIdfConfig,
    pub embedding: EmbeddingSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataSettings {
    pub dir: String,
    /// Read at most this many files from `dir`.
    pub file_limit: Option<usize>,
}

impl Default for DataSettings {
    fn default() -> Self { Self { dir: "data".to_string(), file_limit: None } }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters carried over from the end of one chunk into the next.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self { Self { chunk_size: 800, chunk_overlap: 100 } }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Lexical,
    Embedding,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrieverSettings {
    /// Default number of results.
    pub k: usize,
    /// Preferred strategy; `embedding` still degrades to `lexical` when the
    /// provider is unavailable at index time.
    pub strategy: StrategyKind,
    /// Keyword fallback ignores query words shorter than this (in characters).
    pub keyword_min_len: usize,
}

impl Default for RetrieverSettings {
    fn default() -> Self { Self { k: 3, strategy: StrategyKind::Lexical, keyword_min_len: 1 } }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TfIdfConfig {
    /// Snowball stemmer language (`russian`, `english`, ...).
    pub language: String,
    pub stop_words: Vec<String>,
    /// Largest n-gram size; `1` means unigrams only.
    pub ngram_max: usize,
    pub min_df: usize,
    /// Drop terms present in more than this share of documents.
    pub max_df: f32,
    /// Keep only the most frequent terms.
    pub max_features: Option<usize>,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            language: "russian".to_string(),
            stop_words: Vec::new(),
            ngram_max: 2,
            min_df: 1,
            max_df: 1.0,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    None,
    Ollama,
    Hash,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProvider,
    pub url: String,
    pub model: String,
    pub dim: usize,
    pub timeout_secs: u64,
    /// Directory with `tokenizer.json`, `config.json` and weights for the local model.
    pub model_dir: Option<String>,
    pub show_progress: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::None,
            url: "http://localhost:11434".to_string(),
            model: "aroxima/multilingual-e5-large-instruct:latest".to_string(),
            dim: 1024,
            timeout_secs: 30,
            model_dir: None,
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    pub idle_timeout_secs: u64,
    pub max_turns: usize,
    pub max_message_chars: usize,
}

impl Default for SessionSettings {
    fn default() -> Self { Self { idle_timeout_secs: 3600, max_turns: 20, max_message_chars: 4000 } }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with a TOML document; no files or env vars are read.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(toml));
        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::Config(format!("Failed to get '{key}': {e}")))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment.extract().map_err(|e| Error::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        let s = self.settings()?;
        if s.retriever.k == 0 {
            return Err(Error::Config("retriever.k must be at least 1".to_string()));
        }
        if s.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be at least 1".to_string()));
        }
        if s.chunking.chunk_overlap >= s.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                s.chunking.chunk_overlap, s.chunking.chunk_size
            )));
        }
        if s.tfidf.ngram_max == 0 {
            return Err(Error::Config("tfidf.ngram_max must be at least 1".to_string()));
        }
        if !(s.tfidf.max_df > 0.0 && s.tfidf.max_df <= 1.0) {
            return Err(Error::Config("tfidf.max_df must be in (0, 1]".to_string()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_files() {
        let settings = Config::from_toml_str("").expect("config").settings().expect("settings");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.retriever.k, 3);
    }

    #[test]
    fn toml_overrides_nested_values() {
        let toml = r#"
            [retriever]
            k = 5
            strategy = "embedding"

            [embedding]
            provider = "hash"
            dim = 64
        "#;
        let config = Config::from_toml_str(toml).expect("config");
        let settings = config.settings().expect("settings");
        assert_eq!(settings.retriever.k, 5);
        assert_eq!(settings.retriever.strategy, StrategyKind::Embedding);
        assert_eq!(settings.embedding.provider, EmbeddingProvider::Hash);
        assert_eq!(settings.embedding.dim, 64);
        assert_eq!(settings.chunking, ChunkingConfig::default());
        let k: usize = config.get("retriever.k").expect("get");
        assert_eq!(k, 5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Config::from_toml_str("[retriever]\nk = 0").is_err());
        assert!(Config::from_toml_str("[chunking]\nchunk_size = 10\nchunk_overlap = 10").is_err());
        assert!(Config::from_toml_str("[tfidf]\nmax_df = 0.0").is_err());
    }

    #[test]
    fn plain_paths_are_left_alone() {
        assert_eq!(expand_path("data/docs"), PathBuf::from("data/docs"));
        assert_eq!(expand_path("/abs/data"), PathBuf::from("/abs/data"));
    }
}
