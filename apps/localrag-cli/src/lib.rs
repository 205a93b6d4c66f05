//! Shared start-up for the `localrag` binaries: logging, config, and an index
//! built from the configured data directory.
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use localrag_core::config::{expand_path, Config, Settings, StrategyKind};
use localrag_core::loader::DocumentLoader;
use localrag_core::traits::Embedder;
use localrag_embed::get_default_embedder;
use localrag_retriever::Retriever;

pub const USAGE: &str = "Usage: localrag <stats|query|keywords> [\"<query>\"] [-k N]";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Stats,
    Query(String),
    Keywords(String),
}

/// Validate a `localrag` command line (without the program name) before
/// anything is loaded or indexed. Returns the command and an explicit `-k`.
pub fn parse_command(args: &[String]) -> std::result::Result<(Command, Option<usize>), String> {
    let (cmd, rest) = args.split_first().ok_or_else(|| "Missing command".to_string())?;
    let mut query = None;
    let mut k = None;
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-k" | "--k" => match iter.next().and_then(|v| v.parse::<usize>().ok()) {
                Some(n) if n > 0 => k = Some(n),
                _ => return Err("-k expects a positive integer".to_string()),
            },
            _ => query = Some(arg.clone()),
        }
    }
    let command = match (cmd.as_str(), query) {
        ("stats", _) => Command::Stats,
        ("query", Some(q)) => Command::Query(q),
        ("keywords", Some(q)) => Command::Keywords(q),
        ("query" | "keywords", None) => return Err("Missing query".to_string()),
        (other, _) => return Err(format!("Unknown command: {other}")),
    };
    Ok((command, k))
}

/// Used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// `RUST_LOG` wins; otherwise [`DEFAULT_LOG_FILTER`].
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn load_settings() -> Result<Settings> {
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    Ok(config.settings()?)
}

/// Load every document under `data.dir` and index it.
pub fn build_retriever(settings: &Settings) -> Result<Retriever> {
    let start = Instant::now();
    let data_dir = expand_path(&settings.data.dir);
    let chunks = DocumentLoader::new(&settings.chunking).load_directory_limited(&data_dir, settings.data.file_limit)?;
    let embedder = configured_embedder(settings);
    let retriever = Retriever::from_settings(settings, embedder);
    retriever.index(chunks)?;
    info!(dir = %data_dir.display(), ms = start.elapsed().as_millis() as u64, "retriever ready");
    Ok(retriever)
}

/// The embedder the settings ask for, or `None` for the lexical strategy.
///
/// A provider that cannot be constructed is logged and left out, so the index
/// falls back to lexical vectors instead of failing start-up.
pub fn configured_embedder(settings: &Settings) -> Option<Arc<dyn Embedder>> {
    if settings.retriever.strategy != StrategyKind::Embedding {
        return None;
    }
    match get_default_embedder(&settings.embedding) {
        Ok(embedder) => embedder,
        Err(e) => {
            warn!(provider = ?settings.embedding.provider, error = %e, "embedding provider unavailable; using lexical strategy");
            None
        }
    }
}
