use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use localrag_core::config::EmbeddingSettings;
use localrag_core::traits::Embedder;

/// Batches at least this large get a progress bar when progress is enabled.
const PROGRESS_MIN_BATCH: usize = 16;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embeddings from an Ollama server (`POST /api/embeddings`), one request per text.
pub struct OllamaEmbedder {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    dim: usize,
    show_progress: bool,
}

impl OllamaEmbedder {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/embeddings", settings.url.trim_end_matches('/')),
            model: settings.model.clone(),
            dim: settings.dim,
            show_progress: settings.show_progress,
        })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbeddingRequest { model: &self.model, prompt: text })
            .send()
            .with_context(|| format!("Embedding request to {} failed", self.endpoint))?
            .error_for_status()
            .with_context(|| format!("Embedding request to {} was rejected", self.endpoint))?;
        let body: EmbeddingResponse = response.json().context("Malformed embedding response")?;
        if body.embedding.len() != self.dim {
            return Err(anyhow!(
                "Model {} returned {} dimensions, expected {}",
                self.model,
                body.embedding.len(),
                self.dim
            ));
        }
        Ok(body.embedding)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress || len < PROGRESS_MIN_BATCH {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} embeddings ({percent}%)")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

impl Embedder for OllamaEmbedder {
    fn id(&self) -> &str { &self.model }

    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let pb = self.progress_bar(texts.len());
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed_text(text)?);
            pb.inc(1);
        }
        pb.finish_and_clear();
        debug!(model = %self.model, count = out.len(), "embedded batch");
        Ok(out)
    }
}
