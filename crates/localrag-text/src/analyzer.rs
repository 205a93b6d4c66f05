use anyhow::{anyhow, Result};
use tantivy::tokenizer::{Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter, TextAnalyzer, TokenStream};

/// Tokens longer than this many bytes are dropped (hashes, base64 blobs).
const MAX_TOKEN_BYTES: usize = 40;

/// Token pipeline shared by indexing and querying:
/// alphanumeric split → long-token removal → lowercase → stop words → stem.
#[derive(Clone)]
pub struct Analyzer {
    language: Language,
    inner: TextAnalyzer,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer").field("language", &self.language).finish()
    }
}

impl Analyzer {
    pub fn new(language: &str, stop_words: &[String]) -> Result<Self> {
        let language = parse_language(language)?;
        let inner = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
            .filter(LowerCaser)
            .filter(StopWordFilter::remove(stop_words.iter().map(|w| w.to_lowercase())))
            .filter(Stemmer::new(language))
            .build();
        Ok(Self { language, inner })
    }

    pub fn language(&self) -> Language { self.language }

    pub fn tokens(&self, text: &str) -> Vec<String> {
        // `token_stream` needs `&mut`; analyzers are cheap to clone.
        let mut analyzer = self.inner.clone();
        let mut stream = analyzer.token_stream(text);
        let mut out = Vec::new();
        while stream.advance() {
            out.push(stream.token().text.clone());
        }
        out
    }
}

pub fn parse_language(name: &str) -> Result<Language> {
    let language = match name.trim().to_lowercase().as_str() {
        "ru" | "russian" => Language::Russian,
        "en" | "english" => Language::English,
        "de" | "german" => Language::German,
        "fr" | "french" => Language::French,
        "es" | "spanish" => Language::Spanish,
        "it" | "italian" => Language::Italian,
        "pt" | "portuguese" => Language::Portuguese,
        "nl" | "dutch" => Language::Dutch,
        "sv" | "swedish" => Language::Swedish,
        "no" | "norwegian" => Language::Norwegian,
        "da" | "danish" => Language::Danish,
        "fi" | "finnish" => Language::Finnish,
        "hu" | "hungarian" => Language::Hungarian,
        "ro" | "romanian" => Language::Romanian,
        "tr" | "turkish" => Language::Turkish,
        "el" | "greek" => Language::Greek,
        "ar" | "arabic" => Language::Arabic,
        "ta" | "tamil" => Language::Tamil,
        other => return Err(anyhow!("Unsupported stemmer language: {other}")),
    };
    Ok(language)
}
