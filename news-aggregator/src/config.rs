use crate::extractor::DEFAULT_MIN_CHARS;
use crate::llm_adapter::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::summarizer::{DEFAULT_MAX_PROMPT_CHARS, DEFAULT_SENTENCES};
use crate::types::{AggregatorError, FetchConfig, Result};
use chrono::NaiveTime;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://news.db";
pub const MAX_EXCERPT_CHARS: usize = 10_000;

/// Credentials and endpoint for the AI summary strategy.
#[derive(Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl LlmSettings {
    /// A missing or blank key means the AI strategy is off.
    pub fn from_parts(api_key: Option<String>, model: Option<String>, base_url: Option<String>) -> Option<Self> {
        let api_key = api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())?;
        Some(Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Keep only entries whose title or feed summary mentions AI.
    ///
    /// Dropped entries are counted in `RunReport::entries_filtered` and never
    /// reach `articles_seen`, so with this on `articles_seen` counts relevant
    /// entries only. Turn it off to see every feed entry.
    pub ai_filter: bool,
    pub summary_sentences: usize,
    pub max_prompt_chars: usize,
    pub max_excerpt_chars: usize,
    pub min_extracted_chars: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            ai_filter: true,
            summary_sentences: DEFAULT_SENTENCES,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            max_excerpt_chars: MAX_EXCERPT_CHARS,
            min_extracted_chars: DEFAULT_MIN_CHARS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub llm: Option<LlmSettings>,
    pub fetch: FetchConfig,
    pub pipeline: PipelineOptions,
    /// Local time of the daily run.
    pub schedule_at: NaiveTime,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            llm: None,
            fetch: FetchConfig::default(),
            pipeline: PipelineOptions::default(),
            schedule_at: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(AggregatorError::Config(format!(
                "database url must use the sqlite scheme, got {:?}",
                self.database_url
            )));
        }
        if self.fetch.timeout_seconds == 0 {
            return Err(AggregatorError::Config("timeout must be at least one second".to_string()));
        }
        if self.pipeline.summary_sentences == 0 {
            return Err(AggregatorError::Config("summary sentence target must be positive".to_string()));
        }
        if let Some(llm) = &self.llm {
            if llm.api_key.trim().is_empty() {
                return Err(AggregatorError::Config("blank API key; leave it unset instead".to_string()));
            }
            if llm.model.trim().is_empty() {
                return Err(AggregatorError::Config("model name is empty".to_string()));
            }
        }
        Ok(())
    }

    pub fn ai_enabled(&self) -> bool {
        self.llm.is_some()
    }
}
