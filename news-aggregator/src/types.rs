use chrono::{DateTime, Utc};
use interfaces::{Source, StoreError};
use serde::{Deserialize, Serialize};

pub use interfaces::{Article, ArticleFilter, ArticleStore, Category, InsertOutcome, NewArticle, StoreStats};

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Extra attempts after the first one. Zero means a single attempt.
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_body_size_mb: usize,
    pub max_redirects: usize,
    /// Minimum spacing between two requests to the same host.
    pub min_host_interval_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; AI-News-Aggregator/1.0)".to_string(),
            timeout_seconds: 30,
            max_retries: 0,
            retry_delay_seconds: 2,
            max_body_size_mb: 10,
            max_redirects: 5,
            min_host_interval_ms: 1000,
        }
    }
}

/// One item of a parsed feed document, already cleaned of markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: String,
}

#[derive(Debug)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("Fetch failed for {outlet}: {reason}")]
    Fetch { outlet: Source, reason: String },

    #[error("Extraction failed for {url}: {reason}")]
    Extraction { url: String, reason: String },

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Body of {url} exceeds {limit_mb}MB")]
    BodyTooLarge { url: String, limit_mb: usize },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AggregatorError {
    /// Only storage failures end a run; everything else is scoped to one source or article.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AggregatorError::Persistence(_))
    }
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
