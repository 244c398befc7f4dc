use crate::types::Result;
use async_trait::async_trait;

/// Trait for retrieving remote documents (feed XML, article pages).
#[async_trait]
pub trait PageFetch: Send + Sync {
    /// Fetch `url` and return the decoded body.
    /// Non-success statuses and oversized bodies are errors.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}
