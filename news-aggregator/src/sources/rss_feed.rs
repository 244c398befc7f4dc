use crate::parser::FeedParser;
use crate::sources::SourceEntry;
use crate::traits::PageFetch;
use crate::types::{AggregatorError, FeedEntry, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Reads one registry outlet: fetches its feed document and parses it.
pub struct FeedReader {
    fetch: Arc<dyn PageFetch>,
    parser: FeedParser,
}

impl FeedReader {
    pub fn new(fetch: Arc<dyn PageFetch>) -> Self {
        Self {
            fetch,
            parser: FeedParser::new(),
        }
    }

    /// Every failure comes back as `AggregatorError::Fetch` naming the outlet,
    /// including a document that parses but holds no usable entries.
    pub async fn read(&self, entry: &SourceEntry) -> Result<Vec<FeedEntry>> {
        let fetch_error = |reason: String| AggregatorError::Fetch {
            outlet: entry.source,
            reason,
        };

        let body = self
            .fetch
            .fetch_text(&entry.feed_url)
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let feed = self
            .parser
            .parse_feed(&body)
            .map_err(|e| fetch_error(e.to_string()))?;

        if feed.entries.is_empty() {
            warn!("Feed for {} returned no entries", entry.source);
            return Err(fetch_error("feed contains no entries".to_string()));
        }

        info!(
            "Pulled {} entries from {} ({})",
            feed.entries.len(),
            entry.source,
            feed.title.as_deref().unwrap_or("untitled feed")
        );

        Ok(feed.entries)
    }
}
