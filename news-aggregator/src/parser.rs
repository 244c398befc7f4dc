use crate::types::{AggregatorError, FeedEntry, ParsedFeed, Result};
use crate::utils::{strip_html, truncate_chars};
use chrono::Utc;
use feed_rs::parser;
use std::collections::HashSet;
use tracing::debug;

pub const MAX_SUMMARY_CHARS: usize = 500;

/// RSS/Atom document parser. Stateless between documents; duplicate links are
/// only dropped within the document being parsed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_feed(&self, content: &str) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| strip_html(&t.content));

        let mut seen_links = HashSet::new();
        let mut entries = Vec::new();

        for entry in feed.entries {
            if let Some(parsed) = Self::parse_entry(entry) {
                if seen_links.insert(parsed.link.clone()) {
                    entries.push(parsed);
                } else {
                    debug!("Skipping duplicate entry with link: {}", parsed.link);
                }
            }
        }

        debug!("Parsed feed with {} entries", entries.len());

        Ok(ParsedFeed { title, entries })
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> Option<FeedEntry> {
        let link = entry
            .links
            .first()
            .map(|l| l.href.trim().to_string())
            .filter(|href| !href.is_empty())?;

        let title = entry
            .title
            .map(|t| strip_html(&t.content))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        // Prefer the feed summary; fall back to inline content.
        let raw_summary = entry
            .summary
            .map(|s| s.content)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();
        let summary = truncate_chars(&strip_html(&raw_summary), MAX_SUMMARY_CHARS).to_string();

        let published_at = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.with_timezone(&Utc));

        Some(FeedEntry {
            title,
            link,
            published_at,
            summary,
        })
    }
}
