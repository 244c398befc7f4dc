use crate::traits::PageFetch;
use crate::types::{AggregatorError, Result};
use crate::utils::collapse_whitespace;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, warn};

/// Containers tried in order when looking for the article body.
const CONTAINER_SELECTORS: &[&str] = &[
    "article",
    r#"[itemprop="articleBody"]"#,
    "main",
    "div.article-body",
    "div.entry-content",
    "div.post-content",
    "body",
];

pub const DEFAULT_MIN_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOrigin {
    Page,
    FeedSummary,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub origin: ExtractionOrigin,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub struct ContentExtractor {
    fetch: Arc<dyn PageFetch>,
    min_chars: usize,
}

impl ContentExtractor {
    pub fn new(fetch: Arc<dyn PageFetch>) -> Self {
        Self {
            fetch,
            min_chars: DEFAULT_MIN_CHARS,
        }
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Body text for `url`. Never fails: on any extraction error the feed
    /// summary is used, and if that is blank the body is empty.
    pub async fn extract(&self, url: &str, feed_summary: &str) -> Extraction {
        match self.extract_page(url).await {
            Ok(text) => Extraction {
                text,
                origin: ExtractionOrigin::Page,
            },
            Err(e) => {
                warn!("{}; falling back to feed summary", e);
                let summary = collapse_whitespace(feed_summary);
                if summary.is_empty() {
                    Extraction {
                        text: String::new(),
                        origin: ExtractionOrigin::Empty,
                    }
                } else {
                    Extraction {
                        text: summary,
                        origin: ExtractionOrigin::FeedSummary,
                    }
                }
            }
        }
    }

    async fn extract_page(&self, url: &str) -> Result<String> {
        let html = self
            .fetch
            .fetch_text(url)
            .await
            .map_err(|e| AggregatorError::Extraction {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        extract_main_text(&html, self.min_chars).ok_or_else(|| AggregatorError::Extraction {
            url: url.to_string(),
            reason: "no readable text in page".to_string(),
        })
    }
}

/// Pull the readable paragraphs out of an HTML document.
///
/// The first container holding at least `min_chars` of paragraph text wins.
/// Otherwise the longest non-empty candidate is returned.
pub fn extract_main_text(html: &str, min_chars: usize) -> Option<String> {
    let document = Html::parse_document(html);
    let paragraph = Selector::parse("p").ok()?;

    let mut longest: Option<String> = None;

    for css in CONTAINER_SELECTORS {
        let Ok(container) = Selector::parse(css) else {
            continue;
        };

        for element in document.select(&container) {
            let paragraphs: Vec<String> = element
                .select(&paragraph)
                .map(|p| collapse_whitespace(&p.text().collect::<Vec<_>>().join(" ")))
                .filter(|p| !p.is_empty())
                .collect();

            if paragraphs.is_empty() {
                continue;
            }

            let text = paragraphs.join("\n\n");
            if text.chars().count() >= min_chars {
                debug!("Extracted {} chars from <{}>", text.len(), css);
                return Some(text);
            }

            if longest.as_ref().map_or(0, |l| l.len()) < text.len() {
                longest = Some(text);
            }
        }
    }

    longest
}
