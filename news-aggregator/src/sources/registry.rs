use crate::types::Category;
use interfaces::Source;
use serde::Serialize;

/// A configured outlet: where its feed lives and what it mostly covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    pub source: Source,
    pub feed_url: String,
    /// Display hint only. Classification never reads it.
    pub focus: Category,
}

impl SourceEntry {
    pub fn new(source: Source, feed_url: impl Into<String>, focus: Category) -> Self {
        Self {
            source,
            feed_url: feed_url.into(),
            focus,
        }
    }
}

/// The fixed outlet list, in `Source::ALL` order.
pub fn registry() -> Vec<SourceEntry> {
    Source::ALL
        .iter()
        .map(|source| {
            let (feed_url, focus) = feed_of(*source);
            SourceEntry::new(*source, feed_url, focus)
        })
        .collect()
}

fn feed_of(source: Source) -> (&'static str, Category) {
    match source {
        Source::MitTechnologyReview => (
            "https://www.technologyreview.com/feed/",
            Category::ResearchBreakthroughs,
        ),
        Source::TheVerge => (
            "https://www.theverge.com/rss/ai-artificial-intelligence/index.xml",
            Category::LargeLanguageModels,
        ),
        Source::Wired => (
            "https://www.wired.com/feed/tag/ai/latest/rss",
            Category::ResearchBreakthroughs,
        ),
        Source::ArsTechnica => (
            "https://feeds.arstechnica.com/arstechnica/technology-lab",
            Category::ResearchBreakthroughs,
        ),
        Source::VentureBeat => (
            "https://venturebeat.com/category/ai/feed/",
            Category::StartupsBusiness,
        ),
        Source::TechCrunch => (
            "https://techcrunch.com/category/artificial-intelligence/feed/",
            Category::StartupsBusiness,
        ),
        Source::Guardian => (
            "https://www.theguardian.com/technology/artificialintelligenceai/rss",
            Category::EthicsRegulation,
        ),
        Source::Reuters => (
            "https://www.reuters.com/technology/rss",
            Category::Industry,
        ),
        Source::IeeeSpectrum => (
            "https://spectrum.ieee.org/feeds/topic/artificial-intelligence.rss",
            Category::ResearchBreakthroughs,
        ),
        Source::GoogleAiBlog => (
            "https://blog.google/technology/ai/rss/",
            Category::LargeLanguageModels,
        ),
    }
}
