use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::StoreError;

/// Topical bucket an article is filed under. Declaration order is the
/// tie-break priority used by the categorizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Large Language Models (LLMs)")]
    LargeLanguageModels,
    #[serde(rename = "AI Research & Breakthroughs")]
    ResearchBreakthroughs,
    #[serde(rename = "AI in Industry")]
    Industry,
    #[serde(rename = "AI Ethics & Regulation")]
    EthicsRegulation,
    #[serde(rename = "AI Startups & Business")]
    StartupsBusiness,
    #[default]
    #[serde(rename = "Uncategorized")]
    Uncategorized,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::LargeLanguageModels,
        Category::ResearchBreakthroughs,
        Category::Industry,
        Category::EthicsRegulation,
        Category::StartupsBusiness,
        Category::Uncategorized,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::LargeLanguageModels => "Large Language Models (LLMs)",
            Category::ResearchBreakthroughs => "AI Research & Breakthroughs",
            Category::Industry => "AI in Industry",
            Category::EthicsRegulation => "AI Ethics & Regulation",
            Category::StartupsBusiness => "AI Startups & Business",
            Category::Uncategorized => "Uncategorized",
        }
    }

    /// Short form accepted on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::LargeLanguageModels => "llms",
            Category::ResearchBreakthroughs => "research",
            Category::Industry => "industry",
            Category::EthicsRegulation => "ethics",
            Category::StartupsBusiness => "startups",
            Category::Uncategorized => "uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted) || c.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownVariant { kind: "category", value: wanted.to_owned() })
    }
}

/// One of the fixed news outlets the aggregator pulls from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "MIT Technology Review")]
    MitTechnologyReview,
    #[serde(rename = "The Verge AI")]
    TheVerge,
    #[serde(rename = "Wired AI")]
    Wired,
    #[serde(rename = "Ars Technica")]
    ArsTechnica,
    #[serde(rename = "VentureBeat AI")]
    VentureBeat,
    #[serde(rename = "TechCrunch AI")]
    TechCrunch,
    #[serde(rename = "The Guardian AI")]
    Guardian,
    #[serde(rename = "Reuters Technology")]
    Reuters,
    #[serde(rename = "IEEE Spectrum AI")]
    IeeeSpectrum,
    #[serde(rename = "Google AI Blog")]
    GoogleAiBlog,
}

impl Source {
    pub const ALL: [Source; 10] = [
        Source::MitTechnologyReview,
        Source::TheVerge,
        Source::Wired,
        Source::ArsTechnica,
        Source::VentureBeat,
        Source::TechCrunch,
        Source::Guardian,
        Source::Reuters,
        Source::IeeeSpectrum,
        Source::GoogleAiBlog,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Source::MitTechnologyReview => "MIT Technology Review",
            Source::TheVerge => "The Verge AI",
            Source::Wired => "Wired AI",
            Source::ArsTechnica => "Ars Technica",
            Source::VentureBeat => "VentureBeat AI",
            Source::TechCrunch => "TechCrunch AI",
            Source::Guardian => "The Guardian AI",
            Source::Reuters => "Reuters Technology",
            Source::IeeeSpectrum => "IEEE Spectrum AI",
            Source::GoogleAiBlog => "Google AI Blog",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Source::ALL
            .into_iter()
            .find(|src| src.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownVariant { kind: "source", value: wanted.to_owned() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// A fully assembled record, ready to be written. Only the store assigns ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub source: Source,
    pub title: String,
    pub url: String,
    pub content_hash: String,
    pub published_at: DateTime<Utc>,
    pub category: Category,
    pub summary: String,
    pub raw_excerpt: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub source: Source,
    pub title: String,
    pub url: String,
    pub content_hash: String,
    pub published_at: DateTime<Utc>,
    pub category: Category,
    pub summary: String,
    pub raw_excerpt: String,
    pub fetched_at: DateTime<Utc>,
}

impl Article {
    pub fn from_new(id: Uuid, new: NewArticle) -> Self {
        Self {
            id,
            source: new.source,
            title: new.title,
            url: new.url,
            content_hash: new.content_hash,
            published_at: new.published_at,
            category: new.category,
            summary: new.summary,
            raw_excerpt: new.raw_excerpt,
            fetched_at: new.fetched_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Uuid),
    Duplicate,
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleFilter {
    pub category: Option<Category>,
    pub source: Option<Source>,
    /// Lower bound on `fetched_at`.
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

impl ArticleFilter {
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub total_articles: i64,
    pub latest_fetch: Option<DateTime<Utc>>,
    pub by_category: Vec<(Category, i64)>,
    pub by_source: Vec<(Source, i64)>,
}

/// Storage for ingested articles.
///
/// The ingestion run is the only writer; readers share the same handle and
/// call the read methods. Articles are write-once, so there is no update or
/// delete.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Cheap existence probe used before the expensive pipeline stages.
    async fn contains_url(&self, url: &str) -> Result<bool, StoreError>;

    /// Atomically insert unless the url (or identical content) is already stored.
    async fn insert_if_absent(&self, article: &NewArticle) -> Result<InsertOutcome, StoreError>;

    async fn list(&self, filter: &ArticleFilter) -> Result<Vec<Article>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Article>, StoreError>;

    async fn stats(&self) -> Result<StoreStats, StoreError>;
}
