#![allow(dead_code)]

use async_trait::async_trait;
use interfaces::{
    Article, ArticleFilter, ArticleStore, InsertOutcome, NewArticle, SqliteArticleStore, StoreError, StoreStats,
};
use news_aggregator::{AggregatorError, PageFetch, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

pub async fn memory_store() -> std::result::Result<Arc<SqliteArticleStore>, StoreError> {
    Ok(Arc::new(SqliteArticleStore::connect("sqlite::memory:").await?))
}

/// Serves canned documents by URL; anything else is a 404.
#[derive(Default)]
pub struct CannedFetch {
    documents: HashMap<String, String>,
    requests: AtomicUsize,
}

impl CannedFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: impl Into<String>) -> Self {
        self.documents.insert(url.to_string(), body.into());
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetch for CannedFetch {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| AggregatorError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Store whose reads work but whose writes always fail.
pub struct BrokenStore;

#[async_trait]
impl ArticleStore for BrokenStore {
    async fn contains_url(&self, _url: &str) -> std::result::Result<bool, StoreError> {
        Ok(false)
    }

    async fn insert_if_absent(&self, _article: &NewArticle) -> std::result::Result<InsertOutcome, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn list(&self, _filter: &ArticleFilter) -> std::result::Result<Vec<Article>, StoreError> {
        Ok(Vec::new())
    }

    async fn get(&self, _id: Uuid) -> std::result::Result<Option<Article>, StoreError> {
        Ok(None)
    }

    async fn stats(&self) -> std::result::Result<StoreStats, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }
}

pub struct Item<'a> {
    pub title: &'a str,
    pub link: &'a str,
    pub description: &'a str,
    pub pub_date: Option<&'a str>,
}

impl<'a> Item<'a> {
    pub fn new(title: &'a str, link: &'a str, description: &'a str) -> Self {
        Self {
            title,
            link,
            description,
            pub_date: None,
        }
    }

    pub fn dated(mut self, pub_date: &'a str) -> Self {
        self.pub_date = Some(pub_date);
        self
    }
}

pub fn rss(items: &[Item<'_>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Test Feed</title><link>https://news.test/</link><description>Test</description>"#,
    );
    for item in items {
        xml.push_str("<item>");
        xml.push_str(&format!("<title>{}</title>", item.title));
        xml.push_str(&format!("<link>{}</link>", item.link));
        xml.push_str(&format!("<description><![CDATA[{}]]></description>", item.description));
        if let Some(date) = item.pub_date {
            xml.push_str(&format!("<pubDate>{}</pubDate>", date));
        }
        xml.push_str("</item>");
    }
    xml.push_str("</channel></rss>");
    xml
}

/// An article page whose body is the given paragraphs inside <article>.
pub fn page(paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    format!(
        "<html><head><title>t</title></head><body><nav><p>Menu</p></nav><article>{}</article></body></html>",
        body
    )
}
