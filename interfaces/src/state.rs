use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;

use crate::defs::{
    Article, ArticleFilter, ArticleStore, Category, InsertOutcome, NewArticle, Source, StoreStats,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt row {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

const ARTICLE_COLUMNS: &str =
    "id, source_name, title, url, content_hash, published_at, category, summary, raw_excerpt, fetched_at";

/// SQLite-backed article store shared by the ingestion run and read-only consumers.
#[derive(Clone)]
pub struct SqliteArticleStore {
    pool: SqlitePool,
}

impl SqliteArticleStore {
    /// Open (creating if needed) the database at `database_url` and apply migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to an in-memory database is a separate database,
        // so keep exactly one alive for the life of the pool.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        let store = Self { pool };
        store.migrate().await?;
        info!("Article store ready at {}", database_url);
        Ok(store)
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn article_from_row(row: &SqliteRow) -> Result<Article, StoreError> {
    let id: String = row.try_get("id")?;
    let source_name: String = row.try_get("source_name")?;
    let category: String = row.try_get("category")?;

    let corrupt = |reason: String| StoreError::Corrupt { id: id.clone(), reason };

    Ok(Article {
        id: Uuid::parse_str(&id).map_err(|e| corrupt(e.to_string()))?,
        source: Source::from_str(&source_name).map_err(|e| corrupt(e.to_string()))?,
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        content_hash: row.try_get("content_hash")?,
        published_at: row.try_get::<DateTime<Utc>, _>("published_at")?,
        category: Category::from_str(&category).map_err(|e| corrupt(e.to_string()))?,
        summary: row.try_get("summary")?,
        raw_excerpt: row.try_get("raw_excerpt")?,
        fetched_at: row.try_get::<DateTime<Utc>, _>("fetched_at")?,
    })
}

#[async_trait]
impl ArticleStore for SqliteArticleStore {
    async fn contains_url(&self, url: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM articles WHERE url = ?1")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("count")? > 0)
    }

    async fn insert_if_absent(&self, article: &NewArticle) -> Result<InsertOutcome, StoreError> {
        let id = Uuid::new_v4();

        // Single statement: the existence check and the write cannot interleave.
        let result = sqlx::query(
            r#"
            INSERT INTO articles (id, source_name, title, url, content_hash, published_at, category, summary, raw_excerpt, fetched_at)
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10
            WHERE NOT EXISTS (SELECT 1 FROM articles WHERE url = ?4 OR content_hash = ?5)
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(id.to_string())
        .bind(article.source.name())
        .bind(&article.title)
        .bind(&article.url)
        .bind(&article.content_hash)
        .bind(article.published_at)
        .bind(article.category.label())
        .bind(&article.summary)
        .bind(&article.raw_excerpt)
        .bind(article.fetched_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            debug!("Inserted article {} ({})", id, article.url);
            Ok(InsertOutcome::Inserted(id))
        } else {
            debug!("Skipped duplicate article {}", article.url);
            Ok(InsertOutcome::Duplicate)
        }
    }

    async fn list(&self, filter: &ArticleFilter) -> Result<Vec<Article>, StoreError> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM articles WHERE 1 = 1", ARTICLE_COLUMNS));

        if let Some(category) = filter.category {
            query.push(" AND category = ").push_bind(category.label());
        }
        if let Some(source) = filter.source {
            query.push(" AND source_name = ").push_bind(source.name());
        }
        if let Some(since) = filter.since {
            query.push(" AND fetched_at >= ").push_bind(since);
        }

        query.push(" ORDER BY published_at DESC, fetched_at DESC");

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(i64::from(limit));
        }

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(article_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        let row = sqlx::query(&format!("SELECT {} FROM articles WHERE id = ?1", ARTICLE_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(article_from_row).transpose()
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let total_articles: i64 = sqlx::query("SELECT COUNT(*) AS count FROM articles")
            .fetch_one(&self.pool)
            .await?
            .try_get("count")?;

        let latest_fetch = sqlx::query("SELECT fetched_at FROM articles ORDER BY fetched_at DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?
            .map(|row| row.try_get::<DateTime<Utc>, _>("fetched_at"))
            .transpose()?;

        let category_rows = sqlx::query("SELECT category, COUNT(*) AS count FROM articles GROUP BY category")
            .fetch_all(&self.pool)
            .await?;
        let mut by_category: Vec<(Category, i64)> = Category::ALL.iter().map(|c| (*c, 0)).collect();
        for row in category_rows {
            let label: String = row.try_get("category")?;
            let count: i64 = row.try_get("count")?;
            let category = Category::from_str(&label).map_err(|e| StoreError::Corrupt {
                id: format!("category {}", label),
                reason: e.to_string(),
            })?;
            if let Some(slot) = by_category.iter_mut().find(|(c, _)| *c == category) {
                slot.1 = count;
            }
        }

        let source_rows = sqlx::query("SELECT source_name, COUNT(*) AS count FROM articles GROUP BY source_name")
            .fetch_all(&self.pool)
            .await?;
        let mut by_source: Vec<(Source, i64)> = Source::ALL.iter().map(|s| (*s, 0)).collect();
        for row in source_rows {
            let name: String = row.try_get("source_name")?;
            let count: i64 = row.try_get("count")?;
            let source = Source::from_str(&name).map_err(|e| StoreError::Corrupt {
                id: format!("source {}", name),
                reason: e.to_string(),
            })?;
            if let Some(slot) = by_source.iter_mut().find(|(s, _)| *s == source) {
                slot.1 = count;
            }
        }

        Ok(StoreStats {
            total_articles,
            latest_fetch,
            by_category,
            by_source,
        })
    }
}
