use crate::categorizer::{categorize, is_ai_relevant};
use crate::config::{PipelineOptions, Settings};
use crate::dedup::{content_hash, normalize_url};
use crate::extractor::{ContentExtractor, ExtractionOrigin};
use crate::fetcher::Fetcher;
use crate::llm_adapter::{LlmAdapter, OpenAiAdapter};
use crate::sources::{registry, FeedReader, SourceEntry};
use crate::summarizer::{Summarizer, SummaryStrategy};
use crate::traits::PageFetch;
use crate::types::{ArticleStore, FeedEntry, InsertOutcome, NewArticle, Result};
use crate::utils::truncate_chars;
use chrono::{DateTime, Utc};
use interfaces::Source;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    FetchingSource(usize),
    ExtractingArticle,
    Categorizing,
    Summarizing,
    Persisting,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: Source,
    pub reason: String,
}

/// Counters for one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub sources_attempted: usize,
    pub sources_failed: usize,
    pub source_failures: Vec<SourceFailure>,
    /// Entries dropped by the AI relevance filter. Not counted as seen.
    pub entries_filtered: usize,
    pub articles_seen: usize,
    pub articles_inserted: usize,
    pub duplicates_skipped: usize,
    pub extraction_fallbacks: usize,
    pub empty_bodies: usize,
    pub ai_summaries: usize,
    pub extractive_summaries: usize,
    pub summarization_fallbacks: usize,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: None,
            sources_attempted: 0,
            sources_failed: 0,
            source_failures: Vec::new(),
            entries_filtered: 0,
            articles_seen: 0,
            articles_inserted: 0,
            duplicates_skipped: 0,
            extraction_fallbacks: 0,
            empty_bodies: 0,
            ai_summaries: 0,
            extractive_summaries: 0,
            summarization_fallbacks: 0,
        }
    }
}

/// Batch ingestion over the source registry. Sources and their entries are
/// processed one at a time; the store is the only shared state.
pub struct IngestionPipeline {
    store: Arc<dyn ArticleStore>,
    reader: FeedReader,
    extractor: ContentExtractor,
    summarizer: Summarizer,
    sources: Vec<SourceEntry>,
    options: PipelineOptions,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        fetch: Arc<dyn PageFetch>,
        summarizer: Summarizer,
        options: PipelineOptions,
    ) -> Self {
        let extractor = ContentExtractor::new(fetch.clone()).with_min_chars(options.min_extracted_chars);
        Self {
            store,
            reader: FeedReader::new(fetch),
            extractor,
            summarizer,
            sources: registry(),
            options,
        }
    }

    /// Wire up the live HTTP fetcher and, when a key is configured, the OpenAI adapter.
    pub fn from_settings(settings: &Settings, store: Arc<dyn ArticleStore>) -> Result<Self> {
        let fetch: Arc<dyn PageFetch> = Arc::new(Fetcher::new(settings.fetch.clone())?);

        let adapter: Option<Arc<dyn LlmAdapter>> = match &settings.llm {
            Some(llm) => Some(Arc::new(OpenAiAdapter::new(
                llm.api_key.clone(),
                llm.model.clone(),
                llm.base_url.clone(),
                Duration::from_secs(settings.fetch.timeout_seconds),
            )?)),
            None => None,
        };

        let summarizer = Summarizer::new(adapter, settings.pipeline.summary_sentences)
            .with_max_prompt_chars(settings.pipeline.max_prompt_chars);

        Ok(Self::new(store, fetch, summarizer, settings.pipeline.clone()))
    }

    pub fn with_sources(mut self, sources: Vec<SourceEntry>) -> Self {
        self.sources = sources;
        self
    }

    pub fn sources(&self) -> &[SourceEntry] {
        &self.sources
    }

    fn enter(stage: &mut RunStage, next: RunStage) {
        debug!("Stage {:?} -> {:?}", stage, next);
        *stage = next;
    }

    /// Run one full pass over every source.
    ///
    /// Fetch, extraction and summarization failures are absorbed and counted.
    /// A store failure aborts the run and is returned.
    pub async fn run_once(&self) -> Result<RunReport> {
        let mut report = RunReport::new(Utc::now());
        let mut stage = RunStage::Idle;

        info!(
            "Starting ingestion run over {} sources (AI summaries {})",
            self.sources.len(),
            if self.summarizer.uses_ai() { "on" } else { "off" }
        );

        for (index, entry) in self.sources.iter().enumerate() {
            Self::enter(&mut stage, RunStage::FetchingSource(index));
            report.sources_attempted += 1;

            let entries = match self.reader.read(entry).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Skipping source {}: {}", entry.source, e);
                    report.sources_failed += 1;
                    report.source_failures.push(SourceFailure {
                        source: entry.source,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for feed_entry in &entries {
                if self.options.ai_filter && !is_ai_relevant(&feed_entry.title, &feed_entry.summary) {
                    debug!("Filtered non-AI entry: {}", feed_entry.title);
                    report.entries_filtered += 1;
                    continue;
                }

                if let Err(e) = self.process_entry(entry.source, feed_entry, &mut stage, &mut report).await {
                    error!("Aborting run: {}", e);
                    return Err(e);
                }
            }
        }

        Self::enter(&mut stage, RunStage::Done);
        report.finished_at = Some(Utc::now());

        info!(
            "Run finished: {} seen, {} inserted, {} duplicates, {}/{} sources failed",
            report.articles_seen,
            report.articles_inserted,
            report.duplicates_skipped,
            report.sources_failed,
            report.sources_attempted
        );

        Ok(report)
    }

    async fn process_entry(
        &self,
        source: Source,
        entry: &FeedEntry,
        stage: &mut RunStage,
        report: &mut RunReport,
    ) -> Result<()> {
        report.articles_seen += 1;
        let url = normalize_url(&entry.link);

        if self.store.contains_url(&url).await? {
            debug!("Already stored: {}", url);
            report.duplicates_skipped += 1;
            return Ok(());
        }

        Self::enter(stage, RunStage::ExtractingArticle);
        let fetched_at = Utc::now();
        let extraction = self.extractor.extract(&entry.link, &entry.summary).await;
        match extraction.origin {
            ExtractionOrigin::Page => {}
            ExtractionOrigin::FeedSummary => report.extraction_fallbacks += 1,
            ExtractionOrigin::Empty => {
                report.extraction_fallbacks += 1;
                report.empty_bodies += 1;
            }
        }

        Self::enter(stage, RunStage::Categorizing);
        let category = categorize(&entry.title, &extraction.text);

        Self::enter(stage, RunStage::Summarizing);
        let summary = self.summarizer.summarize(&entry.title, &extraction.text).await;
        match summary.strategy {
            SummaryStrategy::Ai => report.ai_summaries += 1,
            SummaryStrategy::Extractive => report.extractive_summaries += 1,
        }
        if summary.fell_back {
            report.summarization_fallbacks += 1;
        }

        Self::enter(stage, RunStage::Persisting);
        let article = NewArticle {
            source,
            title: entry.title.clone(),
            content_hash: content_hash(&url, &entry.title, &extraction.text),
            url,
            published_at: entry.published_at.unwrap_or(fetched_at),
            category,
            summary: summary.text,
            raw_excerpt: truncate_chars(&extraction.text, self.options.max_excerpt_chars).to_string(),
            fetched_at,
        };

        match self.store.insert_if_absent(&article).await? {
            InsertOutcome::Inserted(id) => {
                info!("Stored [{}] {} ({})", article.category, article.title, id);
                report.articles_inserted += 1;
            }
            InsertOutcome::Duplicate => {
                debug!("Duplicate content for {}", article.url);
                report.duplicates_skipped += 1;
            }
        }

        Ok(())
    }
}
