mod common;

use chrono::{TimeZone, Utc};
use common::{init_tracing, memory_store, page, rss, BrokenStore, CannedFetch, Item};
use interfaces::{ArticleFilter, ArticleStore, Category, NewArticle, Source};
use news_aggregator::extractor::extract_main_text;
use news_aggregator::summarizer::extractive_summary;
use news_aggregator::{
    IngestionPipeline, LlmAdapter, LlmSettings, MockLlmAdapter, PipelineOptions, Result, SourceEntry, Summarizer,
};
use std::sync::Arc;
use tracing::info;

const FEED: &str = "https://feeds.test/ai.xml";
const OTHER_FEED: &str = "https://feeds.test/other.xml";

const LLM_PARAGRAPHS: &[&str] = &[
    "OpenAI announced a new large language model on Monday. The model, called GPT-5, improves reasoning on hard problems.",
    "Developers can reach the chatbot through an updated API. Pricing starts lower than the previous generation.",
    "Early testers reported fewer hallucinations in long sessions. The company plans wider availability next month. Analysts expect rivals to respond quickly.",
];

const STARTUP_PARAGRAPHS: &[&str] = &[
    "Chip startup Lumen raised 200 million dollars in Series B funding. Investors valued the company at 2 billion dollars.",
    "The founder said the money will expand manufacturing of AI accelerators. Revenue tripled last year as demand for inference hardware rose.",
];

fn single_source(url: &str) -> Vec<SourceEntry> {
    vec![SourceEntry::new(Source::TechCrunch, url, Category::StartupsBusiness)]
}

fn three_item_feed() -> String {
    rss(&[
        Item::new("OpenAI ships GPT-5", "https://news.test/a", "OpenAI unveils its next AI model.")
            .dated("Tue, 05 Aug 2025 10:00:00 GMT"),
        Item::new("AI chip startup raises $200M", "https://news.test/b", "Funding for AI hardware."),
        Item::new("EU AI Act takes effect", "https://news.test/c", "New AI rules apply."),
    ])
}

fn canned_three() -> CannedFetch {
    CannedFetch::new()
        .with(FEED, three_item_feed())
        .with("https://news.test/a", page(LLM_PARAGRAPHS))
        .with("https://news.test/b", page(STARTUP_PARAGRAPHS))
}

fn known_article(url: &str) -> NewArticle {
    let now = Utc::now();
    NewArticle {
        source: Source::Guardian,
        title: "Already here".to_string(),
        url: url.to_string(),
        content_hash: "known-hash".to_string(),
        published_at: now,
        category: Category::EthicsRegulation,
        summary: "Stored earlier.".to_string(),
        raw_excerpt: "Stored earlier.".to_string(),
        fetched_at: now,
    }
}

#[tokio::test]
async fn test_three_entries_one_already_stored() -> Result<()> {
    init_tracing();
    let store = memory_store().await?;
    store.insert_if_absent(&known_article("https://news.test/c")).await?;

    let fetch = Arc::new(canned_three());
    let pipeline = IngestionPipeline::new(store.clone(), fetch.clone(), Summarizer::new(None, 6), PipelineOptions::default())
        .with_sources(single_source(FEED));

    let report = pipeline.run_once().await?;
    info!("Report: {:?}", report);

    assert_eq!(report.articles_seen, 3);
    assert_eq!(report.articles_inserted, 2);
    assert_eq!(report.duplicates_skipped, 1);
    assert_eq!(report.sources_attempted, 1);
    assert_eq!(report.sources_failed, 0);
    assert!(report.finished_at.is_some());

    // Feed plus two pages; the known article is never fetched.
    assert_eq!(fetch.requests(), 3);

    let stored = store.list(&ArticleFilter::default()).await?;
    assert_eq!(stored.len(), 3);
    let a = stored.iter().find(|a| a.url == "https://news.test/a").expect("article a");
    assert_eq!(a.category, Category::LargeLanguageModels);
    assert_eq!(a.source, Source::TechCrunch);
    assert_eq!(a.published_at, Utc.with_ymd_and_hms(2025, 8, 5, 10, 0, 0).unwrap());

    let b = stored.iter().find(|a| a.url == "https://news.test/b").expect("article b");
    assert_eq!(b.category, Category::StartupsBusiness);
    assert_eq!(b.published_at, b.fetched_at, "missing feed date falls back to fetch time");

    Ok(())
}

#[tokio::test]
async fn test_second_run_inserts_nothing() -> Result<()> {
    init_tracing();
    let store = memory_store().await?;
    let pipeline = IngestionPipeline::new(
        store.clone(),
        Arc::new(canned_three()),
        Summarizer::new(None, 6),
        PipelineOptions::default(),
    )
    .with_sources(single_source(FEED));

    let first = pipeline.run_once().await?;
    assert_eq!(first.articles_inserted, 3);

    let before = store.list(&ArticleFilter::default()).await?;
    let second = pipeline.run_once().await?;
    assert_eq!(second.articles_inserted, 0);
    assert_eq!(second.duplicates_skipped, second.articles_seen);

    let after = store.list(&ArticleFilter::default()).await?;
    assert_eq!(before, after);

    let mut urls: Vec<&str> = after.iter().map(|a| a.url.as_str()).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), after.len());
    Ok(())
}

#[tokio::test]
async fn test_empty_body_gives_empty_summary_and_default_bucket() -> Result<()> {
    init_tracing();
    let store = memory_store().await?;
    // No page is served for the link and the feed has no description.
    let feed = rss(&[Item::new("OpenAI and Anthropic news roundup", "https://news.test/empty", "")]);
    let pipeline = IngestionPipeline::new(
        store.clone(),
        Arc::new(CannedFetch::new().with(FEED, feed)),
        Summarizer::new(None, 6),
        PipelineOptions::default(),
    )
    .with_sources(single_source(FEED));

    let report = pipeline.run_once().await?;
    assert_eq!(report.articles_inserted, 1);
    assert_eq!(report.empty_bodies, 1);
    assert_eq!(report.extraction_fallbacks, 1);

    let stored = store.list(&ArticleFilter::default()).await?;
    assert_eq!(stored[0].summary, "");
    assert_eq!(stored[0].raw_excerpt, "");
    assert_eq!(stored[0].category, Category::Uncategorized);
    Ok(())
}

#[tokio::test]
async fn test_feed_summary_used_when_page_unavailable() -> Result<()> {
    init_tracing();
    let store = memory_store().await?;
    let feed = rss(&[Item::new(
        "Robotics firm deploys AI",
        "https://news.test/gone",
        "<p>A <b>robotics</b> firm deployed AI in its factories. Output rose sharply.</p>",
    )]);
    let pipeline = IngestionPipeline::new(
        store.clone(),
        Arc::new(CannedFetch::new().with(FEED, feed)),
        Summarizer::new(None, 6),
        PipelineOptions::default(),
    )
    .with_sources(single_source(FEED));

    let report = pipeline.run_once().await?;
    assert_eq!(report.extraction_fallbacks, 1);
    assert_eq!(report.empty_bodies, 0);

    let stored = store.list(&ArticleFilter::default()).await?;
    assert_eq!(
        stored[0].raw_excerpt,
        "A robotics firm deployed AI in its factories. Output rose sharply."
    );
    assert_eq!(stored[0].category, Category::Industry);
    Ok(())
}

#[tokio::test]
async fn test_no_credential_means_no_external_calls() -> Result<()> {
    init_tracing();
    let store = memory_store().await?;
    let mock = Arc::new(MockLlmAdapter::replying("Should never be used."));

    // A blank key counts as unset, so no adapter is handed to the summarizer.
    let adapter: Option<Arc<dyn LlmAdapter>> = LlmSettings::from_parts(Some("   ".to_string()), None, None)
        .map(|_| mock.clone() as Arc<dyn LlmAdapter>);
    assert!(adapter.is_none());

    let pipeline = IngestionPipeline::new(
        store.clone(),
        Arc::new(canned_three()),
        Summarizer::new(adapter, 6),
        PipelineOptions::default(),
    )
    .with_sources(single_source(FEED));

    let report = pipeline.run_once().await?;
    assert_eq!(report.ai_summaries, 0);
    assert_eq!(report.extractive_summaries, report.articles_inserted);
    assert_eq!(mock.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_ai_failure_persists_extractive_summary() -> Result<()> {
    init_tracing();
    let store = memory_store().await?;
    let mock = Arc::new(MockLlmAdapter::failing("quota exceeded"));
    let feed = rss(&[Item::new("OpenAI ships GPT-5", "https://news.test/a", "AI model news.")]);
    let html = page(LLM_PARAGRAPHS);

    let pipeline = IngestionPipeline::new(
        store.clone(),
        Arc::new(CannedFetch::new().with(FEED, feed).with("https://news.test/a", html.clone())),
        Summarizer::new(Some(mock.clone() as Arc<dyn LlmAdapter>), 6),
        PipelineOptions::default(),
    )
    .with_sources(single_source(FEED));

    let report = pipeline.run_once().await?;
    assert_eq!(mock.calls(), 1);
    assert_eq!(report.summarization_fallbacks, 1);
    assert_eq!(report.extractive_summaries, 1);

    let body = extract_main_text(&html, 200).expect("page has text");
    let stored = store.list(&ArticleFilter::default()).await?;
    assert_eq!(stored[0].summary, extractive_summary(&body, 6));
    Ok(())
}

#[tokio::test]
async fn test_ai_reply_is_clamped_to_six_sentences() -> Result<()> {
    init_tracing();
    let store = memory_store().await?;
    let mock = Arc::new(MockLlmAdapter::replying(
        "One. Two. Three. Four. Five. Six. Seven. Eight.",
    ));
    let feed = rss(&[Item::new("OpenAI ships GPT-5", "https://news.test/a", "AI model news.")]);

    let pipeline = IngestionPipeline::new(
        store.clone(),
        Arc::new(CannedFetch::new().with(FEED, feed).with("https://news.test/a", page(LLM_PARAGRAPHS))),
        Summarizer::new(Some(mock.clone() as Arc<dyn LlmAdapter>), 6),
        PipelineOptions::default(),
    )
    .with_sources(single_source(FEED));

    let report = pipeline.run_once().await?;
    assert_eq!(report.ai_summaries, 1);

    let stored = store.list(&ArticleFilter::default()).await?;
    assert_eq!(stored[0].summary, "One. Two. Three. Four. Five. Six.");
    Ok(())
}

#[tokio::test]
async fn test_failing_source_does_not_stop_others() -> Result<()> {
    init_tracing();
    let store = memory_store().await?;
    let sources = vec![
        SourceEntry::new(Source::Reuters, "https://feeds.test/down.xml", Category::Industry),
        SourceEntry::new(Source::Wired, OTHER_FEED, Category::ResearchBreakthroughs),
        SourceEntry::new(Source::TechCrunch, FEED, Category::StartupsBusiness),
    ];
    let fetch = canned_three().with(OTHER_FEED, rss(&[]));

    let pipeline = IngestionPipeline::new(store.clone(), Arc::new(fetch), Summarizer::new(None, 6), PipelineOptions::default())
        .with_sources(sources);

    let report = pipeline.run_once().await?;
    assert_eq!(report.sources_attempted, 3);
    assert_eq!(report.sources_failed, 2, "unreachable and empty feeds both fail");
    assert_eq!(report.source_failures[0].source, Source::Reuters);
    assert_eq!(report.source_failures[1].source, Source::Wired);
    assert_eq!(report.articles_inserted, 3);
    Ok(())
}

#[tokio::test]
async fn test_store_failure_aborts_run() -> Result<()> {
    init_tracing();
    let pipeline = IngestionPipeline::new(
        Arc::new(BrokenStore),
        Arc::new(canned_three()),
        Summarizer::new(None, 6),
        PipelineOptions::default(),
    )
    .with_sources(single_source(FEED));

    let err = pipeline.run_once().await.expect_err("store failure must surface");
    assert!(err.is_fatal());
    Ok(())
}

#[tokio::test]
async fn test_relevance_filter() -> Result<()> {
    init_tracing();
    let feed = rss(&[
        Item::new("Local team wins the cup", "https://news.test/sport", "A thrilling final."),
        Item::new("OpenAI ships GPT-5", "https://news.test/a", "AI model news."),
    ]);
    let fetch = || {
        Arc::new(
            CannedFetch::new()
                .with(FEED, feed.clone())
                .with("https://news.test/a", page(LLM_PARAGRAPHS)),
        )
    };

    let filtered = IngestionPipeline::new(memory_store().await?, fetch(), Summarizer::new(None, 6), PipelineOptions::default())
        .with_sources(single_source(FEED))
        .run_once()
        .await?;
    assert_eq!(filtered.entries_filtered, 1);
    assert_eq!(filtered.articles_seen, 1);

    let options = PipelineOptions {
        ai_filter: false,
        ..PipelineOptions::default()
    };
    let unfiltered = IngestionPipeline::new(memory_store().await?, fetch(), Summarizer::new(None, 6), options)
        .with_sources(single_source(FEED))
        .run_once()
        .await?;
    assert_eq!(unfiltered.entries_filtered, 0);
    assert_eq!(unfiltered.articles_seen, 2);
    assert_eq!(unfiltered.articles_inserted, 2);
    Ok(())
}

#[tokio::test]
async fn test_tracking_parameters_do_not_defeat_dedup() -> Result<()> {
    init_tracing();
    let store = memory_store().await?;
    let feed = rss(&[
        Item::new("OpenAI ships GPT-5", "https://news.test/a?utm_source=rss", "AI model news."),
        Item::new("OpenAI ships GPT-5 (again)", "https://news.test/a#comments", "AI model news."),
    ]);
    let fetch = CannedFetch::new()
        .with(FEED, feed)
        .with("https://news.test/a?utm_source=rss", page(LLM_PARAGRAPHS))
        .with("https://news.test/a#comments", page(LLM_PARAGRAPHS));

    let report = IngestionPipeline::new(store.clone(), Arc::new(fetch), Summarizer::new(None, 6), PipelineOptions::default())
        .with_sources(single_source(FEED))
        .run_once()
        .await?;

    assert_eq!(report.articles_inserted, 1);
    assert_eq!(report.duplicates_skipped, 1);
    let stored = store.list(&ArticleFilter::default()).await?;
    assert_eq!(stored[0].url, "https://news.test/a");
    Ok(())
}

#[tokio::test]
async fn test_same_title_with_empty_bodies_keeps_both_urls() -> Result<()> {
    init_tracing();
    let store = memory_store().await?;
    let feed = rss(&[
        Item::new("This week in AI", "https://news.test/week-1", ""),
        Item::new("This week in AI", "https://news.test/week-2", ""),
    ]);
    let fetch = Arc::new(CannedFetch::new().with(FEED, feed));

    let pipeline = IngestionPipeline::new(store.clone(), fetch, Summarizer::new(None, 6), PipelineOptions::default())
        .with_sources(single_source(FEED));
    let report = pipeline.run_once().await?;

    assert_eq!(report.articles_seen, 2);
    assert_eq!(report.articles_inserted, 2);
    assert_eq!(report.duplicates_skipped, 0);
    assert_eq!(report.empty_bodies, 2);

    let stored = store.list(&ArticleFilter::default()).await?;
    let mut urls: Vec<&str> = stored.iter().map(|a| a.url.as_str()).collect();
    urls.sort();
    assert_eq!(urls, vec!["https://news.test/week-1", "https://news.test/week-2"]);

    let rerun = pipeline.run_once().await?;
    assert_eq!(rerun.articles_inserted, 0);
    assert_eq!(rerun.duplicates_skipped, 2);
    Ok(())
}
