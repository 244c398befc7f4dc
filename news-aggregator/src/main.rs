use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Parser;
use interfaces::{ArticleFilter, ArticleStore, SqliteArticleStore};
use news_aggregator::cli::{Cli, Command, ListArgs};
use news_aggregator::{registry, scheduler, IngestionPipeline};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = cli.settings().context("invalid configuration")?;

    if let Command::Sources = cli.command {
        for entry in registry() {
            println!("{:<24} {:<30} {}", entry.source.name(), entry.focus.label(), entry.feed_url);
        }
        return Ok(());
    }

    let store = SqliteArticleStore::connect(&settings.database_url)
        .await
        .with_context(|| format!("failed to open database {}", settings.database_url))?;
    let store = Arc::new(store);

    match &cli.command {
        Command::Run(args) => {
            let pipeline = IngestionPipeline::from_settings(&settings, store.clone())?;
            if args.once {
                let report = pipeline.run_once().await.context("ingestion run failed")?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                scheduler::run_daily(&pipeline, settings.schedule_at).await;
            }
        }
        Command::List(args) => list(store.as_ref(), args).await?,
        Command::Show { id } => match store.get(*id).await? {
            Some(article) => println!("{}", serde_json::to_string_pretty(&article)?),
            None => anyhow::bail!("no article with id {}", id),
        },
        Command::Stats => {
            let stats = store.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Sources => {}
    }

    store.close().await;
    info!("Done");
    Ok(())
}

async fn list(store: &dyn ArticleStore, args: &ListArgs) -> anyhow::Result<()> {
    let mut filter = ArticleFilter::default()
        .since(Utc::now() - Duration::days(i64::from(args.days)))
        .limit(args.limit);
    if let Some(category) = args.category {
        filter = filter.category(category);
    }
    if let Some(source) = args.source {
        filter = filter.source(source);
    }

    let articles = store.list(&filter).await?;
    println!("{}", serde_json::to_string_pretty(&articles)?);
    Ok(())
}
