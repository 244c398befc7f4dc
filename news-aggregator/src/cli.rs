//! Command-line interface definitions.
//!
//! Every global option can also come from the environment (or a `.env` file
//! loaded before parsing).

use crate::config::{LlmSettings, PipelineOptions, Settings, DEFAULT_DATABASE_URL};
use crate::types::{AggregatorError, Category, FetchConfig, Result};
use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand};
use interfaces::Source;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "news-aggregator", author, version, about = "Fetches, classifies and summarizes AI news")]
pub struct Cli {
    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL, global = true)]
    pub database_url: String,

    /// API key for AI summaries; extractive summaries are used when unset
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL", global = true)]
    pub openai_model: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", global = true)]
    pub openai_base_url: Option<String>,

    /// HTTP timeout in seconds for feeds, pages and the completion API
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// Keep entries even when they do not mention AI
    #[arg(long, global = true)]
    pub no_ai_filter: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest now (--once) or every day at the configured time
    Run(RunArgs),
    /// List stored articles as JSON
    List(ListArgs),
    /// Show one stored article as JSON
    Show {
        id: Uuid,
    },
    /// Article counts per category and source
    Stats,
    /// Print the configured news sources
    Sources,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run a single ingestion pass and exit
    #[arg(long)]
    pub once: bool,

    #[arg(long, env = "DAILY_UPDATE_HOUR", default_value_t = 6)]
    pub hour: u32,

    #[arg(long, env = "DAILY_UPDATE_MINUTE", default_value_t = 0)]
    pub minute: u32,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Category label or slug (llms, research, industry, ethics, startups, uncategorized)
    #[arg(long)]
    pub category: Option<Category>,

    /// Source display name, e.g. "TechCrunch AI"
    #[arg(long)]
    pub source: Option<Source>,

    /// Only articles fetched in the last N days
    #[arg(long, default_value_t = 7)]
    pub days: u32,

    #[arg(long, default_value_t = 50)]
    pub limit: u32,
}

impl Cli {
    pub fn settings(&self) -> Result<Settings> {
        let (hour, minute) = match &self.command {
            Command::Run(args) => (args.hour, args.minute),
            _ => (6, 0),
        };
        let schedule_at = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            AggregatorError::Config(format!("invalid daily run time {:02}:{:02}", hour, minute))
        })?;

        let settings = Settings {
            database_url: self.database_url.clone(),
            llm: LlmSettings::from_parts(
                self.openai_api_key.clone(),
                self.openai_model.clone(),
                self.openai_base_url.clone(),
            ),
            fetch: FetchConfig {
                timeout_seconds: self.timeout_secs,
                ..FetchConfig::default()
            },
            pipeline: PipelineOptions {
                ai_filter: !self.no_ai_filter,
                ..PipelineOptions::default()
            },
            schedule_at,
        };

        settings.validate()?;
        Ok(settings)
    }
}
