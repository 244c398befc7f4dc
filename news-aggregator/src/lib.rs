pub mod categorizer;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod extractor;
pub mod fetcher;
pub mod llm_adapter;
pub mod parser;
pub mod pipeline;
pub mod scheduler;
pub mod sources;
pub mod summarizer;
pub mod traits;
pub mod types;
pub mod utils;

pub use types::*;
pub use config::{LlmSettings, PipelineOptions, Settings};
pub use extractor::{ContentExtractor, Extraction, ExtractionOrigin};
pub use fetcher::Fetcher;
pub use llm_adapter::{CompletionRequest, LlmAdapter, MockLlmAdapter, OpenAiAdapter};
pub use parser::FeedParser;
pub use pipeline::{IngestionPipeline, RunReport, RunStage, SourceFailure};
pub use sources::{registry, FeedReader, SourceEntry};
pub use summarizer::{Summarizer, Summary, SummaryStrategy};
pub use traits::PageFetch;
