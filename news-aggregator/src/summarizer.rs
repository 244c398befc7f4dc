use crate::llm_adapter::{CompletionRequest, LlmAdapter};
use crate::types::{AggregatorError, Result};
use crate::utils::{split_sentences, truncate_chars};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_SENTENCES: usize = 6;
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 8000;

const SYSTEM_PROMPT: &str = "You are an expert tech journalist who synthesizes AI news into clear, \
original summaries. You never copy text directly from articles; you rewrite the information in \
your own words while keeping it accurate.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStrategy {
    Ai,
    Extractive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    pub strategy: SummaryStrategy,
    /// The AI strategy was attempted and failed.
    pub fell_back: bool,
}

pub struct Summarizer {
    adapter: Option<Arc<dyn LlmAdapter>>,
    sentences: usize,
    max_prompt_chars: usize,
}

impl Summarizer {
    /// With no adapter every summary is extractive.
    pub fn new(adapter: Option<Arc<dyn LlmAdapter>>, sentences: usize) -> Self {
        Self {
            adapter,
            sentences,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
        }
    }

    pub fn with_max_prompt_chars(mut self, max_prompt_chars: usize) -> Self {
        self.max_prompt_chars = max_prompt_chars;
        self
    }

    pub fn uses_ai(&self) -> bool {
        self.adapter.is_some()
    }

    pub async fn summarize(&self, title: &str, body: &str) -> Summary {
        if body.trim().is_empty() {
            return Summary {
                text: String::new(),
                strategy: SummaryStrategy::Extractive,
                fell_back: false,
            };
        }

        let Some(adapter) = &self.adapter else {
            return Summary {
                text: self.extractive(body),
                strategy: SummaryStrategy::Extractive,
                fell_back: false,
            };
        };

        match self.ai_summary(adapter.as_ref(), title, body).await {
            Ok(text) => Summary {
                text,
                strategy: SummaryStrategy::Ai,
                fell_back: false,
            },
            Err(e) => {
                warn!("Summarization failed for {:?}: {}; using extractive summary", title, e);
                Summary {
                    text: self.extractive(body),
                    strategy: SummaryStrategy::Extractive,
                    fell_back: true,
                }
            }
        }
    }

    /// First `sentences` sentences of `body`, never more than it has.
    pub fn extractive(&self, body: &str) -> String {
        extractive_summary(body, self.sentences)
    }

    async fn ai_summary(&self, adapter: &dyn LlmAdapter, title: &str, body: &str) -> Result<String> {
        let request = CompletionRequest::new(SYSTEM_PROMPT, self.prompt(title, body));
        debug!("Requesting summary from {}", adapter.adapter_name());

        let reply = adapter.complete(&request).await?;
        let clamped = extractive_summary(reply.trim(), self.sentences);
        if clamped.is_empty() {
            return Err(AggregatorError::Summarization("empty reply".to_string()));
        }
        Ok(clamped)
    }

    fn prompt(&self, title: &str, body: &str) -> String {
        format!(
            "Synthesize and summarize this AI news article in exactly {n} sentences.\n\n\
             Do not copy sentences from the article. Write an original summary that states the \
             main development, names the key players, explains the technical significance, \
             describes the likely impact, gives relevant context and ends with the outlook.\n\n\
             Title: {title}\n\nArticle Content:\n{content}\n\nYour {n}-sentence summary:",
            n = self.sentences,
            title = title,
            content = truncate_chars(body, self.max_prompt_chars),
        )
    }
}

pub fn extractive_summary(body: &str, sentences: usize) -> String {
    split_sentences(body)
        .into_iter()
        .take(sentences)
        .collect::<Vec<_>>()
        .join(" ")
}
