//! Deterministic keyword classification into the fixed category set.

use crate::types::Category;
use crate::utils::{count_phrase, tokens};

const LLM_KEYWORDS: &[&str] = &[
    "chatgpt", "gpt-4", "gpt-5", "claude", "gemini", "llama", "mistral",
    "llm", "large language model", "language model", "chat bot", "chatbot",
    "openai", "anthropic", "text generation", "prompt", "conversation ai",
];

const RESEARCH_KEYWORDS: &[&str] = &[
    "research", "paper", "study", "breakthrough", "discovery",
    "benchmark", "dataset", "training", "model architecture",
    "neural network", "deep learning", "algorithm", "innovation",
    "academic", "researcher", "scientist", "laboratory",
];

const INDUSTRY_KEYWORDS: &[&str] = &[
    "healthcare", "medical", "finance", "banking", "automotive",
    "manufacturing", "retail", "enterprise", "business application",
    "robotics", "automation", "supply chain", "logistics",
    "industry", "sector", "deployment", "implementation",
];

const ETHICS_KEYWORDS: &[&str] = &[
    "ethics", "regulation", "policy", "law", "governance",
    "bias", "fairness", "safety", "risk", "privacy",
    "responsible ai", "ai act", "legislation", "compliance",
    "transparency", "accountability", "eu ai", "congress",
];

const STARTUP_KEYWORDS: &[&str] = &[
    "startup", "funding", "investment", "acquisition", "merger",
    "valuation", "series", "venture", "ipo", "launch",
    "company", "ceo", "founder", "billion", "million",
    "market", "revenue", "growth", "business",
];

/// Terms that mark a feed entry as being about AI at all.
pub const AI_KEYWORDS: &[&str] = &[
    "ai", "artificial intelligence", "machine learning", "deep learning",
    "neural network", "gpt", "chatgpt", "llm", "large language model",
    "openai", "anthropic", "claude", "gemini", "transformer",
    "natural language processing", "nlp", "computer vision",
    "generative ai", "gen ai", "dall-e", "midjourney", "stable diffusion",
    "reinforcement learning", "robotics", "automation", "algorithm",
    "data science", "model training", "inference", "embedding",
    "ai safety", "ai ethics", "ai regulation", "agi",
];

pub fn keywords(category: Category) -> &'static [&'static str] {
    match category {
        Category::LargeLanguageModels => LLM_KEYWORDS,
        Category::ResearchBreakthroughs => RESEARCH_KEYWORDS,
        Category::Industry => INDUSTRY_KEYWORDS,
        Category::EthicsRegulation => ETHICS_KEYWORDS,
        Category::StartupsBusiness => STARTUP_KEYWORDS,
        Category::Uncategorized => &[],
    }
}

fn score(text_tokens: &[String], keywords: &[&str]) -> usize {
    keywords
        .iter()
        .map(|kw| count_phrase(text_tokens, &tokens(kw)))
        .sum()
}

/// Per-category keyword scores, in priority order.
pub fn scores(title: &str, body: &str) -> Vec<(Category, usize)> {
    let text_tokens = tokens(&format!("{} {}", title, body));
    Category::ALL
        .iter()
        .map(|c| (*c, score(&text_tokens, keywords(*c))))
        .collect()
}

/// Pick exactly one category. Ties go to the earlier category in
/// `Category::ALL`; no keyword hits at all gives `Uncategorized`.
/// A record with no body text is never classified from its title alone.
pub fn categorize(title: &str, body: &str) -> Category {
    if body.trim().is_empty() {
        return Category::Uncategorized;
    }
    let mut best = Category::Uncategorized;
    let mut best_score = 0;
    for (category, score) in scores(title, body) {
        if score > best_score {
            best = category;
            best_score = score;
        }
    }
    best
}

pub fn is_ai_relevant(title: &str, text: &str) -> bool {
    let text_tokens = tokens(&format!("{} {}", title, text));
    AI_KEYWORDS
        .iter()
        .any(|kw| count_phrase(&text_tokens, &tokens(kw)) > 0)
}
