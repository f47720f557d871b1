//! Optional natural-language enrichment.
//!
//! An [`Enricher`] turns a prompt into a short completion. Providers:
//! - `local`: offline echo, for development and CI
//! - `openai`: chat completions API
//! - `anthropic`: messages API
//!
//! Absence of an enricher is represented as `None`; the analysis pipeline
//! never depends on one being present.

mod anthropic;
mod local;
mod openai;

pub use anthropic::AnthropicProvider;
pub use local::LocalEchoProvider;
pub use openai::OpenAiProvider;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::{LlmConfig, LlmProvider};

/// Errors from an enrichment backend.
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Malformed(String),
    #[error("{0} is not set")]
    MissingApiKey(&'static str),
}

impl EnrichError {
    fn from_request(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            EnrichError::Timeout
        } else {
            EnrichError::Network(e)
        }
    }
}

/// One completion and its token accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Running token totals for a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Lock-free accumulator shared by the providers.
#[derive(Debug, Default)]
pub(crate) struct UsageCounter {
    input: AtomicU64,
    output: AtomicU64,
}

impl UsageCounter {
    pub(crate) fn record(&self, completion: &Completion) {
        self.input.fetch_add(completion.input_tokens, Ordering::Relaxed);
        self.output.fetch_add(completion.output_tokens, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> TokenUsage {
        TokenUsage {
            input_tokens: self.input.load(Ordering::Relaxed),
            output_tokens: self.output.load(Ordering::Relaxed),
        }
    }
}

/// A text-completion backend.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Provider name for logs and reports.
    fn name(&self) -> &str;

    /// Complete a single prompt.
    async fn complete(&self, prompt: &str) -> Result<Completion, EnrichError>;

    /// Tokens consumed so far.
    fn usage(&self) -> TokenUsage;
}

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

pub(crate) fn http_client(config: &LlmConfig) -> Result<reqwest::Client, EnrichError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("javalens/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.timeout_secs.max(1)))
        .build()?;
    Ok(client)
}

pub(crate) fn api_key(var: &'static str) -> Result<String, EnrichError> {
    std::env::var(var)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or(EnrichError::MissingApiKey(var))
}

/// Build the configured enricher. `provider: none` yields `Ok(None)`.
pub fn build_enricher(config: &LlmConfig) -> Result<Option<Box<dyn Enricher>>, EnrichError> {
    let enricher: Box<dyn Enricher> = match config.provider {
        LlmProvider::None => return Ok(None),
        LlmProvider::Local => Box::new(LocalEchoProvider::new(config)),
        LlmProvider::OpenAi => Box::new(OpenAiProvider::new(config, api_key("OPENAI_API_KEY")?)?),
        LlmProvider::Anthropic => Box::new(AnthropicProvider::new(
            config,
            api_key("ANTHROPIC_API_KEY")?,
        )?),
    };
    Ok(Some(enricher))
}
