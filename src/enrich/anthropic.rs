//! Anthropic messages API provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    http_client, truncate_chars, Completion, EnrichError, Enricher, TokenUsage, UsageCounter,
};
use crate::config::LlmConfig;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    http: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    usage: UsageCounter,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

impl AnthropicProvider {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, EnrichError> {
        let base = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        Ok(Self {
            http: http_client(config)?,
            api_key,
            endpoint: format!("{base}/messages"),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_output_tokens,
            usage: UsageCounter::default(),
        })
    }

    fn request<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

/// Text blocks are concatenated; non-text blocks are ignored.
fn parse_response(prompt: &str, body: MessagesResponse) -> Completion {
    let text: String = body.content.into_iter().filter_map(|b| b.text).collect();
    let (input_tokens, output_tokens) = match body.usage {
        Some(u) => (u.input_tokens, u.output_tokens),
        None => (prompt.chars().count() as u64, text.chars().count() as u64),
    };
    Completion {
        text,
        input_tokens,
        output_tokens,
    }
}

#[async_trait]
impl Enricher for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, EnrichError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(EnrichError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EnrichError::Api {
                status: status.as_u16(),
                message: truncate_chars(&message, 200),
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::Malformed(e.to_string()))?;
        let completion = parse_response(prompt, body);
        self.usage.record(&completion);
        info!(
            model = %self.model,
            prompt_tokens = completion.input_tokens,
            completion_tokens = completion.output_tokens,
            "anthropic completion"
        );
        Ok(completion)
    }

    fn usage(&self) -> TokenUsage {
        self.usage.snapshot()
    }
}
