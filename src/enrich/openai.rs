//! OpenAI chat completions provider.
//!
//! POST {base_url}/chat/completions with bearer auth.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    http_client, truncate_chars, Completion, EnrichError, Enricher, TokenUsage, UsageCounter,
};
use crate::config::LlmConfig;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub struct OpenAiProvider {
    http: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    usage: UsageCounter,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, EnrichError> {
        let base = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        Ok(Self {
            http: http_client(config)?,
            api_key,
            endpoint: format!("{base}/chat/completions"),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_output_tokens,
            usage: UsageCounter::default(),
        })
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Token counts fall back to character counts when usage is absent.
fn parse_response(prompt: &str, body: ChatResponse) -> Completion {
    let text = body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();
    let (input_tokens, output_tokens) = match body.usage {
        Some(u) => (u.prompt_tokens, u.completion_tokens),
        None => (prompt.chars().count() as u64, text.chars().count() as u64),
    };
    Completion {
        text,
        input_tokens,
        output_tokens,
    }
}

#[async_trait]
impl Enricher for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, EnrichError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
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

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::Malformed(e.to_string()))?;
        let completion = parse_response(prompt, body);
        self.usage.record(&completion);
        info!(
            model = %self.model,
            prompt_tokens = completion.input_tokens,
            completion_tokens = completion.output_tokens,
            "openai completion"
        );
        Ok(completion)
    }

    fn usage(&self) -> TokenUsage {
        self.usage.snapshot()
    }
}
