//! Offline echo provider.
//!
//! Returns a prefix of the prompt, so runs are deterministic and free.
//! Token counts are character counts.

use async_trait::async_trait;
use tracing::debug;

use super::{truncate_chars, Completion, EnrichError, Enricher, TokenUsage, UsageCounter};
use crate::config::LlmConfig;

pub struct LocalEchoProvider {
    max_chars: usize,
    usage: UsageCounter,
}

impl LocalEchoProvider {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            max_chars: (config.max_output_tokens / 2) as usize,
            usage: UsageCounter::default(),
        }
    }
}

#[async_trait]
impl Enricher for LocalEchoProvider {
    fn name(&self) -> &str {
        "local"
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, EnrichError> {
        let text = truncate_chars(prompt, self.max_chars);
        let completion = Completion {
            input_tokens: prompt.chars().count() as u64,
            output_tokens: text.chars().count() as u64,
            text,
        };
        self.usage.record(&completion);
        debug!(
            input_chars = completion.input_tokens,
            output_chars = completion.output_tokens,
            "local completion"
        );
        Ok(completion)
    }

    fn usage(&self) -> TokenUsage {
        self.usage.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_is_truncated_to_half_output_budget() {
        let config = LlmConfig {
            max_output_tokens: 10,
            ..LlmConfig::default()
        };
        let provider = LocalEchoProvider::new(&config);
        let runtime = tokio::runtime::Runtime::new().unwrap();

        let completion = runtime
            .block_on(provider.complete("abcdefghijklmnop"))
            .unwrap();
        assert_eq!(completion.text, "abcde");
        assert_eq!(completion.input_tokens, 16);
        assert_eq!(completion.output_tokens, 5);

        let usage = provider.usage();
        assert_eq!(usage.input_tokens, 16);
        assert_eq!(usage.output_tokens, 5);
    }
}
