// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DeepSeek provider adapter for the Concierge gateway.
//!
//! Plain REST: one JSON POST per call, no streaming, no retries.

pub mod client;
pub mod types;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use concierge_config::model::DeepSeekConfig;
use concierge_core::error::ConciergeError;
use concierge_core::traits::{PluginAdapter, ProviderAdapter};
use concierge_core::types::{
    word_count, AdapterType, Completion, HealthStatus, ModelId, ProviderKind,
};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::client::{DeepSeekClient, Timeouts};
use crate::types::ChatRequest;

/// Reported when no DeepSeek key was configured.
pub const MISSING_KEY: &str = "DeepSeeker API key missing";

/// Substituted when the first choice carries no content.
pub const EMPTY_TEXT: &str = "(No text from DeepSeeker)";

/// DeepSeek provider implementing [`ProviderAdapter`].
pub struct DeepSeekProvider {
    client: Option<DeepSeekClient>,
    upstream_model: String,
    max_tokens: u32,
}

impl DeepSeekProvider {
    pub fn new(config: &DeepSeekConfig) -> Result<Self, ConciergeError> {
        let client = match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => {
                let key = SecretString::from(key.to_string());
                let timeouts = Timeouts {
                    connect: Duration::from_secs(config.connect_timeout_secs),
                    read: Duration::from_secs(config.read_timeout_secs),
                };
                let client = DeepSeekClient::new(&key, &config.base_url, timeouts)?;
                info!(
                    base_url = %config.base_url,
                    model = %config.model,
                    "DeepSeek provider initialized"
                );
                Some(client)
            }
            None => {
                info!("DeepSeek provider has no API key; calls will report it missing");
                None
            }
        };

        Ok(Self {
            client,
            upstream_model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl PluginAdapter for DeepSeekProvider {
    fn name(&self) -> &str {
        "deepseek"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ConciergeError> {
        if self.client.is_some() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(MISSING_KEY.to_string()))
        }
    }

    async fn shutdown(&self) -> Result<(), ConciergeError> {
        debug!("DeepSeek provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for DeepSeekProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::DeepSeek
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// The catalog entry is informational here; the upstream model name comes
    /// from configuration.
    async fn generate(&self, prompt: &str, model: ModelId) -> Completion {
        let Some(client) = &self.client else {
            return Completion::unavailable(MISSING_KEY);
        };

        let start = Instant::now();
        let request = ChatRequest::user_prompt(&self.upstream_model, prompt, self.max_tokens);

        match client.complete(&request).await {
            Ok(response) => {
                let text = response.content().unwrap_or(EMPTY_TEXT).to_string();
                let usage = response.usage.unwrap_or_default();
                let input = usage.prompt_tokens.unwrap_or_else(|| word_count(prompt));
                let output = usage.completion_tokens.unwrap_or_else(|| word_count(&text));
                let total = usage
                    .total_tokens
                    .unwrap_or_else(|| input.saturating_add(output));

                debug!(model = model.as_str(), total, "deepseek completion");
                Completion::ok(text, start.elapsed(), total).with_usage(input, output)
            }
            Err(e) => {
                let elapsed = start.elapsed();
                warn!(model = model.as_str(), error = %e, "deepseek call failed");
                let message = match e {
                    ConciergeError::Provider { message, .. } => message,
                    other => other.to_string(),
                };
                Completion::failed(message, elapsed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> DeepSeekProvider {
        DeepSeekProvider::new(&DeepSeekConfig {
            api_key: Some("sk-test".into()),
            base_url: server.uri(),
            ..DeepSeekConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn missing_key_short_circuits() {
        let provider = DeepSeekProvider::new(&DeepSeekConfig::default()).unwrap();
        let completion = provider.generate("hi", ModelId::DeepSeeker).await;

        assert!(!completion.success);
        assert_eq!(completion.error.as_deref(), Some(MISSING_KEY));
        assert_eq!(completion.elapsed, Duration::ZERO);
        assert_eq!(completion.tokens, 0);
    }

    #[tokio::test]
    async fn sends_configured_model_and_limits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "deepseek-chat",
                "max_tokens": 600,
                "stream": false,
                "messages": [{"role": "user", "content": "the prompt"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "answer"}}],
                "usage": {"prompt_tokens": 11, "completion_tokens": 1, "total_tokens": 12}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let completion = provider_for(&server)
            .generate("the prompt", ModelId::DeepSeeker)
            .await;

        assert!(completion.success);
        assert_eq!(completion.text, "answer");
        assert_eq!(completion.tokens, 12);
        assert_eq!(completion.input_tokens, Some(11));
        assert_eq!(completion.output_tokens, Some(1));
    }

    #[tokio::test]
    async fn usage_falls_back_to_word_counts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "three word reply"}}]
            })))
            .mount(&server)
            .await;

        let completion = provider_for(&server)
            .generate("a five word prompt here", ModelId::DeepSeeker)
            .await;

        assert_eq!(completion.input_tokens, Some(5));
        assert_eq!(completion.output_tokens, Some(3));
        assert_eq!(completion.tokens, 8);
    }

    #[tokio::test]
    async fn partial_usage_sums_what_is_known() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "two words"}}],
                "usage": {"prompt_tokens": 40}
            })))
            .mount(&server)
            .await;

        let completion = provider_for(&server)
            .generate("prompt", ModelId::DeepSeeker)
            .await;

        assert_eq!(completion.input_tokens, Some(40));
        assert_eq!(completion.output_tokens, Some(2));
        assert_eq!(completion.tokens, 42);
    }

    #[tokio::test]
    async fn empty_content_gets_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": ""}}]
            })))
            .mount(&server)
            .await;

        let completion = provider_for(&server)
            .generate("prompt", ModelId::DeepSeeker)
            .await;

        assert!(completion.success);
        assert_eq!(completion.text, EMPTY_TEXT);
    }

    #[tokio::test]
    async fn non_success_status_becomes_failed_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let completion = provider_for(&server)
            .generate("prompt", ModelId::DeepSeeker)
            .await;

        assert!(!completion.success);
        assert!(completion.text.is_empty());
        assert_eq!(completion.tokens, 0);
        assert!(completion.error.unwrap().contains("503"));
    }
}
