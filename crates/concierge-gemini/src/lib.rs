// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for the Concierge gateway.
//!
//! Implements [`ProviderAdapter`] on top of the native `generateContent` API.

pub mod client;
pub mod types;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use concierge_config::model::GeminiConfig;
use concierge_core::error::ConciergeError;
use concierge_core::traits::{PluginAdapter, ProviderAdapter};
use concierge_core::types::{
    word_count, AdapterType, Completion, HealthStatus, ModelId, ProviderKind,
};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::types::GenerateContentRequest;

/// Reported when no Gemini key was configured.
pub const MISSING_KEY: &str = "Gemini API key missing";

/// Substituted when the model answers with no text (e.g. a safety block).
pub const EMPTY_TEXT: &str = "(No text from Gemini)";

/// Gemini provider implementing [`ProviderAdapter`].
///
/// Without a key the provider still exists so the dispatcher can route to it;
/// every call then returns an unavailable completion without touching the network.
pub struct GeminiProvider {
    client: Option<GeminiClient>,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig) -> Result<Self, ConciergeError> {
        let client = match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => {
                let key = SecretString::from(key.to_string());
                let client = GeminiClient::new(
                    &key,
                    config.base_url.clone(),
                    Duration::from_secs(config.timeout_secs),
                )?;
                info!(base_url = %config.base_url, "Gemini provider initialized");
                Some(client)
            }
            None => {
                info!("Gemini provider has no API key; calls will report it missing");
                None
            }
        };
        Ok(Self { client })
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ConciergeError> {
        // No upstream call: health checks should not spend quota.
        if self.client.is_some() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(MISSING_KEY.to_string()))
        }
    }

    async fn shutdown(&self) -> Result<(), ConciergeError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    async fn generate(&self, prompt: &str, model: ModelId) -> Completion {
        let Some(client) = &self.client else {
            return Completion::unavailable(MISSING_KEY);
        };

        let start = Instant::now();
        let request = GenerateContentRequest::user_text(prompt);

        match client.generate_content(model.as_str(), &request).await {
            Ok(response) => {
                let mut text = response.text();
                if text.is_empty() {
                    text = EMPTY_TEXT.to_string();
                }
                // Token count is a whitespace word count of the answer, not upstream usage.
                let tokens = word_count(&text);
                let mut completion = Completion::ok(text, start.elapsed(), tokens);
                if let Some(usage) = response.usage_metadata
                    && let (Some(input), Some(output)) =
                        (usage.prompt_token_count, usage.candidates_token_count)
                {
                    completion = completion.with_usage(input, output);
                }
                debug!(model = model.as_str(), tokens, "gemini completion");
                completion
            }
            Err(e) => {
                let elapsed = start.elapsed();
                warn!(model = model.as_str(), error = %e, "gemini call failed");
                Completion::failed(provider_message(e), elapsed)
            }
        }
    }
}

fn provider_message(err: ConciergeError) -> String {
    match err {
        ConciergeError::Provider { message, .. } => message,
        other => other.to_string(),
    }
}
