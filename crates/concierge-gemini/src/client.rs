// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.

use std::time::Duration;

use concierge_core::ConciergeError;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// HTTP client for Gemini API communication.
///
/// The API key travels in the `x-goog-api-key` header, marked sensitive so it
/// never shows up in debug output. There is no retry logic.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: &SecretString,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConciergeError> {
        let mut key = HeaderValue::from_str(api_key.expose_secret()).map_err(|e| {
            ConciergeError::Config(format!("invalid Gemini API key header value: {e}"))
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", key);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ConciergeError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// Sends one `generateContent` request and returns the parsed response.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ConciergeError> {
        let response = self
            .client
            .post(self.endpoint(model))
            .json(request)
            .send()
            .await
            .map_err(|e| ConciergeError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model, "gemini response received");

        let body = response.text().await.map_err(|e| ConciergeError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Gemini API error ({}): {}",
                    api_err.error.status.as_deref().unwrap_or("UNKNOWN"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(ConciergeError::Provider {
                message,
                source: None,
            });
        }

        serde_json::from_str(&body).map_err(|e| ConciergeError::Provider {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
