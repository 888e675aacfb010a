// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for DeepSeek's OpenAI-compatible chat completions endpoint.

use std::time::Duration;

use concierge_core::ConciergeError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

/// Timeouts applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

/// HTTP client for DeepSeek API communication.
#[derive(Debug, Clone)]
pub struct DeepSeekClient {
    client: reqwest::Client,
    endpoint: String,
}

impl DeepSeekClient {
    pub fn new(
        api_key: &SecretString,
        base_url: &str,
        timeouts: Timeouts,
    ) -> Result<Self, ConciergeError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| {
                ConciergeError::Config(format!("invalid DeepSeek API key header value: {e}"))
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .build()
            .map_err(|e| ConciergeError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    /// Sends one non-streaming chat completion request.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ConciergeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ConciergeError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "deepseek response received");

        let body = response.text().await.map_err(|e| ConciergeError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "DeepSeek API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
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

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str, read: Duration) -> DeepSeekClient {
        DeepSeekClient::new(
            &SecretString::from("sk-test"),
            base_url,
            Timeouts {
                connect: Duration::from_secs(1),
                read,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sends_bearer_token_to_chat_completions() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "hello"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        let response = client
            .complete(&ChatRequest::user_prompt("deepseek-chat", "hi", 600))
            .await
            .unwrap();
        assert_eq!(response.content(), Some("hello"));
    }

    #[tokio::test]
    async fn api_error_is_described() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Authentication Fails", "type": "authentication_error"}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        let err = client
            .complete(&ChatRequest::user_prompt("deepseek-chat", "hi", 600))
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("authentication_error"), "got: {err}");
    }

    #[tokio::test]
    async fn slow_upstream_hits_read_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"choices": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_millis(300));
        let result = client
            .complete(&ChatRequest::user_prompt("deepseek-chat", "hi", 600))
            .await;
        assert!(result.is_err());
    }
}
