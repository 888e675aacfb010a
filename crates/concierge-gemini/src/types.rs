// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini `generateContent` request and response types.

use serde::{Deserialize, Serialize};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// A single user turn containing `text`.
    pub fn user_text(text: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(text.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A content part. Only text parts are produced or consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, empty if there are none.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(default)]
    pub candidates_token_count: Option<u32>,
    #[serde(default)]
    pub total_token_count: Option<u32>,
}

/// Error envelope returned on non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<u16>,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_user_turn() {
        let json = serde_json::to_value(GenerateContentRequest::user_text("hi")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "world"}]}},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5}
        }))
        .unwrap();

        assert_eq!(response.text(), "Hello, world");
        let usage = response.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, Some(3));
        assert_eq!(usage.total_token_count, Some(5));
    }

    #[test]
    fn blocked_response_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert_eq!(response.text(), "");
        assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn error_envelope_parses() {
        let err: ApiErrorResponse = serde_json::from_value(serde_json::json!({
            "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
        }))
        .unwrap();
        assert_eq!(err.error.code, Some(400));
        assert_eq!(err.error.status.as_deref(), Some("INVALID_ARGUMENT"));
    }
}
