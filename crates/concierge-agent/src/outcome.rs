// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The user-facing result of a chat request and its persisted form.

use std::time::Duration;

use concierge_core::types::now_timestamp;
use concierge_core::{Completion, Interaction, ModelId, Persona, Query};
use serde::Serialize;

use crate::dispatcher::Dispatch;

/// Confidence reported for a successful completion. Fixed, not model-derived.
pub const CONFIDENCE_OK: f64 = 0.85;

/// Reported when there is no completion to take timing from.
pub const PLACEHOLDER_ELAPSED: Duration = Duration::from_millis(1200);

/// Reported when there is no completion to take a token count from.
pub const PLACEHOLDER_TOKENS: u32 = 150;

/// Shown when a completion carries neither text nor an error.
pub const NO_RESPONSE: &str = "(No response)";

/// No pricing table is applied, so every reply reports zero cost.
pub const COST_ESTIMATE: f64 = 0.0;

/// Session id recorded for queries that did not name one.
pub const ANONYMOUS_SESSION: &str = "anon";

/// What `/chat` returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatOutcome {
    #[serde(rename = "agent_used")]
    pub persona: Persona,
    pub model: ModelId,
    pub response: String,
    pub confidence: f64,
    #[serde(rename = "processing_time")]
    pub processing_time_secs: f64,
    pub token_count: u32,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost_estimate: f64,
    #[serde(skip)]
    pub success: bool,
}

/// Text to show for a completion: its text, else its error, else [`NO_RESPONSE`].
pub fn response_text(completion: &Completion) -> String {
    if !completion.text.is_empty() {
        return completion.text.clone();
    }
    match completion.error.as_deref() {
        Some(error) if !error.is_empty() => error.to_string(),
        _ => NO_RESPONSE.to_string(),
    }
}

impl ChatOutcome {
    pub fn from_dispatch(dispatch: &Dispatch) -> Self {
        let completion = &dispatch.completion;
        Self {
            persona: dispatch.persona,
            model: dispatch.model,
            response: response_text(completion),
            confidence: if completion.success { CONFIDENCE_OK } else { 0.0 },
            processing_time_secs: completion.elapsed.as_secs_f64(),
            token_count: completion.tokens,
            input_tokens: completion.input_tokens.unwrap_or(0),
            output_tokens: completion.output_tokens.unwrap_or(0),
            cost_estimate: COST_ESTIMATE,
            success: completion.success,
        }
    }

    /// An outcome for a relay whose provider task never produced a completion.
    pub fn without_completion(persona: Persona, model: ModelId, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            persona,
            model,
            response: if message.is_empty() {
                NO_RESPONSE.to_string()
            } else {
                message
            },
            confidence: 0.0,
            processing_time_secs: PLACEHOLDER_ELAPSED.as_secs_f64(),
            token_count: PLACEHOLDER_TOKENS,
            input_tokens: 0,
            output_tokens: 0,
            cost_estimate: COST_ESTIMATE,
            success: false,
        }
    }

    /// The row to persist for `query`.
    pub fn to_interaction(&self, query: &Query) -> Interaction {
        Interaction {
            id: None,
            user_id: query.user_id,
            session_id: query
                .session_id
                .clone()
                .unwrap_or_else(|| ANONYMOUS_SESSION.to_string()),
            persona: self.persona,
            model: self.model,
            query: query.text.clone(),
            response: self.response.clone(),
            confidence: self.confidence,
            processing_time_secs: self.processing_time_secs,
            token_count: self.token_count,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            created_at: now_timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch(completion: Completion) -> Dispatch {
        Dispatch {
            persona: Persona::TaskHelper,
            model: ModelId::GeminiFlash8b,
            completion,
        }
    }

    #[test]
    fn success_carries_fixed_confidence() {
        let outcome = ChatOutcome::from_dispatch(&dispatch(
            Completion::ok("1. Preheat", Duration::from_millis(500), 2).with_usage(7, 2),
        ));
        assert_eq!(outcome.response, "1. Preheat");
        assert_eq!(outcome.confidence, CONFIDENCE_OK);
        assert_eq!(outcome.processing_time_secs, 0.5);
        assert_eq!(outcome.token_count, 2);
        assert_eq!((outcome.input_tokens, outcome.output_tokens), (7, 2));
        assert!(outcome.success);
    }

    #[test]
    fn failure_shows_error_with_zero_confidence() {
        let outcome = ChatOutcome::from_dispatch(&dispatch(Completion::unavailable(
            "Gemini API key missing",
        )));
        assert_eq!(outcome.response, "Gemini API key missing");
        assert_eq!(outcome.confidence, 0.0);
        assert_eq!(outcome.processing_time_secs, 0.0);
        assert!(!outcome.success);
    }

    #[test]
    fn nothing_at_all_becomes_no_response() {
        let mut completion = Completion::ok("", Duration::ZERO, 0);
        completion.success = false;
        assert_eq!(response_text(&completion), NO_RESPONSE);
    }

    #[test]
    fn missing_completion_uses_placeholders() {
        let outcome =
            ChatOutcome::without_completion(Persona::GeneralAssistant, ModelId::DeepSeeker, "");
        assert_eq!(outcome.response, NO_RESPONSE);
        assert!((outcome.processing_time_secs - 1.2).abs() < 1e-9);
        assert_eq!(outcome.token_count, 150);
        assert_eq!(outcome.confidence, 0.0);
    }

    #[test]
    fn interaction_defaults_to_anonymous_session() {
        let outcome = ChatOutcome::from_dispatch(&dispatch(Completion::ok(
            "hi",
            Duration::from_millis(10),
            1,
        )));
        let row = outcome.to_interaction(&Query::new("hello"));
        assert_eq!(row.session_id, ANONYMOUS_SESSION);
        assert_eq!(row.user_id, None);
        assert_eq!(row.query, "hello");
        assert_eq!(row.persona, Persona::TaskHelper);

        let row = outcome.to_interaction(&Query::new("hello").with_session("s-1").with_user(7));
        assert_eq!(row.session_id, "s-1");
        assert_eq!(row.user_id, Some(7));
    }

    #[test]
    fn serializes_with_wire_names() {
        let outcome = ChatOutcome::from_dispatch(&dispatch(Completion::ok(
            "hi",
            Duration::from_millis(250),
            1,
        )));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["agent_used"], "Task Helper");
        assert_eq!(json["model"], "gemini-1.5-flash-8b");
        assert_eq!(json["processing_time"], 0.25);
        assert_eq!(json["cost_estimate"], 0.0);
        assert!(json.get("success").is_none());
    }
}
