// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the router, providers, dispatcher, and storage.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
}

/// A user query as received from the HTTP surface or the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub text: String,
    pub session_id: Option<String>,
    pub user_id: Option<i64>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// True when the text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// The agent persona a query is routed to.
///
/// The display label is what gets persisted and returned as `agent_used`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Persona {
    #[strum(serialize = "Code Assistant")]
    #[serde(rename = "Code Assistant")]
    CodeAssistant,
    #[strum(serialize = "Research Assistant")]
    #[serde(rename = "Research Assistant")]
    ResearchAssistant,
    #[strum(serialize = "Task Helper")]
    #[serde(rename = "Task Helper")]
    TaskHelper,
    #[strum(serialize = "General Assistant")]
    #[serde(rename = "General Assistant")]
    GeneralAssistant,
}

/// Upstream provider families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini through its native `generateContent` API.
    #[strum(serialize = "gemini")]
    Gemini,
    /// DeepSeek through its OpenAI-compatible REST endpoint.
    #[strum(serialize = "deepseek")]
    DeepSeek,
}

impl ProviderKind {
    /// Vendor label reported by the models status endpoint.
    pub fn vendor(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "google",
            ProviderKind::DeepSeek => "deepseek",
        }
    }
}

/// The closed catalog of models the selector can choose from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ModelId {
    #[strum(serialize = "gemini-1.5-flash")]
    #[serde(rename = "gemini-1.5-flash")]
    GeminiFlash,
    #[strum(serialize = "gemini-1.5-flash-8b")]
    #[serde(rename = "gemini-1.5-flash-8b")]
    GeminiFlash8b,
    #[strum(serialize = "deepseeker-1.0")]
    #[serde(rename = "deepseeker-1.0")]
    DeepSeeker,
}

impl ModelId {
    /// Every catalog entry, in the order the models status endpoint lists them.
    pub const ALL: [ModelId; 3] = [
        ModelId::GeminiFlash,
        ModelId::GeminiFlash8b,
        ModelId::DeepSeeker,
    ];

    /// The provider that serves this model. This is the only dispatch key.
    pub fn provider(self) -> ProviderKind {
        match self {
            ModelId::GeminiFlash | ModelId::GeminiFlash8b => ProviderKind::Gemini,
            ModelId::DeepSeeker => ProviderKind::DeepSeek,
        }
    }

    /// The catalog name, as persisted and returned to clients.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::GeminiFlash => "gemini-1.5-flash",
            ModelId::GeminiFlash8b => "gemini-1.5-flash-8b",
            ModelId::DeepSeeker => "deepseeker-1.0",
        }
    }
}

/// Outcome of a single provider call.
///
/// Providers never return errors to the dispatcher. A missing credential or an
/// upstream failure is reported as `success == false` with `error` set.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub success: bool,
    pub text: String,
    pub elapsed: Duration,
    pub tokens: u32,
    pub error: Option<String>,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

impl Completion {
    /// A successful completion with no usage breakdown.
    pub fn ok(text: impl Into<String>, elapsed: Duration, tokens: u32) -> Self {
        Self {
            success: true,
            text: text.into(),
            elapsed,
            tokens,
            error: None,
            input_tokens: None,
            output_tokens: None,
        }
    }

    /// The provider could not be attempted at all (no credential configured).
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::failed(message, Duration::ZERO)
    }

    /// The provider was attempted and failed after `elapsed`.
    pub fn failed(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            success: false,
            text: String::new(),
            elapsed,
            tokens: 0,
            error: Some(message.into()),
            input_tokens: None,
            output_tokens: None,
        }
    }

    pub fn with_usage(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.input_tokens = Some(input_tokens);
        self.output_tokens = Some(output_tokens);
        self
    }
}

/// Whitespace word count, used wherever the upstream reports no token usage.
pub fn word_count(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

/// Timestamp format shared by every `created_at` / `expires_at` value.
///
/// Fixed width and always UTC, so string comparison orders chronologically.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time in [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A persisted chat interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub session_id: String,
    #[serde(rename = "agent_used")]
    pub persona: Persona,
    pub model: ModelId,
    pub query: String,
    pub response: String,
    pub confidence: f64,
    #[serde(rename = "processing_time")]
    pub processing_time_secs: f64,
    pub token_count: u32,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// UTC, in [`TIMESTAMP_FORMAT`].
    pub created_at: String,
}

/// Restricts history lookups to a session and/or a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub session_id: Option<String>,
    pub user_id: Option<i64>,
}

/// One frame of a streamed chat reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    Start {
        #[serde(rename = "agent")]
        persona: Persona,
        model: ModelId,
    },
    Delta {
        content: String,
    },
    Complete {
        ok: bool,
    },
    Error {
        message: String,
    },
}

impl StreamEvent {
    /// True for the frames after which nothing else is emitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete { .. } | StreamEvent::Error { .. })
    }
}

// --- Account types ---

/// A registered user, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub last_login: Option<String>,
    pub is_active: bool,
}

/// Registration payload after the password has been hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Aggregate totals over a user's interactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_chats: u64,
    pub total_tokens: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub avg_response_time: f64,
    pub avg_confidence: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentUsage {
    pub agent_used: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub model: String,
    pub count: u64,
    pub avg_time: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub count: u64,
    pub tokens: u64,
}

/// Everything the analytics endpoints report for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAnalytics {
    pub stats: UsageStats,
    pub agent_usage: Vec<AgentUsage>,
    pub model_usage: Vec<ModelUsage>,
    pub daily_usage: Vec<DailyUsage>,
}

impl UserAnalytics {
    /// The persona with the highest interaction count, if any.
    pub fn most_used_agent(&self) -> Option<&str> {
        self.agent_usage
            .iter()
            .max_by_key(|a| a.count)
            .map(|a| a.agent_used.as_str())
    }

    /// The model with the highest interaction count, if any.
    pub fn most_used_model(&self) -> Option<&str> {
        self.model_usage
            .iter()
            .max_by_key(|m| m.count)
            .map(|m| m.model.as_str())
    }
}
