// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Concierge gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Concierge configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConciergeConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini provider settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// DeepSeek provider settings.
    #[serde(default)]
    pub deepseek: DeepSeekConfig,

    /// Model selection heuristics.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Streaming relay pacing.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Password hashing and session token settings.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for ConciergeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            server: ServerConfig::default(),
            gemini: GeminiConfig::default(),
            deepseek: DeepSeekConfig::default(),
            routing: RoutingConfig::default(),
            stream: StreamConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl ConciergeConfig {
    /// Fills provider keys left unset by files and `CONCIERGE_*` variables
    /// from the bare `GEMINI_API_KEY` / `DEEPSEEKER_API_KEY` names.
    pub fn with_key_fallbacks(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.gemini.api_key.is_none() {
            self.gemini.api_key = lookup(GEMINI_KEY_ENV).filter(|k| !k.trim().is_empty());
        }
        if self.deepseek.api_key.is_none() {
            self.deepseek.api_key = lookup(DEEPSEEK_KEY_ENV).filter(|k| !k.trim().is_empty());
        }
        self
    }

    /// Renders the effective configuration as TOML with API keys masked.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let mut shown = self.clone();
        for key in [&mut shown.gemini.api_key, &mut shown.deepseek.api_key] {
            if key.is_some() {
                *key = Some("********".to_string());
            }
        }
        toml::to_string_pretty(&shown)
    }
}

/// Fallback environment variable for the Gemini key.
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

/// Fallback environment variable for the DeepSeek key.
pub const DEEPSEEK_KEY_ENV: &str = "DEEPSEEKER_API_KEY";

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the server to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8020
}

/// Gemini (`generateContent`) provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` leaves the provider unconfigured.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_gemini_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            timeout_secs: default_gemini_timeout_secs(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_timeout_secs() -> u64 {
    30
}

/// DeepSeek chat-completions provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeepSeekConfig {
    /// API key. `None` leaves the provider unconfigured.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL; `/v1/chat/completions` is appended.
    #[serde(default = "default_deepseek_base_url")]
    pub base_url: String,

    /// Upstream model name sent in the request body.
    #[serde(default = "default_deepseek_model")]
    pub model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_deepseek_max_tokens")]
    pub max_tokens: u32,

    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_deepseek_base_url(),
            model: default_deepseek_model(),
            max_tokens: default_deepseek_max_tokens(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

fn default_deepseek_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_deepseek_model() -> String {
    "deepseek-chat".to_string()
}

fn default_deepseek_max_tokens() -> u32 {
    600
}

fn default_connect_timeout_secs() -> u64 {
    3
}

fn default_read_timeout_secs() -> u64 {
    5
}

/// Model selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Queries with at least this many words count as long.
    #[serde(default = "default_long_query_words")]
    pub long_query_words: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            long_query_words: default_long_query_words(),
        }
    }
}

fn default_long_query_words() -> usize {
    20
}

/// Streaming relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// Words per delta event.
    #[serde(default = "default_chunk_words")]
    pub chunk_words: usize,

    /// Pause after each delta event, in milliseconds.
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_words: default_chunk_words(),
            chunk_delay_ms: default_chunk_delay_ms(),
        }
    }
}

fn default_chunk_words() -> usize {
    10
}

fn default_chunk_delay_ms() -> u64 {
    50
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("concierge").join("concierge.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("concierge.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Account authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Random bytes per session token before base64 encoding.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,

    /// Argon2id memory cost in KiB.
    #[serde(default = "default_memory_cost")]
    pub memory_cost_kib: u32,

    /// Argon2id iteration count.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Argon2id parallelism lanes.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_bytes: default_token_bytes(),
            memory_cost_kib: default_memory_cost(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_token_bytes() -> usize {
    32
}

fn default_memory_cost() -> u32 {
    19456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
