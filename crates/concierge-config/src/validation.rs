// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks what serde cannot: address syntax, non-zero sizes and timeouts,
//! Argon2 cost bounds, and provider keys that are present but blank.

use crate::diagnostic::ConfigError;
use crate::model::{ConciergeConfig, DEEPSEEK_KEY_ENV, GEMINI_KEY_ENV};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Every failing setting is reported, not just the first.
pub fn validate_config(config: &ConciergeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |key: &str, reason: String| errors.push(ConfigError::invalid_value(key, reason));

    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        fail(
            "log_level",
            format!("is `{}`; use one of {}", config.log_level, LOG_LEVELS.join(", ")),
        );
    }

    let addr = config.server.bind_address.trim();
    if addr.is_empty() {
        fail("server.bind_address", "must not be empty".into());
    } else if addr.parse::<std::net::IpAddr>().is_err()
        && !addr.chars().all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        fail(
            "server.bind_address",
            format!("`{addr}` is not an IP address or hostname"),
        );
    }
    if config.server.port == 0 {
        fail("server.port", "must be non-zero".into());
    }

    for (key, url) in [
        ("gemini.base_url", &config.gemini.base_url),
        ("deepseek.base_url", &config.deepseek.base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            fail(key, format!("`{url}` must start with http:// or https://"));
        }
    }

    for (key, value) in [
        ("gemini.timeout_secs", config.gemini.timeout_secs),
        ("deepseek.connect_timeout_secs", config.deepseek.connect_timeout_secs),
        ("deepseek.read_timeout_secs", config.deepseek.read_timeout_secs),
        ("deepseek.max_tokens", u64::from(config.deepseek.max_tokens)),
        ("routing.long_query_words", config.routing.long_query_words as u64),
        ("stream.chunk_words", config.stream.chunk_words as u64),
        ("auth.iterations", u64::from(config.auth.iterations)),
        ("auth.parallelism", u64::from(config.auth.parallelism)),
    ] {
        if value == 0 {
            fail(key, "must be at least 1".into());
        }
    }

    if config.deepseek.model.trim().is_empty() {
        fail("deepseek.model", "must not be empty".into());
    }
    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path", "must not be empty".into());
    }
    if config.auth.token_bytes < 16 {
        fail(
            "auth.token_bytes",
            format!("must be at least 16, got {}", config.auth.token_bytes),
        );
    }
    if config.auth.memory_cost_kib < 8 * config.auth.parallelism.max(1) {
        fail(
            "auth.memory_cost_kib",
            format!(
                "must be at least 8 * parallelism, got {}",
                config.auth.memory_cost_kib
            ),
        );
    }

    for (section, key, fallback) in [
        ("gemini", &config.gemini.api_key, GEMINI_KEY_ENV),
        ("deepseek", &config.deepseek.api_key, DEEPSEEK_KEY_ENV),
    ] {
        if key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            errors.push(ConfigError::BlankProviderKey {
                section: section.to_string(),
                fallback_env: fallback.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
