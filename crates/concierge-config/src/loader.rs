// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./concierge.toml` > `~/.config/concierge/concierge.toml`
//! > `/etc/concierge/concierge.toml` with environment variable overrides via the
//! `CONCIERGE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ConciergeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/concierge/concierge.toml` (system-wide)
/// 3. `~/.config/concierge/concierge.toml` (user XDG config)
/// 4. `./concierge.toml` (local directory)
/// 5. `CONCIERGE_*` environment variables
///
/// Provider keys still unset afterwards fall back to `GEMINI_API_KEY` and
/// `DEEPSEEKER_API_KEY`.
pub fn load_config() -> Result<ConciergeConfig, figment::Error> {
    build_figment()
        .extract::<ConciergeConfig>()
        .map(|config| config.with_key_fallbacks(env_lookup))
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ConciergeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConciergeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract::<ConciergeConfig>()
        .map(|config| config.with_key_fallbacks(env_lookup))
}

/// System-wide configuration file.
pub const SYSTEM_FILE: &str = "/etc/concierge/concierge.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_FILE: &str = "concierge.toml";

/// Files of the standard hierarchy, lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("concierge").join(LOCAL_FILE));
    }
    paths.push(PathBuf::from(LOCAL_FILE));
    paths
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    search_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(ConciergeConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

fn env_lookup(name: &str) -> Option<String> {
    let value = std::env::var(name).ok();
    if value.is_some() {
        tracing::debug!(var = name, "using fallback provider key from environment");
    }
    value
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CONCIERGE_DEEPSEEK_API_KEY` must map to `deepseek.api_key`,
/// not `deepseek.api.key`.
fn env_provider() -> Env {
    Env::prefixed("CONCIERGE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let mapped = map_env_key(key.as_str());
        mapped.into()
    })
}

fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 7] = [
        "server", "gemini", "deepseek", "routing", "stream", "storage", "auth",
    ];
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
