// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics rendered through miette.
//!
//! Parse failures point into the TOML file that caused them whenever the key
//! can be found there. Unknown keys get a hint: the section the key actually
//! belongs to, a close spelling, or the list of keys the section accepts.
//! Semantic failures name the offending setting together with the
//! `CONCIERGE_*` variable that overrides it.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::fmt;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a spelling suggestion.
const SIMILARITY_THRESHOLD: f64 = 0.75;

/// Every key the configuration accepts, by section. `""` is the top level.
pub const SECTION_KEYS: &[(&str, &[&str])] = &[
    (
        "",
        &[
            "log_level", "server", "gemini", "deepseek", "routing", "stream", "storage", "auth",
        ],
    ),
    ("server", &["bind_address", "port"]),
    ("gemini", &["api_key", "base_url", "timeout_secs"]),
    (
        "deepseek",
        &[
            "api_key",
            "base_url",
            "model",
            "max_tokens",
            "connect_timeout_secs",
            "read_timeout_secs",
        ],
    ),
    ("routing", &["long_query_words"]),
    ("stream", &["chunk_words", "chunk_delay_ms"]),
    ("storage", &["database_path", "wal_mode"]),
    ("auth", &["token_bytes", "memory_cost_kib", "iterations", "parallelism"]),
];

/// What to tell the user about a key the configuration does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyHint {
    /// The key is valid, just not in this section.
    WrongSection(Vec<&'static str>),
    /// A close spelling exists in this section.
    Typo(String),
    /// Nothing close; list what the section accepts.
    Accepted(Vec<String>),
}

impl fmt::Display for KeyHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyHint::WrongSection(owners) => {
                let headers: Vec<String> = owners.iter().map(|s| format!("[{s}]")).collect();
                write!(f, "this key belongs under {}", headers.join(" or "))
            }
            KeyHint::Typo(key) => write!(f, "did you mean `{key}`?"),
            KeyHint::Accepted(keys) => write!(f, "accepted keys: {}", keys.join(", ")),
        }
    }
}

/// A configuration error with diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {section}")]
    #[diagnostic(code(concierge::config::unknown_key), help("{hint}"))]
    UnknownKey {
        key: String,
        /// `[name]` of the enclosing table, or "top level".
        section: String,
        hint: KeyHint,
        #[label("not a Concierge setting here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(concierge::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A provider key that is present but empty or whitespace.
    #[error("[{section}] api_key is blank")]
    #[diagnostic(
        code(concierge::config::blank_api_key),
        help("set a real key, or remove the line so {fallback_env} is consulted instead")
    )]
    BlankProviderKey {
        section: String,
        fallback_env: String,
    },

    /// A parsed value outside its allowed range or format.
    #[error("`{key}` {reason}")]
    #[diagnostic(
        code(concierge::config::invalid_value),
        help("fix `{key}` in concierge.toml or override it with {env_var}")
    )]
    InvalidValue {
        key: String,
        reason: String,
        env_var: String,
    },

    #[error("configuration error: {0}")]
    #[diagnostic(code(concierge::config::other))]
    Other(String),
}

impl ConfigError {
    /// An [`ConfigError::InvalidValue`] for a dotted key such as `stream.chunk_words`.
    pub fn invalid_value(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
            env_var: env_var_for(key),
        }
    }

    /// The dotted key this error is about, when it concerns a single setting.
    pub fn key(&self) -> Option<String> {
        match self {
            ConfigError::UnknownKey { key, section, .. } => Some(match section.as_str() {
                "top level" => key.clone(),
                s => format!("{}.{key}", s.trim_matches(['[', ']'])),
            }),
            ConfigError::InvalidType { key, .. } | ConfigError::InvalidValue { key, .. } => {
                Some(key.clone())
            }
            ConfigError::BlankProviderKey { section, .. } => Some(format!("{section}.api_key")),
            ConfigError::Other(_) => None,
        }
    }
}

/// The environment variable that overrides a dotted key.
pub fn env_var_for(key: &str) -> String {
    format!("CONCIERGE_{}", key.replace('.', "_").to_uppercase())
}

fn section_label(section: &[String]) -> String {
    if section.is_empty() {
        "top level".to_string()
    } else {
        format!("[{}]", section.join("."))
    }
}

/// Decide how to help with `key`, found in `section` where `accepted` are valid.
pub fn hint_for(section: &str, key: &str, accepted: &[&str]) -> KeyHint {
    let owners: Vec<&'static str> = SECTION_KEYS
        .iter()
        .filter(|(name, keys)| !name.is_empty() && *name != section && keys.contains(&key))
        .map(|(name, _)| *name)
        .collect();
    if !owners.is_empty() {
        return KeyHint::WrongSection(owners);
    }

    let closest = accepted
        .iter()
        .map(|candidate| (strsim::jaro_winkler(key, candidate), *candidate))
        .filter(|(score, _)| *score > SIMILARITY_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0));
    match closest {
        Some((_, candidate)) => KeyHint::Typo(candidate.to_string()),
        None => KeyHint::Accepted(accepted.iter().map(|k| k.to_string()).collect()),
    }
}

/// Convert a `figment::Error` (which may carry several) into diagnostics.
///
/// `toml_sources` pairs each file path figment may report with its content.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, accepted) => {
                    let (span, src) = locate(&error, &path, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        section: section_label(&path),
                        hint: hint_for(&path.join("."), field, accepted),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(found, expected) => {
                    let (span, src) = match path.split_last() {
                        Some((field, section)) => locate(&error, section, field, toml_sources),
                        None => (None, None),
                    };
                    ConfigError::InvalidType {
                        key: path.join("."),
                        found: found.to_string(),
                        expected: expected.clone(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn locate(
    error: &figment::error::Error,
    section: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let reported = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    // Inline strings carry no file; there is at most one inline source.
    let found = match reported {
        Some(path) => toml_sources.iter().find(|(p, _)| *p == path),
        None => toml_sources.iter().find(|(p, _)| p == INLINE_SOURCE),
    };

    let Some((name, content)) = found else {
        return (None, None);
    };
    match locate_key(content, section, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(name, content.clone())),
        ),
        None => (None, None),
    }
}

/// Source name used for configuration passed as a string.
pub const INLINE_SOURCE: &str = "<inline>";

/// Byte offset of `key` inside `[section]` of a TOML document.
///
/// Matches both `key = ...` assignments inside the table and a `[section.key]`
/// header (an unknown table is reported as an unknown key of its parent).
pub fn locate_key(content: &str, section: &[String], key: &str) -> Option<usize> {
    let wanted = section.join(".");
    let as_header = if wanted.is_empty() {
        key.to_string()
    } else {
        format!("{wanted}.{key}")
    };

    let mut current = String::new();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header.split(']').next().unwrap_or_default().trim();
            if name == as_header {
                return Some(offset + indent + header.len() - header.trim_start().len() + 1);
            }
            current = name.to_string();
        } else if current == wanted
            && trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        {
            return Some(offset + indent);
        }

        offset += line.len();
    }
    None
}

/// Render diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
