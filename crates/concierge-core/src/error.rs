// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Concierge gateway.

use thiserror::Error;

/// The primary error type used across adapter traits and core operations.
///
/// Provider failures during a chat request do not surface here: they are
/// folded into a failed [`crate::types::Completion`]. This type covers the
/// cases that genuinely abort an operation.
#[derive(Debug, Error)]
pub enum ConciergeError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The caller supplied a query that cannot be routed (empty or whitespace only).
    #[error("{0}")]
    InvalidQuery(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LLM provider errors (client construction, transport setup).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A uniqueness constraint was violated (duplicate username or email).
    #[error("{0}")]
    Conflict(String),

    /// Missing, invalid, or expired credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConciergeError {
    /// Shorthand for the empty-query rejection shared by the chat and stream paths.
    pub fn empty_query() -> Self {
        Self::InvalidQuery("Query cannot be empty.".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_message_is_user_facing() {
        assert_eq!(
            ConciergeError::empty_query().to_string(),
            "Query cannot be empty."
        );
    }

    #[test]
    fn storage_error_wraps_source() {
        let err = ConciergeError::Storage {
            source: Box::new(std::io::Error::other("disk full")),
        };
        assert_eq!(err.to_string(), "storage error: disk full");
    }
}
