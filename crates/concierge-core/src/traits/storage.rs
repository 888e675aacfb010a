// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits: backend lifecycle, interaction persistence, and accounts.

use async_trait::async_trait;

use crate::error::ConciergeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{HistoryFilter, Interaction, NewUser, User, UserAnalytics};

/// Adapter for storage and persistence backends.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), ConciergeError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ConciergeError>;
}

/// Destination for completed chat interactions.
#[async_trait]
pub trait InteractionSink: Send + Sync {
    /// Persists one interaction and returns its row id.
    async fn record(&self, interaction: &Interaction) -> Result<i64, ConciergeError>;

    /// Most recent interactions first, at most `limit` of them.
    async fn recent(
        &self,
        limit: u32,
        filter: &HistoryFilter,
    ) -> Result<Vec<Interaction>, ConciergeError>;
}

/// User accounts, login sessions, and per-user analytics.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts a user. Duplicate username or email yields [`ConciergeError::Conflict`].
    async fn create_user(&self, user: NewUser) -> Result<i64, ConciergeError>;

    /// Looks up an active user by username, returning the stored password hash alongside.
    async fn find_user(&self, username: &str) -> Result<Option<(User, String)>, ConciergeError>;

    /// Stamps `last_login` with the current time.
    async fn touch_login(&self, user_id: i64) -> Result<(), ConciergeError>;

    /// Stores a session token valid until `expires_at` (RFC 3339).
    async fn create_login_session(
        &self,
        user_id: i64,
        token: &str,
        expires_at: &str,
    ) -> Result<(), ConciergeError>;

    /// Resolves a token to its active user if it has not expired at `now` (RFC 3339).
    async fn user_for_token(&self, token: &str, now: &str) -> Result<Option<User>, ConciergeError>;

    /// Aggregates the user's interaction history.
    async fn analytics(&self, user_id: i64) -> Result<UserAnalytics, ConciergeError>;
}
