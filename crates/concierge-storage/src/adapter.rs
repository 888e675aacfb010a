// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use concierge_config::model::StorageConfig;
use concierge_core::types::{HistoryFilter, Interaction, NewUser, User, UserAnalytics};
use concierge_core::{
    AccountStore, AdapterType, ConciergeError, HealthStatus, InteractionSink, PluginAdapter,
    StorageAdapter,
};

use crate::database::Database;
use crate::queries;

/// Message returned for a duplicate username or email.
pub const DUPLICATE_USER: &str = "Username or email already exists";

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage. Nothing is opened until [`initialize`](StorageAdapter::initialize).
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, ConciergeError> {
        self.db.get().ok_or_else(|| ConciergeError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self) -> Result<(), ConciergeError> {
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(crate::database::map_tr_err)?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ConciergeError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ConciergeError> {
        self.checkpoint().await
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ConciergeError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ConciergeError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ConciergeError> {
        self.db()?;
        self.checkpoint().await
    }
}

#[async_trait]
impl InteractionSink for SqliteStorage {
    async fn record(&self, interaction: &Interaction) -> Result<i64, ConciergeError> {
        queries::interactions::insert_interaction(self.db()?, interaction).await
    }

    async fn recent(
        &self,
        limit: u32,
        filter: &HistoryFilter,
    ) -> Result<Vec<Interaction>, ConciergeError> {
        queries::interactions::recent_interactions(self.db()?, limit, filter).await
    }
}

#[async_trait]
impl AccountStore for SqliteStorage {
    async fn create_user(&self, user: NewUser) -> Result<i64, ConciergeError> {
        queries::users::insert_user(self.db()?, user)
            .await?
            .ok_or_else(|| ConciergeError::Conflict(DUPLICATE_USER.into()))
    }

    async fn find_user(&self, username: &str) -> Result<Option<(User, String)>, ConciergeError> {
        queries::users::find_active_by_username(self.db()?, username).await
    }

    async fn touch_login(&self, user_id: i64) -> Result<(), ConciergeError> {
        queries::users::touch_last_login(self.db()?, user_id).await
    }

    async fn create_login_session(
        &self,
        user_id: i64,
        token: &str,
        expires_at: &str,
    ) -> Result<(), ConciergeError> {
        queries::users::insert_session_token(self.db()?, user_id, token, expires_at).await
    }

    async fn user_for_token(&self, token: &str, now: &str) -> Result<Option<User>, ConciergeError> {
        queries::users::user_for_token(self.db()?, token, now).await
    }

    async fn analytics(&self, user_id: i64) -> Result<UserAnalytics, ConciergeError> {
        queries::analytics::user_analytics(self.db()?, user_id).await
    }
}
