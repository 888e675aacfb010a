// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use concierge_core::ConciergeError;
use tracing::{debug, info};

pub use concierge_core::types::{now_timestamp, TIMESTAMP_FORMAT};

/// Convert a tokio-rusqlite error into [`ConciergeError::Storage`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ConciergeError {
    ConciergeError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the single SQLite connection.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path`, applies PRAGMAs and
    /// runs pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, ConciergeError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConciergeError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ConciergeError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                // journal_mode returns a row, so it cannot go through execute_batch.
                let mode: String =
                    conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
                debug!(mode = %mode, "journal mode set");
            }
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| crate::migrations::run_migrations(conn))
            .await
            .map_err(|e| ConciergeError::Storage {
                source: Box::new(e),
            })?;

        info!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The shared connection. Query modules call through it.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL. The connection itself closes when dropped.
    pub async fn close(self) -> Result<(), ConciergeError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
