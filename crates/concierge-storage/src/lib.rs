// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Concierge gateway.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer connection via `tokio-rusqlite`. Interactions, user
//! accounts, login tokens and per-user analytics all live here.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::{SqliteStorage, DUPLICATE_USER};
pub use database::{now_timestamp, Database, TIMESTAMP_FORMAT};
