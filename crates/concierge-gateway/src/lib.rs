// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Concierge persona router.
//!
//! Exposes the chat pipeline over REST and Server-Sent Events, plus user
//! registration, session tokens and per-user analytics.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod sse;

pub use auth::{Accounts, LoginSession};
pub use error::ApiError;
pub use server::{router, serve, GatewayState};
