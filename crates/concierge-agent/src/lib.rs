// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request orchestration for the Concierge gateway.
//!
//! A query flows through the [`Dispatcher`] (classify, select, build prompt,
//! call the provider). [`StreamRelay`] replays the resulting completion as
//! incremental events, and [`ChatService`] ties both to an interaction sink.

pub mod dispatcher;
pub mod outcome;
pub mod relay;
pub mod service;
pub mod shutdown;

pub use dispatcher::{Dispatch, Dispatcher, RoutePlan};
pub use outcome::ChatOutcome;
pub use relay::StreamRelay;
pub use service::{ChatService, EventStream};
