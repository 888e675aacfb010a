// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Concierge gateway.
//!
//! This crate provides the error type, the domain types that flow between
//! the router, the providers and storage, and the adapter traits every
//! provider and storage backend implements.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ConciergeError;
pub use types::{
    AdapterType, Completion, HealthStatus, HistoryFilter, Interaction, ModelId, Persona,
    ProviderKind, Query, StreamEvent,
};

pub use traits::{AccountStore, InteractionSink, PluginAdapter, ProviderAdapter, StorageAdapter};
