// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query routing for the Concierge gateway.
//!
//! This crate provides:
//! - [`PersonaClassifier`]: keyword-based persona classification
//! - [`ProviderSelector`]: model selection from query length and configured credentials
//! - [`PromptBuilder`]: persona-specific prompt headers
//!
//! All three are pure and synchronous; the dispatcher runs them before any
//! provider is contacted.

pub mod classifier;
pub mod prompt;
pub mod selector;

pub use classifier::PersonaClassifier;
pub use prompt::PromptBuilder;
pub use selector::{CredentialSet, ProviderSelector, LONG_QUERY_WORDS};
