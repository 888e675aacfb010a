// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Concierge integration tests.
//!
//! Provides mock adapters for fast, deterministic tests without upstream
//! APIs or a database.
//!
//! # Components
//!
//! - [`MockProvider`] - Scripted provider that counts its calls
//! - [`MemorySink`] - In-memory interaction sink, optionally failing

pub mod memory_sink;
pub mod mock_provider;

pub use memory_sink::MemorySink;
pub use mock_provider::MockProvider;
