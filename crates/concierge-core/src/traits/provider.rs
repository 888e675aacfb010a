// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for upstream LLM integrations.

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;
use crate::types::{Completion, ModelId, ProviderKind};

/// Adapter for an upstream language-model provider.
///
/// `generate` is infallible by contract: a missing credential, a transport
/// error, a non-success status or an unparseable body all come back as a
/// failed [`Completion`] carrying the message and the elapsed wall time.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// The provider family this adapter serves.
    fn kind(&self) -> ProviderKind;

    /// Whether a credential was configured at startup.
    fn is_configured(&self) -> bool;

    /// Sends `prompt` to `model` and reports the outcome.
    async fn generate(&self, prompt: &str, model: ModelId) -> Completion;
}
