// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured completions
//! and records every prompt it receives, so tests can assert both what was
//! sent and how often.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use concierge_core::{
    AdapterType, Completion, ConciergeError, HealthStatus, ModelId, PluginAdapter,
    ProviderAdapter, ProviderKind,
};

/// A mock provider that returns pre-configured completions.
///
/// Completions are popped from a FIFO queue. When the queue is empty a
/// successful "mock response" completion is returned.
pub struct MockProvider {
    kind: ProviderKind,
    configured: bool,
    panics: bool,
    delay: Duration,
    calls: AtomicUsize,
    completions: Mutex<VecDeque<Completion>>,
    prompts: Mutex<Vec<(String, ModelId)>>,
}

impl MockProvider {
    /// A configured mock for `kind` with an empty queue.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            configured: true,
            panics: false,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            completions: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Pre-load successful completions with the given texts.
    pub fn with_responses(kind: ProviderKind, texts: Vec<&str>) -> Self {
        let provider = Self::new(kind);
        let queue = texts
            .into_iter()
            .map(|t| Completion::ok(t, Duration::from_millis(100), word_count(t)))
            .collect();
        Self {
            completions: Mutex::new(queue),
            ..provider
        }
    }

    /// Report the credential as missing from `is_configured`.
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Panic inside `generate`, to exercise task-failure paths.
    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue an arbitrary completion.
    pub async fn push(&self, completion: Completion) {
        self.completions.lock().await.push_back(completion);
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every `(prompt, model)` pair received, oldest first.
    pub async fn prompts(&self) -> Vec<(String, ModelId)> {
        self.prompts.lock().await.clone()
    }
}

fn word_count(text: &str) -> u32 {
    concierge_core::types::word_count(text)
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ConciergeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ConciergeError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(&self, prompt: &str, model: ModelId) -> Completion {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push((prompt.to_string(), model));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.panics {
            panic!("mock provider panicked");
        }

        self.completions
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Completion::ok("mock response", Duration::from_millis(100), 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new(ProviderKind::Gemini);
        let completion = provider.generate("hi", ModelId::GeminiFlash8b).await;
        assert!(completion.success);
        assert_eq!(completion.text, "mock response");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider = MockProvider::with_responses(ProviderKind::DeepSeek, vec!["first", "second"]);
        assert_eq!(provider.generate("a", ModelId::DeepSeeker).await.text, "first");
        assert_eq!(provider.generate("b", ModelId::DeepSeeker).await.text, "second");
        assert_eq!(provider.generate("c", ModelId::DeepSeeker).await.text, "mock response");

        let prompts = provider.prompts().await;
        assert_eq!(prompts.len(), 3);
        assert_eq!(prompts[0], ("a".to_string(), ModelId::DeepSeeker));
    }

    #[tokio::test]
    async fn pushed_failures_are_returned() {
        let provider = MockProvider::new(ProviderKind::Gemini).unconfigured();
        provider.push(Completion::unavailable("key missing")).await;

        let completion = provider.generate("x", ModelId::GeminiFlash).await;
        assert!(!completion.success);
        assert_eq!(completion.error.as_deref(), Some("key missing"));
        assert!(!provider.is_configured());
    }
}
