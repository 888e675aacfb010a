// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider selection from query length and configured credentials.

use concierge_core::ModelId;
use tracing::debug;

/// Queries with at least this many whitespace-separated words count as long.
pub const LONG_QUERY_WORDS: usize = 20;

/// Which provider credentials were present at startup.
///
/// Built once from configuration and injected; never re-read per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialSet {
    pub gemini: bool,
    pub deepseek: bool,
}

impl CredentialSet {
    pub fn new(gemini: bool, deepseek: bool) -> Self {
        Self { gemini, deepseek }
    }

    /// True when at least one provider can be reached.
    pub fn any(&self) -> bool {
        self.gemini || self.deepseek
    }
}

/// Picks a catalog model for a query.
///
/// Short queries prefer the small Gemini model, long ones prefer DeepSeek.
/// Each preference falls back to the other provider when its credential is
/// missing. The fallback is unconditional, so a model is always returned even
/// with no credentials; the provider then reports the missing key.
#[derive(Debug, Clone)]
pub struct ProviderSelector {
    credentials: CredentialSet,
    long_query_words: usize,
}

impl ProviderSelector {
    pub fn new(credentials: CredentialSet) -> Self {
        Self {
            credentials,
            long_query_words: LONG_QUERY_WORDS,
        }
    }

    /// Overrides the long-query threshold.
    pub fn with_long_query_words(mut self, words: usize) -> Self {
        self.long_query_words = words;
        self
    }

    pub fn credentials(&self) -> CredentialSet {
        self.credentials
    }

    pub fn select(&self, text: &str) -> ModelId {
        let words = text.split_whitespace().count();
        let long = words >= self.long_query_words;

        let model = match (long, self.credentials) {
            (false, CredentialSet { gemini: true, .. }) => ModelId::GeminiFlash8b,
            (false, _) => ModelId::DeepSeeker,
            (true, CredentialSet { deepseek: true, .. }) => ModelId::DeepSeeker,
            (true, _) => ModelId::GeminiFlash,
        };

        debug!(words, long, model = model.as_str(), "selected model");
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn short_query_prefers_small_gemini() {
        let selector = ProviderSelector::new(CredentialSet::new(true, true));
        assert_eq!(selector.select("hello there"), ModelId::GeminiFlash8b);
    }

    #[test]
    fn short_query_without_gemini_goes_to_deepseek() {
        let selector = ProviderSelector::new(CredentialSet::new(false, true));
        assert_eq!(selector.select("hello there"), ModelId::DeepSeeker);
    }

    #[test]
    fn long_query_prefers_deepseek() {
        let selector = ProviderSelector::new(CredentialSet::new(true, true));
        assert_eq!(selector.select(&words(25)), ModelId::DeepSeeker);
    }

    #[test]
    fn long_query_without_deepseek_goes_to_large_gemini() {
        let selector = ProviderSelector::new(CredentialSet::new(true, false));
        assert_eq!(selector.select(&words(25)), ModelId::GeminiFlash);
    }

    #[test]
    fn threshold_is_inclusive() {
        let selector = ProviderSelector::new(CredentialSet::new(true, true));
        assert_eq!(selector.select(&words(19)), ModelId::GeminiFlash8b);
        assert_eq!(selector.select(&words(20)), ModelId::DeepSeeker);
    }

    #[test]
    fn no_credentials_still_selects() {
        let selector = ProviderSelector::new(CredentialSet::default());
        assert_eq!(selector.select("hi"), ModelId::DeepSeeker);
        assert_eq!(selector.select(&words(30)), ModelId::GeminiFlash);
    }

    #[test]
    fn word_count_ignores_extra_whitespace() {
        let selector = ProviderSelector::new(CredentialSet::new(true, true));
        let spaced = format!("  {}  ", vec!["w"; 19].join("   \t"));
        assert_eq!(selector.select(&spaced), ModelId::GeminiFlash8b);
    }

    #[test]
    fn custom_threshold() {
        let selector =
            ProviderSelector::new(CredentialSet::new(true, true)).with_long_query_words(3);
        assert_eq!(selector.select("one two"), ModelId::GeminiFlash8b);
        assert_eq!(selector.select("one two three"), ModelId::DeepSeeker);
    }

    proptest::proptest! {
        #[test]
        fn selection_is_deterministic(
            text in "[a-z ]{0,200}",
            gemini in proptest::bool::ANY,
            deepseek in proptest::bool::ANY,
        ) {
            let selector = ProviderSelector::new(CredentialSet::new(gemini, deepseek));
            proptest::prop_assert_eq!(selector.select(&text), selector.select(&text));
        }

        #[test]
        fn configured_provider_is_used_when_preferred(n in 0usize..60) {
            let selector = ProviderSelector::new(CredentialSet::new(true, true));
            let model = selector.select(&words(n));
            if n < LONG_QUERY_WORDS {
                proptest::prop_assert_eq!(model, ModelId::GeminiFlash8b);
            } else {
                proptest::prop_assert_eq!(model, ModelId::DeepSeeker);
            }
        }
    }
}
