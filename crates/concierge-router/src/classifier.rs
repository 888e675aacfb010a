// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-based persona classification.
//!
//! Substring matching over the lower-cased query. No model call, no network.

use concierge_core::Persona;

/// Programming vocabulary.
const CODE_KEYWORDS: &[&str] = &[
    "code",
    "function",
    "debug",
    "programming",
    "python",
    "javascript",
    "error",
    "bug",
    "syntax",
];

/// Research vocabulary.
const RESEARCH_KEYWORDS: &[&str] = &[
    "research",
    "analyze",
    "compare",
    "find",
    "study",
    "investigate",
];

/// Procedural vocabulary. Multi-word entries match as phrases.
const TASK_KEYWORDS: &[&str] = &[
    "how to", "steps", "guide", "tutorial", "process", "setup", "help me",
];

/// Maps a query to exactly one [`Persona`].
///
/// Categories are checked in priority order (code, research, task) and the
/// first one with any matching keyword wins. Matching is by substring, so
/// "decode" counts as code and "finding" as research.
#[derive(Debug, Clone, Default)]
pub struct PersonaClassifier;

impl PersonaClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str) -> Persona {
        let lower = text.to_lowercase();
        let hit = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

        if hit(CODE_KEYWORDS) {
            Persona::CodeAssistant
        } else if hit(RESEARCH_KEYWORDS) {
            Persona::ResearchAssistant
        } else if hit(TASK_KEYWORDS) {
            Persona::TaskHelper
        } else {
            Persona::GeneralAssistant
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Persona {
        PersonaClassifier::new().classify(text)
    }

    #[test]
    fn code_queries() {
        assert_eq!(classify("Fix this Python bug"), Persona::CodeAssistant);
        assert_eq!(classify("what does this FUNCTION return"), Persona::CodeAssistant);
        assert_eq!(classify("syntax of match arms"), Persona::CodeAssistant);
    }

    #[test]
    fn research_queries() {
        assert_eq!(
            classify("Compare solar and wind energy"),
            Persona::ResearchAssistant
        );
        assert_eq!(classify("investigate the decline"), Persona::ResearchAssistant);
    }

    #[test]
    fn task_queries() {
        assert_eq!(classify("How to bake bread"), Persona::TaskHelper);
        assert_eq!(classify("please help me pack"), Persona::TaskHelper);
        assert_eq!(classify("router setup"), Persona::TaskHelper);
    }

    #[test]
    fn general_fallback() {
        assert_eq!(classify("Tell me a joke"), Persona::GeneralAssistant);
        assert_eq!(classify(""), Persona::GeneralAssistant);
    }

    #[test]
    fn code_outranks_research_and_task() {
        assert_eq!(
            classify("compare two ways to debug, step guide"),
            Persona::CodeAssistant
        );
        assert_eq!(
            classify("research how to set up a lab"),
            Persona::ResearchAssistant
        );
    }

    #[test]
    fn substring_matches_count() {
        // "decode" contains "code", "findings" contains "find".
        assert_eq!(classify("decode this message"), Persona::CodeAssistant);
        assert_eq!(classify("summarize the findings"), Persona::ResearchAssistant);
    }

    #[test]
    fn phrase_keywords_need_the_whole_phrase() {
        assert_eq!(classify("how are you today"), Persona::GeneralAssistant);
        assert_eq!(classify("how to"), Persona::TaskHelper);
    }

    proptest::proptest! {
        #[test]
        fn classification_ignores_case(text in "[a-zA-Z ]{0,60}") {
            proptest::prop_assert_eq!(
                classify(&text),
                classify(&text.to_uppercase())
            );
        }

        #[test]
        fn any_code_keyword_wins(
            prefix in "[a-z ]{0,20}",
            idx in 0..CODE_KEYWORDS.len(),
            suffix in "[a-z ]{0,20}",
        ) {
            let text = format!("{prefix}{}{suffix}", CODE_KEYWORDS[idx]);
            proptest::prop_assert_eq!(classify(&text), Persona::CodeAssistant);
        }
    }
}
