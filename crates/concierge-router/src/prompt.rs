// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona prompt headers.

use concierge_core::Persona;

/// Prepends a fixed persona header to the user's text.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn header(&self, persona: Persona) -> &'static str {
        match persona {
            Persona::CodeAssistant => "You are a Code Assistant.\n\n",
            Persona::ResearchAssistant => "You are a Research Assistant.\n\n",
            Persona::TaskHelper => "You are a Task Helper. Use numbered steps.\n\n",
            Persona::GeneralAssistant => "You are a helpful assistant.\n\n",
        }
    }

    pub fn build(&self, persona: Persona, text: &str) -> String {
        let header = self.header(persona);
        let mut prompt = String::with_capacity(header.len() + text.len());
        prompt.push_str(header);
        prompt.push_str(text);
        prompt
    }
}
