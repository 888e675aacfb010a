// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query dispatch: classify, select a model, build the prompt, call the provider.

use std::sync::Arc;

use concierge_config::model::RoutingConfig;
use concierge_core::{Completion, ConciergeError, ModelId, Persona, ProviderAdapter, ProviderKind, Query};
use concierge_router::{CredentialSet, PersonaClassifier, PromptBuilder, ProviderSelector};
use tracing::{debug, info};

/// Everything decided about a query before any provider is contacted.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub persona: Persona,
    pub model: ModelId,
    pub prompt: String,
}

/// A plan together with the provider's answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub persona: Persona,
    pub model: ModelId,
    pub completion: Completion,
}

/// Routes queries to one of the two provider adapters.
///
/// The credential set is taken from the adapters once, at construction.
pub struct Dispatcher {
    classifier: PersonaClassifier,
    selector: ProviderSelector,
    prompts: PromptBuilder,
    gemini: Arc<dyn ProviderAdapter>,
    deepseek: Arc<dyn ProviderAdapter>,
}

impl Dispatcher {
    pub fn new(gemini: Arc<dyn ProviderAdapter>, deepseek: Arc<dyn ProviderAdapter>) -> Self {
        let credentials = CredentialSet::new(gemini.is_configured(), deepseek.is_configured());
        info!(
            gemini = credentials.gemini,
            deepseek = credentials.deepseek,
            "dispatcher credentials fixed"
        );
        Self {
            classifier: PersonaClassifier::new(),
            selector: ProviderSelector::new(credentials),
            prompts: PromptBuilder::new(),
            gemini,
            deepseek,
        }
    }

    /// Applies the routing section of the configuration.
    pub fn with_routing(mut self, routing: &RoutingConfig) -> Self {
        self.selector = self.selector.with_long_query_words(routing.long_query_words);
        self
    }

    pub fn credentials(&self) -> CredentialSet {
        self.selector.credentials()
    }

    /// The adapter serving `kind`.
    pub fn provider(&self, kind: ProviderKind) -> Arc<dyn ProviderAdapter> {
        match kind {
            ProviderKind::Gemini => Arc::clone(&self.gemini),
            ProviderKind::DeepSeek => Arc::clone(&self.deepseek),
        }
    }

    /// Classifies and selects without calling anything. Blank queries are rejected.
    pub fn plan(&self, query: &Query) -> Result<RoutePlan, ConciergeError> {
        if query.is_blank() {
            return Err(ConciergeError::empty_query());
        }
        let persona = self.classifier.classify(&query.text);
        let model = self.selector.select(&query.text);
        let prompt = self.prompts.build(persona, &query.text);
        debug!(persona = %persona, model = model.as_str(), "route planned");
        Ok(RoutePlan {
            persona,
            model,
            prompt,
        })
    }

    /// Sends the planned prompt to the provider that serves the planned model.
    pub async fn execute(&self, plan: &RoutePlan) -> Completion {
        let provider = self.provider(plan.model.provider());
        let completion = provider.generate(&plan.prompt, plan.model).await;
        info!(
            persona = %plan.persona,
            model = plan.model.as_str(),
            success = completion.success,
            elapsed_ms = completion.elapsed.as_millis() as u64,
            "dispatch complete"
        );
        completion
    }

    pub async fn handle(&self, query: &Query) -> Result<Dispatch, ConciergeError> {
        let plan = self.plan(query)?;
        let completion = self.execute(&plan).await;
        Ok(Dispatch {
            persona: plan.persona,
            model: plan.model,
            completion,
        })
    }
}
