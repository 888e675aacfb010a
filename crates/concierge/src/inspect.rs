// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot commands: `classify`, `route`, and `config`.

use concierge_agent::{ChatOutcome, RoutePlan};
use concierge_config::ConciergeConfig;
use concierge_core::{ConciergeError, Query};

use crate::serve::{build_dispatcher, init_tracing};

/// Prints the routing decision for `text`. No provider is contacted.
pub fn run_classify(config: &ConciergeConfig, text: &str) -> Result<(), ConciergeError> {
    let dispatcher = build_dispatcher(config)?;
    let plan = dispatcher.plan(&Query::new(text))?;
    println!("{}", describe_plan(&plan));
    Ok(())
}

/// Dispatches `text` once and prints the answer. Nothing is persisted.
pub async fn run_route(config: &ConciergeConfig, text: &str) -> Result<(), ConciergeError> {
    init_tracing(&config.log_level);
    let dispatcher = build_dispatcher(config)?;
    let dispatch = dispatcher.handle(&Query::new(text)).await?;
    let outcome = ChatOutcome::from_dispatch(&dispatch);

    println!("{}", describe_outcome(&outcome));
    if outcome.success {
        Ok(())
    } else {
        Err(ConciergeError::Provider {
            message: outcome.response,
            source: None,
        })
    }
}

pub fn run_config_show(config: &ConciergeConfig) -> Result<(), ConciergeError> {
    let rendered = config
        .to_redacted_toml()
        .map_err(|e| ConciergeError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

fn describe_plan(plan: &RoutePlan) -> String {
    format!(
        "persona:  {}\nmodel:    {}\nprovider: {}",
        plan.persona,
        plan.model,
        plan.model.provider().vendor()
    )
}

fn describe_outcome(outcome: &ChatOutcome) -> String {
    format!(
        "[{} via {}, {:.2}s, {} tokens]\n{}",
        outcome.persona,
        outcome.model,
        outcome.processing_time_secs,
        outcome.token_count,
        outcome.response
    )
}
