// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `concierge serve` implementation.
//!
//! Wires storage, both providers, the dispatcher and the HTTP gateway, then
//! serves until SIGINT or SIGTERM.

use std::sync::Arc;

use concierge_agent::shutdown::install_signal_handler;
use concierge_agent::{ChatService, Dispatcher, StreamRelay};
use concierge_config::ConciergeConfig;
use concierge_core::{ConciergeError, PluginAdapter, StorageAdapter};
use concierge_deepseek::DeepSeekProvider;
use concierge_gateway::{Accounts, GatewayState};
use concierge_gemini::GeminiProvider;
use concierge_storage::SqliteStorage;
use tracing::{info, warn};

/// Runs the gateway until a shutdown signal arrives.
pub async fn run_serve(config: ConciergeConfig) -> Result<(), ConciergeError> {
    init_tracing(&config.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "starting concierge serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let state = build_state(&config, storage.clone())?;
    let cancel = install_signal_handler();
    let shutdown = async move { cancel.cancelled().await };

    let served = concierge_gateway::serve(&config.server, state, shutdown).await;

    if let Err(e) = storage.shutdown().await {
        warn!(error = %e, "storage shutdown failed");
    }
    info!("concierge stopped");
    served
}

/// Builds both provider adapters and the dispatcher over them.
pub fn build_dispatcher(config: &ConciergeConfig) -> Result<Dispatcher, ConciergeError> {
    let gemini = Arc::new(GeminiProvider::new(&config.gemini)?);
    let deepseek = Arc::new(DeepSeekProvider::new(&config.deepseek)?);
    Ok(Dispatcher::new(gemini, deepseek).with_routing(&config.routing))
}

/// Assembles the shared gateway state on top of an initialized store.
pub fn build_state(
    config: &ConciergeConfig,
    storage: Arc<SqliteStorage>,
) -> Result<GatewayState, ConciergeError> {
    let dispatcher = Arc::new(build_dispatcher(config)?);
    let credentials = dispatcher.credentials();
    if !credentials.any() {
        warn!("no provider API keys configured; every chat will report a missing key");
    }

    let relay = StreamRelay::from_config(dispatcher.clone(), &config.stream);
    let chat = Arc::new(ChatService::new(dispatcher, relay, storage.clone()));
    let accounts = Arc::new(Accounts::new(storage, config.auth.clone()));
    Ok(GatewayState::new(chat, accounts))
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("concierge={log_level},warn")));

    // A second init (tests, repeated commands) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::{ModelId, Query};

    #[test]
    fn dispatcher_sees_configured_keys() {
        let mut config = ConciergeConfig::default();
        config.deepseek.api_key = Some("sk-test".into());

        let dispatcher = build_dispatcher(&config).unwrap();
        let credentials = dispatcher.credentials();
        assert!(!credentials.gemini);
        assert!(credentials.deepseek);

        let plan = dispatcher.plan(&Query::new("hi")).unwrap();
        assert_eq!(plan.model, ModelId::DeepSeeker);
    }

    #[tokio::test]
    async fn state_builds_over_fresh_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ConciergeConfig::default();
        config.storage.database_path = dir.path().join("c.db").to_string_lossy().into_owned();

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await.unwrap();
        let state = build_state(&config, storage).unwrap();
        assert!(!state.chat.dispatcher().credentials().any());
    }
}
