// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat orchestration: dispatch, persistence, and streaming.

use std::sync::Arc;

use concierge_core::{ConciergeError, HistoryFilter, Interaction, InteractionSink, Query, StreamEvent};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::dispatcher::Dispatcher;
use crate::outcome::ChatOutcome;
use crate::relay::StreamRelay;

/// Receiving end of a streamed reply.
pub type EventStream = mpsc::Receiver<StreamEvent>;

/// Entry point for the chat endpoints.
///
/// Every routed request, streamed or not, produces one interaction. Writing
/// it is best effort: a sink failure is logged and the reply still goes out.
pub struct ChatService {
    dispatcher: Arc<Dispatcher>,
    relay: StreamRelay,
    sink: Arc<dyn InteractionSink>,
}

impl ChatService {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        relay: StreamRelay,
        sink: Arc<dyn InteractionSink>,
    ) -> Self {
        Self {
            dispatcher,
            relay,
            sink,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn chat(&self, query: Query) -> Result<ChatOutcome, ConciergeError> {
        let dispatch = self.dispatcher.handle(&query).await?;
        let outcome = ChatOutcome::from_dispatch(&dispatch);
        persist(self.sink.as_ref(), &outcome, &query).await;
        Ok(outcome)
    }

    /// Validates and plans synchronously, then streams on a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn stream(&self, query: Query) -> Result<EventStream, ConciergeError> {
        let plan = self.dispatcher.plan(&query)?;
        let (rx, relay) = self.relay.spawn(plan);
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            match relay.await {
                Ok(Some(outcome)) => persist(sink.as_ref(), &outcome, &query).await,
                Ok(None) => debug!("stream abandoned before dispatch; nothing recorded"),
                Err(e) => warn!(error = %e, "stream relay task failed"),
            }
        });
        Ok(rx)
    }

    pub async fn history(
        &self,
        limit: u32,
        filter: &HistoryFilter,
    ) -> Result<Vec<Interaction>, ConciergeError> {
        self.sink.recent(limit, filter).await
    }
}

async fn persist(sink: &dyn InteractionSink, outcome: &ChatOutcome, query: &Query) {
    let interaction = outcome.to_interaction(query);
    match sink.record(&interaction).await {
        Ok(id) => debug!(id, session_id = %interaction.session_id, "interaction recorded"),
        Err(e) => warn!(error = %e, "failed to record interaction"),
    }
}
