// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replays a provider completion as a paced sequence of [`StreamEvent`]s.
//!
//! Providers answer in one piece. The relay emits `Start` before calling the
//! provider, then splits the answer into word chunks, one `Delta` per chunk,
//! and finishes with `Complete` (or `Error` if the provider task died).

use std::sync::Arc;
use std::time::Duration;

use concierge_config::model::StreamConfig;
use concierge_core::StreamEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dispatcher::{Dispatch, Dispatcher, RoutePlan};
use crate::outcome::ChatOutcome;

/// Events buffered between the relay and a slow consumer.
const CHANNEL_CAPACITY: usize = 32;

/// Where a relay is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayState {
    NotStarted,
    Started,
    Streaming,
    Completed,
    Failed,
}

impl RelayState {
    /// The state reached once `event` has been delivered.
    fn reached_by(event: &StreamEvent) -> Self {
        match event {
            StreamEvent::Start { .. } => RelayState::Started,
            StreamEvent::Delta { .. } => RelayState::Streaming,
            StreamEvent::Complete { .. } => RelayState::Completed,
            StreamEvent::Error { .. } => RelayState::Failed,
        }
    }
}

/// Sending half of a relay, tracking what it has delivered.
struct Emitter {
    tx: mpsc::Sender<StreamEvent>,
    state: RelayState,
}

impl Emitter {
    /// Delivers `event`. Returns false once the consumer has gone.
    async fn emit(&mut self, event: StreamEvent) -> bool {
        let next = RelayState::reached_by(&event);
        if self.tx.send(event).await.is_err() {
            debug!(state = ?self.state, "stream consumer gone");
            return false;
        }
        self.state = next;
        true
    }
}

/// Drives one streamed reply per call to [`StreamRelay::run`].
#[derive(Clone)]
pub struct StreamRelay {
    dispatcher: Arc<Dispatcher>,
    chunk_words: usize,
    chunk_delay: Duration,
}

impl StreamRelay {
    pub fn new(dispatcher: Arc<Dispatcher>, chunk_words: usize, chunk_delay: Duration) -> Self {
        Self {
            dispatcher,
            chunk_words: chunk_words.max(1),
            chunk_delay,
        }
    }

    pub fn from_config(dispatcher: Arc<Dispatcher>, config: &StreamConfig) -> Self {
        Self::new(
            dispatcher,
            config.chunk_words,
            Duration::from_millis(config.chunk_delay_ms),
        )
    }

    /// Runs the relay on its own task and hands back the receiving end.
    ///
    /// The join handle resolves to the outcome to persist, or `None` if the
    /// consumer left before the provider was called.
    pub fn spawn(
        &self,
        plan: RoutePlan,
    ) -> (mpsc::Receiver<StreamEvent>, JoinHandle<Option<ChatOutcome>>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let relay = self.clone();
        let handle = tokio::spawn(async move { relay.run(plan, tx).await });
        (rx, handle)
    }

    /// Emits the full event sequence for `plan` into `tx`.
    ///
    /// A closed receiver stops emission without error. The provider call is
    /// not abandoned once started, so its outcome is still returned.
    pub async fn run(&self, plan: RoutePlan, tx: mpsc::Sender<StreamEvent>) -> Option<ChatOutcome> {
        self.drive(plan, tx).await.1
    }

    async fn drive(
        &self,
        plan: RoutePlan,
        tx: mpsc::Sender<StreamEvent>,
    ) -> (RelayState, Option<ChatOutcome>) {
        let mut out = Emitter {
            tx,
            state: RelayState::NotStarted,
        };
        let start = StreamEvent::Start {
            persona: plan.persona,
            model: plan.model,
        };
        if !out.emit(start).await {
            return (out.state, None);
        }

        let dispatcher = Arc::clone(&self.dispatcher);
        let planned = plan.clone();
        let call = tokio::spawn(async move { dispatcher.execute(&planned).await });

        let completion = match call.await {
            Ok(completion) => completion,
            Err(e) => {
                let message = format!("provider task failed: {e}");
                warn!(error = %e, model = plan.model.as_str(), "stream relay failed");
                out.emit(StreamEvent::Error {
                    message: message.clone(),
                })
                .await;
                let outcome = ChatOutcome::without_completion(plan.persona, plan.model, message);
                return (out.state, Some(outcome));
            }
        };

        let outcome = ChatOutcome::from_dispatch(&Dispatch {
            persona: plan.persona,
            model: plan.model,
            completion,
        });

        let words: Vec<&str> = outcome.response.split_whitespace().collect();
        let chunks: Vec<String> = words.chunks(self.chunk_words).map(|c| c.join(" ")).collect();
        for content in chunks {
            if !out.emit(StreamEvent::Delta { content }).await {
                return (out.state, Some(outcome));
            }
            tokio::time::sleep(self.chunk_delay).await;
        }

        out.emit(StreamEvent::Complete {
            ok: outcome.success,
        })
        .await;
        debug!(
            state = ?out.state,
            success = outcome.success,
            model = plan.model.as_str(),
            "stream relay finished"
        );
        (out.state, Some(outcome))
    }
}
