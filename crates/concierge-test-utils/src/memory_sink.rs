// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`InteractionSink`].

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use concierge_core::{ConciergeError, HistoryFilter, Interaction, InteractionSink};

/// Keeps recorded interactions in a vector. Can be switched to fail every write.
#[derive(Default)]
pub struct MemorySink {
    rows: Mutex<Vec<Interaction>>,
    failing: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `record` always errors.
    pub fn failing() -> Self {
        let sink = Self::new();
        sink.failing.store(true, Ordering::SeqCst);
        sink
    }

    /// Snapshot of everything recorded, oldest first.
    pub async fn recorded(&self) -> Vec<Interaction> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl InteractionSink for MemorySink {
    async fn record(&self, interaction: &Interaction) -> Result<i64, ConciergeError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ConciergeError::Storage {
                source: "memory sink set to fail".into(),
            });
        }
        let mut rows = self.rows.lock().await;
        let id = rows.len() as i64 + 1;
        let mut stored = interaction.clone();
        stored.id = Some(id);
        rows.push(stored);
        Ok(id)
    }

    async fn recent(
        &self,
        limit: u32,
        filter: &HistoryFilter,
    ) -> Result<Vec<Interaction>, ConciergeError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|i| {
                filter
                    .session_id
                    .as_ref()
                    .is_none_or(|s| &i.session_id == s)
                    && filter.user_id.is_none_or(|u| i.user_id == Some(u))
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
