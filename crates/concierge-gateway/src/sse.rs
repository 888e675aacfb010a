// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events for POST /chat/stream.
//!
//! Each [`StreamEvent`] becomes one `data: <json>` frame:
//! ```text
//! data: {"event":"start","agent":"Task Helper","model":"gemini-1.5-flash-8b"}
//!
//! data: {"event":"delta","content":"1. Preheat the oven"}
//!
//! data: {"event":"complete","ok":true}
//! ```

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::Json;
use concierge_core::{ConciergeError, StreamEvent};
use futures::stream::{self, Stream};

use crate::error::ApiError;
use crate::handlers::ChatRequest;
use crate::server::GatewayState;

/// POST /chat/stream
///
/// A blank query is rejected with 400 before any event is sent.
pub async fn post_chat_stream(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    if body.query.trim().is_empty() {
        return Err(ConciergeError::empty_query().into());
    }
    let query = body.into_query(&state).await?;
    let rx = state.chat.stream(query)?;

    let events = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Ok(to_frame(&event)), rx))
    });
    Ok(Sse::new(events))
}

fn to_frame(event: &StreamEvent) -> Event {
    Event::default().data(frame_data(event))
}

/// The JSON payload of one frame.
fn frame_data(event: &StreamEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|e| {
        serde_json::json!({"event": "error", "message": format!("unencodable event: {e}")})
            .to_string()
    })
}
