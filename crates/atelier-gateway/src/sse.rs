// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events change feed for the attendance queue.
//!
//! Clients subscribe to GET /api/attendance/events and receive one
//! `conversation` event per mutation, so claims and closures show up
//! immediately instead of within a polling window. The stream carries only
//! change notifications; subscribers read the queue endpoints for their
//! initial snapshot.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast;
use tracing::warn;

use crate::server::GatewayState;

/// GET /api/attendance/events
pub async fn events(
    State(state): State<GatewayState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.bus.subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match Event::default().event("conversation").json_data(&event) {
                    Ok(sse_event) => return Some((Ok::<_, Infallible>(sse_event), rx)),
                    Err(e) => {
                        warn!(error = %e, "dropping unserializable change event");
                        continue;
                    }
                },
                // A slow consumer missed events; it re-reads the queue on
                // its next render, so skipping ahead is safe.
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "SSE subscriber lagged behind the change feed");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
