//! Server-sent events stream for storefront sessions.

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::time::{interval_at, Instant, Interval};
use tracing::warn;

use crate::broadcast::{connected_frame, heartbeat_frame, ConnectionGuard};
use crate::state::AppState;

/// Heartbeat cadence while a stream is idle.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

struct StreamState {
    backlog: VecDeque<String>,
    rx: Receiver<String>,
    heartbeat: Interval,
    _guard: ConnectionGuard,
}

/// GET /events - Stream domain events to the browser.
///
/// Opens with a connected frame and a replay of the most recent events,
/// then relays live frames from the hub. A 30s heartbeat keeps proxies
/// from closing idle connections. A lagging client loses the skipped
/// frames but keeps its stream.
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (rx, guard) = state.hub.subscribe();

    let mut backlog = VecDeque::new();
    backlog.push_back(connected_frame());
    for event in state.events.recent() {
        match serde_json::to_string(&event) {
            Ok(frame) => backlog.push_back(frame),
            Err(e) => warn!(error = %e, "Skipping unserializable recent event"),
        }
    }

    let heartbeat = interval_at(Instant::now() + HEARTBEAT_INTERVAL, HEARTBEAT_INTERVAL);

    let stream = stream::unfold(
        StreamState { backlog, rx, heartbeat, _guard: guard },
        |mut s| async move {
            if let Some(frame) = s.backlog.pop_front() {
                return Some((Ok(Event::default().data(frame)), s));
            }

            loop {
                tokio::select! {
                    _ = s.heartbeat.tick() => {
                        return Some((Ok(Event::default().data(heartbeat_frame())), s));
                    }
                    received = s.rx.recv() => match received {
                        Ok(frame) => {
                            s.heartbeat.reset();
                            return Some((Ok(Event::default().data(frame)), s));
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "SSE client lagged behind broadcast");
                            continue;
                        }
                        Err(RecvError::Closed) => return None,
                    },
                }
            }
        },
    );

    Sse::new(stream)
}
