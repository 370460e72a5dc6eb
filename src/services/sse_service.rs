use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use crate::{
    dto::sse::{Handshake, ServerEvent},
    state::SharedState,
};

const EVENT_HANDSHAKE: &str = "handshake";

/// Identifies the target SSE stream for logging on teardown.
#[derive(Clone, Copy, Debug)]
pub enum StreamKind {
    /// Viewer stream.
    Public,
    /// Operator stream.
    Admin,
}

impl StreamKind {
    fn as_str(self) -> &'static str {
        match self {
            StreamKind::Public => "public",
            StreamKind::Admin => "admin",
        }
    }
}

/// Subscribe to `kind` and build the handshake the client receives first.
pub fn subscribe(
    state: &SharedState,
    kind: StreamKind,
) -> (broadcast::Receiver<ServerEvent>, Option<ServerEvent>) {
    let receiver = match kind {
        StreamKind::Public => state.public_sse().subscribe(),
        StreamKind::Admin => state.admin_sse().subscribe(),
    };
    let handshake = ServerEvent::json(
        Some(EVENT_HANDSHAKE.to_string()),
        &Handshake {
            stream: kind.as_str().to_string(),
            message: format!("subscribed to {} stream", kind.as_str()),
            degraded: state.is_degraded(),
        },
    )
    .ok();
    (receiver, handshake)
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

/// Convert a broadcast receiver into an SSE response, forwarding events until
/// the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    first: Option<ServerEvent>,
    kind: StreamKind,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(first) = first {
            if tx.send(Ok(to_event(first))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        // A lagging viewer catches up with the next snapshot.
                        Err(RecvError::Lagged(_)) => continue,
                    }
                }
            }
        }

        info!(stream = kind.as_str(), "SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
