use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dto::{
        room::RoomSnapshot,
        sse::{RoomHandshake, ServerEvent},
    },
    error::ServiceError,
    state::SharedState,
};

/// Subscribe to a room's event stream.
///
/// The receiver is registered before the handshake snapshot is read, so a
/// mutation racing the subscription is seen either in the handshake or as a
/// broadcast, never lost.
pub async fn subscribe_room(
    state: &SharedState,
    code: &str,
) -> Result<(broadcast::Receiver<ServerEvent>, RoomHandshake), ServiceError> {
    let receiver = state.room_events().subscribe(code);

    let store = state.require_room_store().await?;
    let Some(room) = store.find_room(code.to_owned()).await? else {
        return Err(ServiceError::NotFound(format!("room `{code}` not found")));
    };

    let handshake = RoomHandshake {
        code: code.to_owned(),
        message: format!("subscribed to room {code}"),
        degraded: state.is_degraded().await,
        room: RoomSnapshot::from(&room),
    };

    Ok((receiver, handshake))
}

/// Convert a broadcast receiver into an SSE response, forwarding events until
/// the client disconnects. `initial` is delivered to this client only,
/// before any broadcast.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    code: String,
    initial: Option<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        if let Some(payload) = initial {
            let mut event = Event::default().data(payload.data);
            if let Some(name) = payload.event {
                event = event.event(name);
            }
            if tx.send(Ok(event)).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive.
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!(code, "room SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
