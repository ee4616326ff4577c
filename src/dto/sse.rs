use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::room::RoomSnapshot;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Build an event from an already serialised data payload.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it subscribes to a room.
pub struct RoomHandshake {
    /// Join code of the subscribed room.
    pub code: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
    /// State of the room at subscription time.
    pub room: RoomSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever the room document changes.
pub struct RoomUpdatedEvent(pub RoomSnapshot);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the room has ended and is about to be released.
pub struct RoomClosedEvent {
    pub code: String,
}
