use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        room::RoomSnapshot,
        sse::{RoomClosedEvent, RoomUpdatedEvent, ServerEvent},
    },
    state::{SharedState, room::Room},
};

const EVENT_ROOM_UPDATED: &str = "room.updated";
const EVENT_ROOM_CLOSED: &str = "room.closed";

/// Broadcast the latest committed snapshot of a room to its subscribers.
///
/// Every mutation goes through here, so watchers see the same sequence of
/// snapshots the store committed.
pub fn broadcast_room_snapshot(state: &SharedState, room: &Room) {
    let payload = RoomUpdatedEvent(RoomSnapshot::from(room));
    send_room_event(state, &room.code, EVENT_ROOM_UPDATED, &payload);
}

/// Broadcast that a room has ended, then drop its hub.
pub fn broadcast_room_closed(state: &SharedState, code: &str) {
    let payload = RoomClosedEvent {
        code: code.to_owned(),
    };
    send_room_event(state, code, EVENT_ROOM_CLOSED, &payload);
    state.room_events().remove(code);
}

fn send_room_event(state: &SharedState, code: &str, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.room_events().broadcast(code, event),
        Err(err) => warn!(code, event, error = %err, "failed to serialize SSE payload"),
    }
}
