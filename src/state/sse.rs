use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Fan-out side of the room store: one broadcast hub per room, pushing every
/// committed snapshot to the room's subscribers.
pub struct RoomChannels {
    capacity: usize,
    hubs: DashMap<String, SseHub>,
}

impl RoomChannels {
    /// Build the registry with a per-room channel capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            hubs: DashMap::new(),
        }
    }

    /// Register a subscriber for one room's stream, creating the hub lazily.
    pub fn subscribe(&self, code: &str) -> broadcast::Receiver<ServerEvent> {
        self.hubs
            .entry(code.to_owned())
            .or_insert_with(|| SseHub::new(self.capacity))
            .subscribe()
    }

    /// Send an event to all subscribers of one room. A room nobody watches
    /// has no hub and the event is dropped, which is fine: a later
    /// subscriber receives the full snapshot in its handshake.
    pub fn broadcast(&self, code: &str, event: ServerEvent) {
        if let Some(hub) = self.hubs.get(code) {
            hub.broadcast(event);
        }
    }

    /// Drop the hub of a room that ended.
    pub fn remove(&self, code: &str) {
        self.hubs.remove(code);
    }
}

/// Simple broadcast hub wrapper behind each room stream.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
