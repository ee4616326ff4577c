/// Room domain types: rooms, hosts, challenges and scores.
pub mod room;
mod sse;
/// Room lifecycle state machine.
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::AppConfig,
    dao::{content::ChallengeContent, room_store::RoomStore},
    error::ServiceError,
};

pub use self::sse::{RoomChannels, SseHub};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state storing configuration and database handles.
pub struct AppState {
    config: AppConfig,
    room_store: RwLock<Option<Arc<dyn RoomStore>>>,
    content: Arc<dyn ChallengeContent>,
    rooms_sse: RoomChannels,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, content: Arc<dyn ChallengeContent>) -> SharedState {
        Arc::new(Self {
            config,
            room_store: RwLock::new(None),
            content,
            rooms_sse: RoomChannels::new(16),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current room store, if one is installed.
    pub async fn room_store(&self) -> Option<Arc<dyn RoomStore>> {
        let guard = self.room_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the current room store or fail with a degraded-mode error.
    pub async fn require_room_store(&self) -> Result<Arc<dyn RoomStore>, ServiceError> {
        self.room_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new room store implementation and leave degraded mode.
    pub async fn install_room_store(&self, store: Arc<dyn RoomStore>) {
        let mut guard = self.room_store.write().await;
        *guard = Some(store);
    }

    /// Remove the current room store and enter degraded mode.
    pub async fn clear_room_store(&self) {
        let mut guard = self.room_store.write().await;
        guard.take();
    }

    /// Degraded mode is simply the absence of an installed store.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.room_store.read().await;
        guard.is_none()
    }

    /// Per-room broadcast hubs backing the SSE streams.
    pub fn room_events(&self) -> &RoomChannels {
        &self.rooms_sse
    }

    /// Content service used to resolve scanned challenges.
    pub fn content(&self) -> &Arc<dyn ChallengeContent> {
        &self.content
    }
}
