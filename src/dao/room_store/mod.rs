//! Abstraction over the document database holding room and profile documents.

#[cfg(feature = "mongo-store")]
pub mod mongodb;

pub mod memory;

use futures::future::BoxFuture;

use crate::dao::models::{ProfileEntity, RoomPatch};
use crate::dao::storage::StorageResult;
use crate::state::room::Room;

/// Per-document operations the synchronization core relies on: create, point
/// read, and atomic partial merge. Fan-out to subscribers is layered on top
/// by the service layer, so backends stay plain request/response stores.
pub trait RoomStore: Send + Sync {
    /// Persist a freshly created room document keyed by its code.
    fn create_room(&self, room: Room) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch the latest committed snapshot of a room, if it exists.
    fn find_room(&self, code: String) -> BoxFuture<'static, StorageResult<Option<Room>>>;
    /// Atomically merge a partial update into a room document and return the
    /// merged snapshot, or `None` when the room does not exist.
    fn update_room(
        &self,
        code: String,
        patch: RoomPatch,
    ) -> BoxFuture<'static, StorageResult<Option<Room>>>;
    /// Fetch a player profile document.
    fn find_profile(
        &self,
        player_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<ProfileEntity>>>;
    /// Create or overwrite a player profile document. Racing identical
    /// defaults is tolerated; last write wins.
    fn save_profile(&self, profile: ProfileEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Verify the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish a dropped backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
