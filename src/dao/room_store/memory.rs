//! In-process room store used for single-node deployments and tests.
//!
//! DashMap's per-entry locking gives the same guarantee the remote backends
//! provide: a patch is merged into a document atomically, so concurrent
//! readers observe either the previous or the next snapshot, never a
//! half-applied one.

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::dao::{
    models::{ProfileEntity, RoomPatch},
    room_store::RoomStore,
    storage::StorageResult,
};
use crate::state::room::Room;

/// DashMap-backed [`RoomStore`].
#[derive(Default)]
pub struct MemoryRoomStore {
    rooms: DashMap<String, Room>,
    profiles: DashMap<String, ProfileEntity>,
}

impl MemoryRoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoomStore for MemoryRoomStore {
    fn create_room(&self, room: Room) -> BoxFuture<'static, StorageResult<()>> {
        self.rooms.insert(room.code.clone(), room);
        Box::pin(async { Ok(()) })
    }

    fn find_room(&self, code: String) -> BoxFuture<'static, StorageResult<Option<Room>>> {
        let found = self.rooms.get(&code).map(|entry| entry.clone());
        Box::pin(async move { Ok(found) })
    }

    fn update_room(
        &self,
        code: String,
        patch: RoomPatch,
    ) -> BoxFuture<'static, StorageResult<Option<Room>>> {
        // The entry guard is held across the merge, making it atomic with
        // respect to concurrent find/update calls on the same room.
        let merged = self.rooms.get_mut(&code).map(|mut entry| {
            patch.apply(entry.value_mut());
            entry.clone()
        });
        Box::pin(async move { Ok(merged) })
    }

    fn find_profile(
        &self,
        player_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<ProfileEntity>>> {
        let found = self.profiles.get(&player_id).map(|entry| entry.clone());
        Box::pin(async move { Ok(found) })
    }

    fn save_profile(&self, profile: ProfileEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.profiles.insert(profile.player_id.clone(), profile);
        Box::pin(async { Ok(()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::state::room::GameState;

    #[tokio::test]
    async fn update_returns_the_merged_snapshot() {
        let store = MemoryRoomStore::new();
        let room = Room::new("123456".into(), "host".into(), 6, SystemTime::now());
        store.create_room(room).await.unwrap();

        let merged = store
            .update_room(
                "123456".into(),
                RoomPatch {
                    game_state: Some(GameState::Started),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .expect("room exists");

        assert_eq!(merged.game_state, GameState::Started);
        let reread = store.find_room("123456".into()).await.unwrap().unwrap();
        assert_eq!(reread, merged);
    }

    #[tokio::test]
    async fn update_of_missing_room_is_none() {
        let store = MemoryRoomStore::new();
        let merged = store
            .update_room("000000".into(), RoomPatch::default())
            .await
            .unwrap();
        assert!(merged.is_none());
    }
}
