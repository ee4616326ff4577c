use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, DateTime, Document, doc, serialize_to_bson},
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoActiveChallenge, MongoHost, MongoProfileDocument, MongoRoomDocument,
        PROFILE_COLLECTION_NAME, ROOM_COLLECTION_NAME,
    },
};
use crate::dao::{
    models::{ProfileEntity, RoomPatch},
    room_store::RoomStore,
    storage::StorageResult,
};
use crate::state::room::Room;

/// MongoDB-backed [`RoomStore`].
#[derive(Clone)]
pub struct MongoRoomStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoRoomStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn rooms(&self) -> Collection<MongoRoomDocument> {
        self.database()
            .await
            .collection::<MongoRoomDocument>(ROOM_COLLECTION_NAME)
    }

    async fn profiles(&self) -> Collection<MongoProfileDocument> {
        self.database()
            .await
            .collection::<MongoProfileDocument>(PROFILE_COLLECTION_NAME)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        // Join codes are the primary key; the extra index supports sweeping
        // stale rooms by age.
        let collection = self
            .database()
            .await
            .collection::<Document>(ROOM_COLLECTION_NAME);
        let name = "room_created_at_idx";
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"created_at": 1})
            .options(IndexOptions::builder().name(Some(name.to_owned())).build())
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::CreateIndex { name, source })?;

        Ok(())
    }
}

/// Translate a [`RoomPatch`] into the `$set` document MongoDB merges
/// atomically, using dot paths for host sub-fields and per-player scores.
fn set_document(code: &str, patch: RoomPatch) -> MongoResult<Document> {
    let encode = |field: &'static str, bson: Result<Bson, mongodb::bson::error::Error>| {
        bson.map_err(|source| MongoDaoError::EncodePatch {
            code: code.to_owned(),
            field,
            source,
        })
    };

    let mut set = Document::new();

    if let Some(game_state) = patch.game_state {
        set.insert(
            "game_state",
            encode("game_state", serialize_to_bson(&game_state))?,
        );
    }
    if let Some(players) = patch.players {
        set.insert("players", encode("players", serialize_to_bson(&players))?);
    }
    if let Some(host) = patch.host {
        let host: MongoHost = host.into();
        set.insert("host", encode("host", serialize_to_bson(&host))?);
    }
    if let Some(is_online) = patch.host_is_online {
        set.insert("host.is_online", Bson::Boolean(is_online));
    }
    if let Some(last_active) = patch.host_last_active {
        set.insert(
            "host.last_active",
            Bson::DateTime(DateTime::from_system_time(last_active)),
        );
    }
    if let Some(disconnected_at) = patch.host_disconnected_at {
        set.insert(
            "host.disconnected_at",
            disconnected_at
                .map(|at| Bson::DateTime(DateTime::from_system_time(at)))
                .unwrap_or(Bson::Null),
        );
    }
    if let Some(temporary_host) = patch.temporary_host {
        set.insert(
            "temporary_host",
            temporary_host.map(Bson::String).unwrap_or(Bson::Null),
        );
    }
    if let Some(grace_deadline) = patch.grace_deadline {
        set.insert(
            "grace_deadline",
            grace_deadline
                .map(|at| Bson::DateTime(DateTime::from_system_time(at)))
                .unwrap_or(Bson::Null),
        );
    }
    if let Some(active_challenge) = patch.active_challenge {
        let value = match active_challenge {
            Some(challenge) => {
                let challenge: MongoActiveChallenge = challenge.into();
                encode("active_challenge", serialize_to_bson(&challenge))?
            }
            None => Bson::Null,
        };
        set.insert("active_challenge", value);
    }
    if let Some((player, value)) = patch.score {
        set.insert(format!("scores.{player}"), Bson::Int32(i32::from(value)));
    }

    Ok(set)
}

impl RoomStore for MongoRoomStore {
    fn create_room(&self, room: Room) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let code = room.code.clone();
            let document: MongoRoomDocument = room.into();
            store
                .rooms()
                .await
                .replace_one(doc! {"_id": &code}, &document)
                .upsert(true)
                .await
                .map_err(|source| MongoDaoError::SaveRoom { code, source })?;
            Ok(())
        })
    }

    fn find_room(&self, code: String) -> BoxFuture<'static, StorageResult<Option<Room>>> {
        let store = self.clone();
        Box::pin(async move {
            let found = store
                .rooms()
                .await
                .find_one(doc! {"_id": &code})
                .await
                .map_err(|source| MongoDaoError::FindRoom { code, source })?;
            Ok(found.map(Into::into))
        })
    }

    fn update_room(
        &self,
        code: String,
        patch: RoomPatch,
    ) -> BoxFuture<'static, StorageResult<Option<Room>>> {
        let store = self.clone();
        Box::pin(async move {
            let set = set_document(&code, patch)?;
            if set.is_empty() {
                return self_find(&store, code).await;
            }

            let merged = store
                .rooms()
                .await
                .find_one_and_update(doc! {"_id": &code}, doc! {"$set": set})
                .return_document(ReturnDocument::After)
                .await
                .map_err(|source| MongoDaoError::PatchRoom { code, source })?;
            Ok(merged.map(Into::into))
        })
    }

    fn find_profile(
        &self,
        player_id: String,
    ) -> BoxFuture<'static, StorageResult<Option<ProfileEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let found = store
                .profiles()
                .await
                .find_one(doc! {"_id": &player_id})
                .await
                .map_err(|source| MongoDaoError::Profile { player_id, source })?;
            Ok(found.map(Into::into))
        })
    }

    fn save_profile(&self, profile: ProfileEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let player_id = profile.player_id.clone();
            let document: MongoProfileDocument = profile.into();
            store
                .profiles()
                .await
                .replace_one(doc! {"_id": &player_id}, &document)
                .upsert(true)
                .await
                .map_err(|source| MongoDaoError::Profile { player_id, source })?;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.ping().await?;
            Ok(())
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.reconnect().await?;
            Ok(())
        })
    }
}

async fn self_find(store: &MongoRoomStore, code: String) -> StorageResult<Option<Room>> {
    let found = store
        .rooms()
        .await
        .find_one(doc! {"_id": &code})
        .await
        .map_err(|source| MongoDaoError::FindRoom { code, source })?;
    Ok(found.map(Into::into))
}
