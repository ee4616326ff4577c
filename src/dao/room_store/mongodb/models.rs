use indexmap::IndexMap;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::ProfileEntity;
use crate::state::room::{
    ActiveChallenge, ChallengeKind, ChallengePayload, GameState, Host, LastAnswer, Room,
};

pub const ROOM_COLLECTION_NAME: &str = "rooms";
pub const PROFILE_COLLECTION_NAME: &str = "profiles";

/// BSON-facing shape of a room document, keyed by its join code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRoomDocument {
    #[serde(rename = "_id")]
    code: String,
    host: MongoHost,
    players: Vec<String>,
    max_players: usize,
    scores: IndexMap<String, u8>,
    game_state: GameState,
    active_challenge: Option<MongoActiveChallenge>,
    temporary_host: Option<String>,
    grace_deadline: Option<DateTime>,
    created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoHost {
    pub id: String,
    pub is_online: bool,
    pub last_active: DateTime,
    pub disconnected_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoActiveChallenge {
    pub id: Uuid,
    pub kind: ChallengeKind,
    pub payload: ChallengePayload,
    pub current_player: String,
    pub deadline: Option<DateTime>,
    pub last_answer: Option<LastAnswer>,
}

impl From<Host> for MongoHost {
    fn from(value: Host) -> Self {
        Self {
            id: value.id,
            is_online: value.is_online,
            last_active: DateTime::from_system_time(value.last_active),
            disconnected_at: value.disconnected_at.map(DateTime::from_system_time),
        }
    }
}

impl From<MongoHost> for Host {
    fn from(value: MongoHost) -> Self {
        Self {
            id: value.id,
            is_online: value.is_online,
            last_active: value.last_active.to_system_time(),
            disconnected_at: value.disconnected_at.map(|at| at.to_system_time()),
        }
    }
}

impl From<ActiveChallenge> for MongoActiveChallenge {
    fn from(value: ActiveChallenge) -> Self {
        Self {
            id: value.id,
            kind: value.kind,
            payload: value.payload,
            current_player: value.current_player,
            deadline: value.deadline.map(DateTime::from_system_time),
            last_answer: value.last_answer,
        }
    }
}

impl From<MongoActiveChallenge> for ActiveChallenge {
    fn from(value: MongoActiveChallenge) -> Self {
        Self {
            id: value.id,
            kind: value.kind,
            payload: value.payload,
            current_player: value.current_player,
            deadline: value.deadline.map(|at| at.to_system_time()),
            last_answer: value.last_answer,
        }
    }
}

impl From<Room> for MongoRoomDocument {
    fn from(value: Room) -> Self {
        Self {
            code: value.code,
            host: value.host.into(),
            players: value.players,
            max_players: value.max_players,
            scores: value.scores,
            game_state: value.game_state,
            active_challenge: value.active_challenge.map(Into::into),
            temporary_host: value.temporary_host,
            grace_deadline: value.grace_deadline.map(DateTime::from_system_time),
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl From<MongoRoomDocument> for Room {
    fn from(value: MongoRoomDocument) -> Self {
        Self {
            code: value.code,
            host: value.host.into(),
            players: value.players,
            max_players: value.max_players,
            scores: value.scores,
            game_state: value.game_state,
            active_challenge: value.active_challenge.map(Into::into),
            temporary_host: value.temporary_host,
            grace_deadline: value.grace_deadline.map(|at| at.to_system_time()),
            created_at: value.created_at.to_system_time(),
        }
    }
}

/// BSON-facing shape of a profile document, keyed by the owning player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoProfileDocument {
    #[serde(rename = "_id")]
    player_id: String,
    email: String,
    display_name: String,
    avatar: Option<String>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<ProfileEntity> for MongoProfileDocument {
    fn from(value: ProfileEntity) -> Self {
        Self {
            player_id: value.player_id,
            email: value.email,
            display_name: value.display_name,
            avatar: value.avatar,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoProfileDocument> for ProfileEntity {
    fn from(value: MongoProfileDocument) -> Self {
        Self {
            player_id: value.player_id,
            email: value.email,
            display_name: value.display_name,
            avatar: value.avatar,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}
