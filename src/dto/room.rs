//! DTO definitions for the room REST API.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::{challenge::ActiveChallengeSnapshot, format_system_time},
    state::room::{Host, PlayerId, Room},
};

/// Payload opening a new room with the caller as host.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoomRequest {
    /// Identifier of the player who will host the room.
    #[validate(length(min = 1, message = "host_id must not be empty"))]
    pub host_id: PlayerId,
    /// Optional capacity override, including the host.
    pub max_players: Option<usize>,
}

/// Payload for joining an existing room.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct JoinRoomRequest {
    /// Identifier of the joining player.
    #[validate(length(min = 1, message = "player_id must not be empty"))]
    pub player_id: PlayerId,
}

/// Payload for leaving a room.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LeaveRoomRequest {
    /// Identifier of the leaving player.
    #[validate(length(min = 1, message = "player_id must not be empty"))]
    pub player_id: PlayerId,
}

/// Payload for starting the game, restricted to the host.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StartGameRequest {
    /// Identifier of the caller; must match the room host.
    #[validate(length(min = 1, message = "player_id must not be empty"))]
    pub player_id: PlayerId,
}

/// Payload for an original host returning within the grace window.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReconnectRequest {
    /// Identifier of the returning player.
    #[validate(length(min = 1, message = "player_id must not be empty"))]
    pub player_id: PlayerId,
}

/// Request to adjust a player's key count by a delta.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ScoreAdjustmentRequest {
    /// Identifier of the caller; must match the room host.
    #[validate(length(min = 1, message = "host_id must not be empty"))]
    pub host_id: PlayerId,
    /// Signed key delta; the result saturates at the scale bounds.
    pub delta: i8,
}

/// Result of a score adjustment, returning the updated tally.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreUpdateResponse {
    /// Player whose keys changed.
    pub player_id: PlayerId,
    /// Key count after clamping.
    pub score: u8,
}

/// Projection of the room host exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct HostSnapshot {
    pub id: PlayerId,
    pub is_online: bool,
    pub last_active: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnected_at: Option<String>,
}

impl From<&Host> for HostSnapshot {
    fn from(host: &Host) -> Self {
        Self {
            id: host.id.clone(),
            is_online: host.is_online,
            last_active: format_system_time(host.last_active),
            disconnected_at: host.disconnected_at.map(format_system_time),
        }
    }
}

/// Full projection of a room returned by most room endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomSnapshot {
    /// Six-digit join code.
    pub code: String,
    pub host: HostSnapshot,
    /// Members in join order, host seat included. The seat is vacated from
    /// this list while the room is paused on a host disconnect.
    pub players: Vec<PlayerId>,
    pub max_players: usize,
    /// Key counts per member, host included.
    pub scores: IndexMap<PlayerId, u8>,
    pub game_state: crate::state::room::GameState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_challenge: Option<ActiveChallengeSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_host: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_deadline: Option<String>,
    pub created_at: String,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        Self {
            code: room.code.clone(),
            host: HostSnapshot::from(&room.host),
            players: room.players.clone(),
            max_players: room.max_players,
            scores: room.scores.clone(),
            game_state: room.game_state,
            active_challenge: room.active_challenge.as_ref().map(Into::into),
            temporary_host: room.temporary_host.clone(),
            grace_deadline: room.grace_deadline.map(format_system_time),
            created_at: format_system_time(room.created_at),
        }
    }
}
