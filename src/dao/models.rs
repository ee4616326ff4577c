use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::state::room::{ActiveChallenge, GameState, Host, PlayerId, Room};

/// Partial update of a room document, the typed equivalent of a
/// dot-path `updateFields` call against a document database.
///
/// `None` leaves a field untouched; `Some` overwrites it. Nullable document
/// fields use a nested `Option` so a patch can distinguish "set to null"
/// (`Some(None)`) from "keep" (`None`). A backend must apply the whole patch
/// as one atomic merge so no reader ever observes it half-applied.
#[derive(Debug, Clone, Default)]
pub struct RoomPatch {
    /// Replace the lifecycle state.
    pub game_state: Option<GameState>,
    /// Replace the member list.
    pub players: Option<Vec<PlayerId>>,
    /// Replace the whole host seat (promotion).
    pub host: Option<Host>,
    /// Update only the host's online flag.
    pub host_is_online: Option<bool>,
    /// Update only the host's last-active timestamp.
    pub host_last_active: Option<SystemTime>,
    /// Set or clear the host's disconnection timestamp.
    pub host_disconnected_at: Option<Option<SystemTime>>,
    /// Set or clear the temporary-host candidate.
    pub temporary_host: Option<Option<PlayerId>>,
    /// Set or clear the grace deadline.
    pub grace_deadline: Option<Option<SystemTime>>,
    /// Set or clear the active challenge record.
    pub active_challenge: Option<Option<ActiveChallenge>>,
    /// Overwrite a single player's score entry.
    pub score: Option<(PlayerId, u8)>,
}

impl RoomPatch {
    /// Merge this patch into an owned room document. Backends that hold the
    /// document in memory apply the patch under their per-entry lock; remote
    /// backends translate the same field set into their native atomic merge.
    pub fn apply(self, room: &mut Room) {
        if let Some(game_state) = self.game_state {
            room.game_state = game_state;
        }
        if let Some(players) = self.players {
            room.players = players;
        }
        if let Some(host) = self.host {
            room.host = host;
        }
        if let Some(is_online) = self.host_is_online {
            room.host.is_online = is_online;
        }
        if let Some(last_active) = self.host_last_active {
            room.host.last_active = last_active;
        }
        if let Some(disconnected_at) = self.host_disconnected_at {
            room.host.disconnected_at = disconnected_at;
        }
        if let Some(temporary_host) = self.temporary_host {
            room.temporary_host = temporary_host;
        }
        if let Some(grace_deadline) = self.grace_deadline {
            room.grace_deadline = grace_deadline;
        }
        if let Some(active_challenge) = self.active_challenge {
            room.active_challenge = active_challenge;
        }
        if let Some((player, value)) = self.score {
            room.scores.insert(player, value);
        }
    }
}

/// Player profile document, created lazily on first authenticated access and
/// mutated only by its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileEntity {
    /// Owning player.
    pub player_id: PlayerId,
    /// Account e-mail the profile was initialised from.
    pub email: String,
    /// Display name shown next to scores; defaults to the e-mail local part.
    pub display_name: String,
    /// Optional avatar reference.
    pub avatar: Option<String>,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last modification timestamp.
    pub updated_at: SystemTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::room::GameState;

    #[test]
    fn patch_distinguishes_clear_from_keep() {
        let now = SystemTime::now();
        let mut room = Room::new("111111".into(), "host".into(), 6, now);
        room.grace_deadline = Some(now);
        room.temporary_host = Some("a".into());

        RoomPatch {
            grace_deadline: Some(None),
            ..Default::default()
        }
        .apply(&mut room);

        assert_eq!(room.grace_deadline, None);
        // Untouched field survives the patch.
        assert_eq!(room.temporary_host.as_deref(), Some("a"));
    }

    #[test]
    fn score_patch_touches_a_single_entry() {
        let now = SystemTime::now();
        let mut room = Room::new("111111".into(), "host".into(), 6, now);
        room.scores.insert("a".into(), 2);

        RoomPatch {
            score: Some(("a".into(), 3)),
            game_state: Some(GameState::Started),
            ..Default::default()
        }
        .apply(&mut room);

        assert_eq!(room.scores.get("a"), Some(&3));
        assert_eq!(room.scores.get("host"), Some(&0));
        assert_eq!(room.game_state, GameState::Started);
    }
}
