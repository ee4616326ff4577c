//! Runtime representation of a room document and its challenge sub-state.
//!
//! The room document is the single shared mutable resource of the system:
//! every member's client observes the same committed snapshots and may write
//! partial updates through [`crate::dao::room_store::RoomStore`].

use std::time::SystemTime;

use indexmap::IndexMap;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identifier of an authenticated player. Opaque to the backend.
pub type PlayerId = String;

/// Lowest score a player can hold.
pub const MIN_SCORE: u8 = 0;
/// Number of keys a player needs to reach the shared goal.
pub const MAX_SCORE: u8 = 4;

/// Lifecycle state of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    /// Room exists, members gather, host has not started yet.
    Waiting,
    /// Game running, no challenge on screen; scanning is allowed.
    Started,
    /// A challenge is active and rendered by every member.
    Playing,
    /// Host is offline; the grace window is open.
    Paused,
    /// Room is logically closed. The document is never hard-deleted.
    Ended,
}

/// The member holding host authority (start game, adjust scores).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// Player currently holding the role.
    pub id: PlayerId,
    /// False while the grace window is open.
    pub is_online: bool,
    /// Last time the host performed a host action.
    pub last_active: SystemTime,
    /// Set when the host left; cleared on reclaim or promotion.
    pub disconnected_at: Option<SystemTime>,
}

/// Kind of mini-game a scanned code resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ChallengeKind {
    /// Multiple-choice question answered by the scanning player.
    Trivia,
    /// Guess-the-character riddle, hinted by the other members.
    Riddle,
    /// Mime performed by the scanning player.
    Charade,
    /// Image reveal, self-paced.
    Image,
    /// Social-media dare, self-paced.
    SocialDare,
    /// Free-form dare with a short timer.
    PlainChallenge,
}

impl ChallengeKind {
    /// Path segment used by the content service for this kind.
    pub fn content_segment(self) -> &'static str {
        match self {
            ChallengeKind::Trivia => "trivia",
            ChallengeKind::Riddle => "riddle",
            ChallengeKind::Charade => "mimica",
            ChallengeKind::Image => "image",
            ChallengeKind::SocialDare => "retoRedes",
            ChallengeKind::PlainChallenge => "reto",
        }
    }

    /// Self-paced kinds carry no deadline and resolve only on explicit advance.
    pub fn is_self_paced(self) -> bool {
        matches!(self, ChallengeKind::Image | ChallengeKind::SocialDare)
    }
}

impl std::fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.content_segment())
    }
}

/// Challenge content fetched from the content service. The shape depends on
/// the challenge kind, mirroring the service's JSON bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ChallengePayload {
    /// `trivia`
    Trivia(TriviaPayload),
    /// `image`
    Image(ImagePayload),
    /// `riddle`, `mimica`, `reto`, `retoRedes`
    Prompt(PromptPayload),
}

/// Multiple-choice trivia content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TriviaPayload {
    /// Question shown to every member.
    pub question: String,
    /// Answer options, indexed from zero.
    pub options: Vec<String>,
    /// Index of the correct option.
    pub correct_answer_index: usize,
}

/// Image-reveal content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImagePayload {
    /// Where to load the image from.
    pub url: String,
    /// Caption displayed under the image.
    pub description: String,
}

/// Text-prompt content shared by riddles, charades and dares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PromptPayload {
    /// Prompt shown to the relevant members.
    pub text: String,
    /// Optional category (e.g. the social network for a dare).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// First (and only) recorded trivia answer for the active challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastAnswer {
    /// Player who answered.
    pub player: PlayerId,
    /// Option index they picked.
    pub selected_index: usize,
    /// Whether the pick matched the correct index.
    pub correct: bool,
}

/// The challenge currently on screen. Present exactly while the room is in
/// [`GameState::Playing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveChallenge {
    /// Generated per dispatch so a stale timeout can never clear a successor
    /// challenge.
    pub id: Uuid,
    /// Classified challenge kind.
    pub kind: ChallengeKind,
    /// Content fetched for this dispatch.
    pub payload: ChallengePayload,
    /// The member who scanned the code.
    pub current_player: PlayerId,
    /// Absolute expiry; `None` for self-paced kinds.
    pub deadline: Option<SystemTime>,
    /// Recorded trivia answer, if any.
    pub last_answer: Option<LastAnswer>,
}

/// One room document, keyed by its 6-digit join code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Immutable 6-digit join code.
    pub code: String,
    /// Current host seat.
    pub host: Host,
    /// Members currently in the room. A player appears at most once.
    pub players: Vec<PlayerId>,
    /// Capacity fixed at creation.
    pub max_players: usize,
    /// Keys per player, each in `[MIN_SCORE, MAX_SCORE]`. Entries are created
    /// lazily and never removed while the room lives, even for departed
    /// players.
    pub scores: IndexMap<PlayerId, u8>,
    /// Lifecycle state, see [`GameState`].
    pub game_state: GameState,
    /// Challenge sub-state, non-`None` iff `game_state == Playing`.
    pub active_challenge: Option<ActiveChallenge>,
    /// Candidate promoted if the host misses the grace window.
    pub temporary_host: Option<PlayerId>,
    /// When the temporary-host promotion becomes effective.
    pub grace_deadline: Option<SystemTime>,
    /// Immutable creation timestamp.
    pub created_at: SystemTime,
}

impl Room {
    /// Build a fresh room document for `host_id` satisfying the creation
    /// invariants: the creator is the only member and owns a zeroed score
    /// entry, and the room waits for the host to start.
    pub fn new(code: String, host_id: PlayerId, max_players: usize, now: SystemTime) -> Self {
        let mut scores = IndexMap::new();
        scores.insert(host_id.clone(), MIN_SCORE);

        Self {
            code,
            host: Host {
                id: host_id.clone(),
                is_online: true,
                last_active: now,
                disconnected_at: None,
            },
            players: vec![host_id],
            max_players,
            scores,
            game_state: GameState::Waiting,
            active_challenge: None,
            temporary_host: None,
            grace_deadline: None,
            created_at: now,
        }
    }

    /// Whether `player_id` currently holds the host seat.
    pub fn is_host(&self, player_id: &str) -> bool {
        self.host.id == player_id
    }

    /// Whether `player_id` is a member of the room.
    pub fn is_member(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p == player_id)
    }

    /// Members excluding the current host.
    pub fn members_without_host(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| **p != self.host.id)
            .cloned()
            .collect()
    }

    /// Pick a temporary host uniformly at random among the remaining members,
    /// or `None` when the departing host was alone.
    pub fn pick_temporary_host(&self) -> Option<PlayerId> {
        let candidates = self.members_without_host();
        candidates.choose(&mut rand::rng()).cloned()
    }

    /// Current score for a player, defaulting to zero for a missing entry.
    pub fn score_of(&self, player_id: &str) -> u8 {
        self.scores.get(player_id).copied().unwrap_or(MIN_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with_players(players: &[&str]) -> Room {
        let now = SystemTime::now();
        let mut room = Room::new("123456".into(), players[0].to_string(), 6, now);
        for p in &players[1..] {
            room.players.push(p.to_string());
            room.scores.insert(p.to_string(), MIN_SCORE);
        }
        room
    }

    #[test]
    fn new_room_satisfies_creation_invariants() {
        let room = Room::new("654321".into(), "host".into(), 6, SystemTime::now());
        assert_eq!(room.game_state, GameState::Waiting);
        assert_eq!(room.players, vec!["host".to_string()]);
        assert_eq!(room.scores.get("host"), Some(&0));
        assert_eq!(room.scores.len(), 1);
        assert!(room.active_challenge.is_none());
        assert!(room.host.is_online);
    }

    #[test]
    fn temporary_host_is_drawn_from_remaining_members() {
        let room = room_with_players(&["host", "a", "b"]);
        for _ in 0..32 {
            let pick = room.pick_temporary_host().expect("candidates available");
            assert!(pick == "a" || pick == "b");
        }
    }

    #[test]
    fn temporary_host_is_none_when_host_is_alone() {
        let room = room_with_players(&["host"]);
        assert_eq!(room.pick_temporary_host(), None);
    }
}
