//! DTO definitions for the challenge endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::format_system_time,
    state::room::{ActiveChallenge, ChallengeKind, ChallengePayload, LastAnswer, PlayerId},
};

/// Payload submitted after a player scans a QR code.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ScanRequest {
    /// Identifier of the scanning player.
    #[validate(length(min = 1, message = "player_id must not be empty"))]
    pub player_id: PlayerId,
    /// Raw decoded QR content.
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
}

/// A trivia answer from the current player.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TriviaAnswerRequest {
    /// Identifier of the answering player.
    #[validate(length(min = 1, message = "player_id must not be empty"))]
    pub player_id: PlayerId,
    /// Zero-based index of the chosen option.
    pub selected_index: usize,
}

/// Explicit request to close the active challenge and return to play.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResolveRequest {
    /// Identifier of the resolving player.
    #[validate(length(min = 1, message = "player_id must not be empty"))]
    pub player_id: PlayerId,
}

/// Recorded trivia answer exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct LastAnswerSnapshot {
    pub player: PlayerId,
    pub selected_index: usize,
    pub correct: bool,
}

impl From<&LastAnswer> for LastAnswerSnapshot {
    fn from(answer: &LastAnswer) -> Self {
        Self {
            player: answer.player.clone(),
            selected_index: answer.selected_index,
            correct: answer.correct,
        }
    }
}

/// Projection of the challenge currently in play.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveChallengeSnapshot {
    pub id: Uuid,
    pub kind: ChallengeKind,
    pub payload: ChallengePayload,
    pub current_player: PlayerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_answer: Option<LastAnswerSnapshot>,
}

impl From<&ActiveChallenge> for ActiveChallengeSnapshot {
    fn from(challenge: &ActiveChallenge) -> Self {
        Self {
            id: challenge.id,
            kind: challenge.kind,
            payload: challenge.payload.clone(),
            current_player: challenge.current_player.clone(),
            deadline: challenge.deadline.map(format_system_time),
            last_answer: challenge.last_answer.as_ref().map(Into::into),
        }
    }
}
