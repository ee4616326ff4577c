//! Challenge dispatch: classifying scanned QR content, fetching its payload,
//! and the timers that pull the room back out of the challenge screen.

use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::models::RoomPatch,
    dto::room::RoomSnapshot,
    error::ServiceError,
    services::room_service,
    state::{
        SharedState,
        room::{ActiveChallenge, ChallengeKind, GameState, LastAnswer, Room},
        state_machine::{RoomEvent, transition},
    },
};

/// Ordered substring markers mapped to challenge kinds. Earlier entries win,
/// which is what keeps `/retoRedes` from being swallowed by `/reto`.
const MARKERS: [(&str, ChallengeKind); 6] = [
    ("/trivia", ChallengeKind::Trivia),
    ("/riddle", ChallengeKind::Riddle),
    ("/mimica", ChallengeKind::Charade),
    ("/image", ChallengeKind::Image),
    ("/retoRedes", ChallengeKind::SocialDare),
    ("/reto", ChallengeKind::PlainChallenge),
];

/// Classify raw QR content into a challenge kind, or `None` when no marker
/// matches.
pub fn classify(content: &str) -> Option<ChallengeKind> {
    MARKERS
        .iter()
        .find(|(marker, _)| content.contains(marker))
        .map(|(_, kind)| *kind)
}

fn deadline_for(state: &SharedState, kind: ChallengeKind, now: SystemTime) -> Option<SystemTime> {
    if kind.is_self_paced() {
        return None;
    }
    let window = match kind {
        ChallengeKind::PlainChallenge => state.config().plain_challenge(),
        _ => state.config().timed_challenge(),
    };
    Some(now + window)
}

/// Dispatch the challenge a member scanned.
///
/// The payload fetch happens between two reads of the room: the second read
/// re-validates the scanning preconditions so a slower fetch loses cleanly to
/// whatever happened to the room in the meantime.
pub async fn scan(
    state: &SharedState,
    code: &str,
    player_id: &str,
    content: &str,
) -> Result<RoomSnapshot, ServiceError> {
    let store = state.require_room_store().await?;
    let room = room_service::find_room(state, code).await?;

    ensure_scan_allowed(&room, player_id)?;
    let kind = classify(content).ok_or(ServiceError::InvalidChallengeCode)?;

    let payload = state.content().fetch(kind).await?;

    // Re-read after the fetch; the room may have paused or ended meanwhile.
    let room = room_service::find_room(state, code).await?;
    ensure_scan_allowed(&room, player_id)?;

    let now = SystemTime::now();
    let challenge = ActiveChallenge {
        id: Uuid::new_v4(),
        kind,
        payload,
        current_player: player_id.to_owned(),
        deadline: deadline_for(state, kind, now),
        last_answer: None,
    };

    let next = transition(room.game_state, RoomEvent::ScanChallenge)?;
    let patch = RoomPatch {
        game_state: Some(next),
        active_challenge: Some(Some(challenge.clone())),
        ..Default::default()
    };

    let updated = room_service::apply_patch(state, &store, code, patch).await?;
    info!(code, player = player_id, kind = %kind, "challenge dispatched");

    if let Some(deadline) = challenge.deadline {
        spawn_timeout(state.clone(), code.to_owned(), challenge.id, deadline);
    }

    Ok(RoomSnapshot::from(&updated))
}

/// Record the current player's trivia answer. First answer wins; anything
/// after it is a no-op returning the current snapshot.
pub async fn answer_trivia(
    state: &SharedState,
    code: &str,
    player_id: &str,
    selected_index: usize,
) -> Result<RoomSnapshot, ServiceError> {
    let store = state.require_room_store().await?;
    let room = room_service::find_room(state, code).await?;

    let Some(challenge) = room.active_challenge.clone() else {
        return Err(ServiceError::InvalidState(
            "no challenge is active".into(),
        ));
    };
    if challenge.kind != ChallengeKind::Trivia {
        return Err(ServiceError::InvalidState(
            "active challenge is not a trivia".into(),
        ));
    }
    if challenge.current_player != player_id {
        return Err(ServiceError::PermissionDenied(
            "only the scanning player can answer".into(),
        ));
    }
    if challenge.last_answer.is_some() {
        debug!(code, "answer is a no-op; one is already recorded");
        return Ok(RoomSnapshot::from(&room));
    }

    let correct = match &challenge.payload {
        crate::state::room::ChallengePayload::Trivia(trivia) => {
            if selected_index >= trivia.options.len() {
                return Err(ServiceError::InvalidInput(format!(
                    "selected_index {selected_index} is out of range"
                )));
            }
            selected_index == trivia.correct_answer_index
        }
        _ => {
            return Err(ServiceError::InvalidState(
                "trivia challenge carries no trivia payload".into(),
            ));
        }
    };

    let answered = ActiveChallenge {
        last_answer: Some(LastAnswer {
            player: player_id.to_owned(),
            selected_index,
            correct,
        }),
        ..challenge.clone()
    };

    let patch = RoomPatch {
        active_challenge: Some(Some(answered)),
        ..Default::default()
    };

    let updated = room_service::apply_patch(state, &store, code, patch).await?;
    info!(code, player = player_id, correct, "trivia answer recorded");

    // Leave the outcome on screen briefly before returning to play.
    spawn_delayed_resolve(
        state.clone(),
        code.to_owned(),
        challenge.id,
        state.config().trivia_reveal_delay(),
    );

    Ok(RoomSnapshot::from(&updated))
}

/// Explicitly close the active challenge. Any member may call this; racing
/// calls settle once and the rest are no-ops.
pub async fn resolve(
    state: &SharedState,
    code: &str,
    player_id: &str,
) -> Result<RoomSnapshot, ServiceError> {
    let room = room_service::find_room(state, code).await?;
    if !room.is_member(player_id) {
        return Err(ServiceError::PermissionDenied(
            "only room members can resolve a challenge".into(),
        ));
    }

    let updated = resolve_challenge(state, code, None).await?;
    Ok(RoomSnapshot::from(&updated))
}

/// Close the active challenge if it is still the expected one.
///
/// Idempotent against the latest snapshot: a room that already moved on, or
/// whose active challenge no longer matches `expected`, is left untouched.
pub async fn resolve_challenge(
    state: &SharedState,
    code: &str,
    expected: Option<Uuid>,
) -> Result<Room, ServiceError> {
    let store = state.require_room_store().await?;
    let room = room_service::find_room(state, code).await?;

    if room.game_state != GameState::Playing {
        debug!(code, "resolve is a no-op; no challenge in play");
        return Ok(room);
    }
    let Some(challenge) = &room.active_challenge else {
        debug!(code, "resolve is a no-op; challenge already cleared");
        return Ok(room);
    };
    if expected.is_some_and(|id| id != challenge.id) {
        debug!(code, "resolve is a no-op; challenge was superseded");
        return Ok(room);
    }

    let next = transition(room.game_state, RoomEvent::ResolveChallenge)?;
    let patch = RoomPatch {
        game_state: Some(next),
        active_challenge: Some(None),
        ..Default::default()
    };

    let updated = room_service::apply_patch(state, &store, code, patch).await?;
    info!(code, "challenge resolved");
    Ok(updated)
}

fn ensure_scan_allowed(room: &Room, player_id: &str) -> Result<(), ServiceError> {
    if !room.is_member(player_id) {
        return Err(ServiceError::PermissionDenied(
            "only room members can scan challenges".into(),
        ));
    }
    if room.game_state != GameState::Started {
        return Err(ServiceError::InvalidState(format!(
            "scanning requires a running game without an active challenge, current state {:?}",
            room.game_state
        )));
    }
    Ok(())
}

/// Arm the deadline timer for a timed challenge. The challenge id pins the
/// timer to this dispatch; a successor challenge is never cleared by it.
fn spawn_timeout(state: SharedState, code: String, id: Uuid, deadline: SystemTime) {
    tokio::spawn(async move {
        let wait = deadline
            .duration_since(SystemTime::now())
            .unwrap_or_default();
        tokio::time::sleep(wait).await;

        if let Err(err) = resolve_challenge(&state, &code, Some(id)).await {
            match err {
                ServiceError::NotFound(_) => {}
                other => warn!(code, error = %other, "challenge timeout settlement failed"),
            }
        }
    });
}

fn spawn_delayed_resolve(state: SharedState, code: String, id: Uuid, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        if let Err(err) = resolve_challenge(&state, &code, Some(id)).await {
            match err {
                ServiceError::NotFound(_) => {}
                other => warn!(code, error = %other, "trivia reveal settlement failed"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_maps_every_marker() {
        assert_eq!(
            classify("https://game.example/trivia/7"),
            Some(ChallengeKind::Trivia)
        );
        assert_eq!(
            classify("https://game.example/riddle/2"),
            Some(ChallengeKind::Riddle)
        );
        assert_eq!(
            classify("https://game.example/mimica/9"),
            Some(ChallengeKind::Charade)
        );
        assert_eq!(
            classify("https://game.example/image/1"),
            Some(ChallengeKind::Image)
        );
        assert_eq!(
            classify("https://game.example/reto/4"),
            Some(ChallengeKind::PlainChallenge)
        );
    }

    #[test]
    fn social_dare_wins_over_plain_dare() {
        // "/retoRedes" also contains "/reto"; marker order decides.
        assert_eq!(
            classify("https://game.example/retoRedes/3"),
            Some(ChallengeKind::SocialDare)
        );
    }

    #[test]
    fn unrecognized_content_is_rejected() {
        assert_eq!(classify("https://game.example/shop"), None);
        assert_eq!(classify(""), None);
    }
}
