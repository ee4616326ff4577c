//! Host-managed score ledger. Keys live on a fixed scale and every
//! adjustment saturates silently at the bounds.

use tracing::info;

use crate::{
    dao::models::RoomPatch,
    dto::room::ScoreUpdateResponse,
    error::ServiceError,
    services::room_service,
    state::{
        SharedState,
        room::{MAX_SCORE, MIN_SCORE},
    },
};

/// Clamp `current + delta` to the key scale.
pub fn clamped_score(current: u8, delta: i8) -> u8 {
    let raw = i16::from(current) + i16::from(delta);
    raw.clamp(i16::from(MIN_SCORE), i16::from(MAX_SCORE)) as u8
}

/// Adjust a player's key count by a signed delta. Host only.
///
/// The write always happens, even when clamping makes it a no-op, so the
/// adjustment is visible to watchers as a fresh snapshot.
pub async fn adjust_score(
    state: &SharedState,
    code: &str,
    host_id: &str,
    player_id: &str,
    delta: i8,
) -> Result<ScoreUpdateResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let room = room_service::find_room(state, code).await?;

    if !room.is_host(host_id) {
        return Err(ServiceError::PermissionDenied(
            "only the host can adjust scores".into(),
        ));
    }
    // Departed players keep their ledger entry; a player who never joined
    // has nothing to adjust.
    if !room.is_member(player_id) && !room.scores.contains_key(player_id) {
        return Err(ServiceError::NotFound(format!(
            "player `{player_id}` has no score in room `{code}`"
        )));
    }

    let score = clamped_score(room.score_of(player_id), delta);
    let patch = RoomPatch {
        score: Some((player_id.to_owned(), score)),
        ..Default::default()
    };

    room_service::apply_patch(state, &store, code, patch).await?;
    info!(code, player = player_id, delta, score, "score adjusted");

    Ok(ScoreUpdateResponse {
        player_id: player_id.to_owned(),
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_saturates_at_the_floor() {
        assert_eq!(clamped_score(0, -1), 0);
        assert_eq!(clamped_score(1, -3), 0);
    }

    #[test]
    fn clamp_saturates_at_the_ceiling() {
        assert_eq!(clamped_score(4, 1), 4);
        assert_eq!(clamped_score(3, 5), 4);
    }

    #[test]
    fn clamp_passes_in_range_deltas_through() {
        assert_eq!(clamped_score(2, 1), 3);
        assert_eq!(clamped_score(2, -2), 0);
        assert_eq!(clamped_score(0, 4), 4);
    }
}
