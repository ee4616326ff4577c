//! Business logic powering the room REST routes: creation, membership, and
//! the host-only game start.

use std::time::SystemTime;

use rand::Rng;
use tracing::{debug, info};

use crate::{
    dao::models::RoomPatch,
    dto::room::RoomSnapshot,
    error::ServiceError,
    services::{failover, sse_events},
    state::{
        SharedState,
        room::{GameState, MIN_SCORE, Room},
        state_machine::{RoomEvent, transition},
    },
};

/// How many random codes we try before giving up on a collision streak.
const CODE_ATTEMPTS: usize = 16;

/// Open a new room hosted by `host_id` and return its initial snapshot.
pub async fn create_room(
    state: &SharedState,
    host_id: String,
    max_players: Option<usize>,
) -> Result<RoomSnapshot, ServiceError> {
    let store = state.require_room_store().await?;
    let max_players = max_players.unwrap_or(state.config().default_max_players());
    if max_players < 2 {
        return Err(ServiceError::InvalidInput(
            "max_players must be at least 2".into(),
        ));
    }

    let code = allocate_code(state).await?;
    let room = Room::new(code.clone(), host_id, max_players, SystemTime::now());
    store.create_room(room.clone()).await?;

    info!(code, host = %room.host.id, "room created");
    Ok(RoomSnapshot::from(&room))
}

/// Fetch a room, settling any grace window that expired while nobody was
/// looking. A read by the disconnected host doubles as a reclaim attempt.
pub async fn get_room(
    state: &SharedState,
    code: &str,
    player_id: Option<&str>,
) -> Result<RoomSnapshot, ServiceError> {
    let room = find_room(state, code).await?;
    let now = SystemTime::now();

    let room = match player_id {
        Some(pid) if room.game_state == GameState::Paused && room.is_host(pid) => {
            failover::reclaim(state, code, pid, now).await?
        }
        _ => failover::reconcile(state, room, now).await?,
    };
    Ok(RoomSnapshot::from(&room))
}

/// Add a player to a room, or hand back the current snapshot when they are
/// already a member.
pub async fn join_room(
    state: &SharedState,
    code: &str,
    player_id: String,
) -> Result<RoomSnapshot, ServiceError> {
    let store = state.require_room_store().await?;
    let room = find_room(state, code).await?;

    if room.game_state == GameState::Ended {
        return Err(ServiceError::NotFound(format!("room `{code}` has ended")));
    }

    if room.is_member(&player_id) {
        debug!(code, player = %player_id, "join is a no-op; already a member");
        return Ok(RoomSnapshot::from(&room));
    }

    if room.players.len() >= room.max_players {
        return Err(ServiceError::Full(code.to_owned()));
    }

    let mut players = room.players.clone();
    players.push(player_id.clone());

    let patch = RoomPatch {
        players: Some(players),
        // A returning player keeps their previous tally; only a first join
        // seeds the entry.
        score: (!room.scores.contains_key(&player_id))
            .then(|| (player_id.clone(), MIN_SCORE)),
        ..Default::default()
    };

    let updated = apply_patch(state, &store, code, patch).await?;
    info!(code, player = %player_id, "player joined");
    Ok(RoomSnapshot::from(&updated))
}

/// Remove a player from a room. A departing host opens the grace window; the
/// last member out ends the room.
pub async fn leave_room(
    state: &SharedState,
    code: &str,
    player_id: String,
) -> Result<RoomSnapshot, ServiceError> {
    let store = state.require_room_store().await?;
    let room = find_room(state, code).await?;

    if !room.is_member(&player_id) {
        debug!(code, player = %player_id, "leave is a no-op; not a member");
        return Ok(RoomSnapshot::from(&room));
    }

    if room.players.len() == 1 {
        let next = transition(room.game_state, RoomEvent::CloseRoom)?;
        let patch = RoomPatch {
            game_state: Some(next),
            players: Some(Vec::new()),
            active_challenge: Some(None),
            temporary_host: Some(None),
            grace_deadline: Some(None),
            ..Default::default()
        };
        let updated = apply_patch(state, &store, code, patch).await?;
        sse_events::broadcast_room_closed(state, code);
        info!(code, "last member left; room ended");
        return Ok(RoomSnapshot::from(&updated));
    }

    if room.is_host(&player_id) {
        let updated = failover::host_disconnect(state, room, SystemTime::now()).await?;
        return Ok(RoomSnapshot::from(&updated));
    }

    let players: Vec<_> = room
        .players
        .iter()
        .filter(|p| **p != player_id)
        .cloned()
        .collect();

    // A leaving temporary-host candidate forces a reselection among whoever
    // remains.
    let temporary_host = if room.temporary_host.as_deref() == Some(player_id.as_str()) {
        let remaining: Vec<_> = players
            .iter()
            .filter(|p| **p != room.host.id)
            .cloned()
            .collect();
        Some(pick_among(&remaining))
    } else {
        None
    };

    let patch = RoomPatch {
        players: Some(players),
        temporary_host,
        ..Default::default()
    };

    let updated = apply_patch(state, &store, code, patch).await?;
    info!(code, player = %player_id, "player left");
    Ok(RoomSnapshot::from(&updated))
}

/// Start the game. Only the host may do this, and only from the waiting
/// state.
pub async fn start_game(
    state: &SharedState,
    code: &str,
    player_id: &str,
) -> Result<RoomSnapshot, ServiceError> {
    let store = state.require_room_store().await?;
    let room = find_room(state, code).await?;

    if !room.is_host(player_id) {
        return Err(ServiceError::PermissionDenied(
            "only the host can start the game".into(),
        ));
    }

    let next = transition(room.game_state, RoomEvent::StartGame)?;
    let patch = RoomPatch {
        game_state: Some(next),
        host_last_active: Some(SystemTime::now()),
        ..Default::default()
    };

    let updated = apply_patch(state, &store, code, patch).await?;
    info!(code, "game started");
    Ok(RoomSnapshot::from(&updated))
}

/// Read a room or fail with not-found.
pub async fn find_room(state: &SharedState, code: &str) -> Result<Room, ServiceError> {
    let store = state.require_room_store().await?;
    store
        .find_room(code.to_owned())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room `{code}` not found")))
}

/// Apply a patch, broadcast the merged snapshot, and return it.
pub(crate) async fn apply_patch(
    state: &SharedState,
    store: &std::sync::Arc<dyn crate::dao::room_store::RoomStore>,
    code: &str,
    patch: RoomPatch,
) -> Result<Room, ServiceError> {
    let updated = store
        .update_room(code.to_owned(), patch)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room `{code}` not found")))?;
    sse_events::broadcast_room_snapshot(state, &updated);
    Ok(updated)
}

fn pick_among(candidates: &[String]) -> Option<String> {
    use rand::seq::IndexedRandom;
    candidates.choose(&mut rand::rng()).cloned()
}

/// Draw fresh 6-digit codes until one is unclaimed.
async fn allocate_code(state: &SharedState) -> Result<String, ServiceError> {
    let store = state.require_room_store().await?;
    for _ in 0..CODE_ATTEMPTS {
        let code = format!("{:06}", rand::rng().random_range(0..1_000_000u32));
        if store.find_room(code.clone()).await?.is_none() {
            return Ok(code);
        }
    }
    Err(ServiceError::InvalidState(
        "could not allocate a free room code".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_among_empty_is_none() {
        assert_eq!(pick_among(&[]), None);
    }

    #[test]
    fn pick_among_draws_a_candidate() {
        let candidates = vec!["a".to_string(), "b".to_string()];
        for _ in 0..16 {
            let pick = pick_among(&candidates).expect("non-empty");
            assert!(candidates.contains(&pick));
        }
    }
}
