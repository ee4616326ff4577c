//! Host failover policy: the grace window opened when the host disconnects,
//! the reclaim path for a returning host, and the promotion of a temporary
//! host once the window closes.
//!
//! Expiry is an observation, not a privileged background job: a spawned timer
//! task, a later read, or an explicit reconnect may each settle the window,
//! and every path re-checks the latest committed snapshot so the settlement
//! happens at most once.

use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::{
    dao::models::RoomPatch,
    error::ServiceError,
    services::room_service,
    state::{
        SharedState,
        room::{GameState, Host, Room},
        state_machine::{RoomEvent, transition},
    },
};

/// Open the grace window after the host left: pick a candidate, pause the
/// game, and arm the expiry timer.
///
/// Any challenge on screen is abandoned; the paused room holds no challenge
/// sub-state.
pub async fn host_disconnect(
    state: &SharedState,
    room: Room,
    now: SystemTime,
) -> Result<Room, ServiceError> {
    let store = state.require_room_store().await?;
    let next = transition(room.game_state, RoomEvent::HostDisconnect)?;

    let candidate = room.pick_temporary_host();
    let deadline = now + state.config().grace_period();

    // The host seat is vacated from the member list for the duration of the
    // window; reclaim puts it back.
    let patch = RoomPatch {
        game_state: Some(next),
        players: Some(room.members_without_host()),
        host_is_online: Some(false),
        host_disconnected_at: Some(Some(now)),
        temporary_host: Some(candidate.clone()),
        grace_deadline: Some(Some(deadline)),
        active_challenge: Some(None),
        ..Default::default()
    };

    let updated = room_service::apply_patch(state, &store, &room.code, patch).await?;
    info!(
        code = %room.code,
        candidate = candidate.as_deref().unwrap_or("<none>"),
        "host disconnected; grace window open"
    );

    spawn_grace_expiry(state.clone(), room.code.clone(), deadline);
    Ok(updated)
}

/// Original host returns within the grace window: restore the seat and
/// resume. Past the deadline this is a no-op returning the current snapshot.
pub async fn reclaim(
    state: &SharedState,
    code: &str,
    player_id: &str,
    now: SystemTime,
) -> Result<Room, ServiceError> {
    let store = state.require_room_store().await?;
    let room = room_service::find_room(state, code).await?;

    if room.game_state != GameState::Paused {
        debug!(code, "reclaim is a no-op; room is not paused");
        return Ok(room);
    }
    if !room.is_host(player_id) {
        return Err(ServiceError::PermissionDenied(
            "only the disconnected host can reclaim the room".into(),
        ));
    }
    if room.grace_deadline.is_some_and(|deadline| now >= deadline) {
        // Window already closed; settlement belongs to the promotion path.
        return settle_expiry(state, room, now).await;
    }

    let next = transition(room.game_state, RoomEvent::HostReclaim)?;

    let mut players = room.players.clone();
    if !players.iter().any(|p| *p == room.host.id) {
        players.insert(0, room.host.id.clone());
    }

    let patch = RoomPatch {
        game_state: Some(next),
        players: Some(players),
        host_is_online: Some(true),
        host_last_active: Some(now),
        host_disconnected_at: Some(None),
        temporary_host: Some(None),
        grace_deadline: Some(None),
        ..Default::default()
    };

    let updated = room_service::apply_patch(state, &store, code, patch).await?;
    info!(code, host = player_id, "host reclaimed the room");
    Ok(updated)
}

/// Settle an expired grace window against the latest snapshot. Idempotent:
/// a room no longer paused, or whose deadline moved, is left alone.
pub async fn settle_expiry(
    state: &SharedState,
    room: Room,
    now: SystemTime,
) -> Result<Room, ServiceError> {
    let store = state.require_room_store().await?;

    if room.game_state != GameState::Paused {
        return Ok(room);
    }
    let Some(deadline) = room.grace_deadline else {
        return Ok(room);
    };
    if now < deadline {
        return Ok(room);
    }

    let Some(candidate) = room.temporary_host.clone() else {
        // Nobody to promote; the room stays paused until someone joins the
        // host seat again or the room is abandoned.
        debug!(code = %room.code, "grace window expired with no candidate");
        return Ok(room);
    };

    let next = transition(room.game_state, RoomEvent::PromoteTemporaryHost)?;
    let patch = RoomPatch {
        game_state: Some(next),
        host: Some(Host {
            id: candidate.clone(),
            is_online: true,
            last_active: now,
            disconnected_at: None,
        }),
        temporary_host: Some(None),
        grace_deadline: Some(None),
        ..Default::default()
    };

    let updated = room_service::apply_patch(state, &store, &room.code, patch).await?;
    info!(code = %room.code, host = %candidate, "temporary host promoted");
    Ok(updated)
}

/// Fold a possibly expired grace window into a freshly read snapshot.
pub async fn reconcile(
    state: &SharedState,
    room: Room,
    now: SystemTime,
) -> Result<Room, ServiceError> {
    if room.game_state == GameState::Paused {
        settle_expiry(state, room, now).await
    } else {
        Ok(room)
    }
}

/// Arm a timer that settles the grace window shortly after `deadline`.
fn spawn_grace_expiry(state: SharedState, code: String, deadline: SystemTime) {
    tokio::spawn(async move {
        let wait = deadline
            .duration_since(SystemTime::now())
            .unwrap_or_default();
        tokio::time::sleep(wait).await;

        let room = match room_service::find_room(&state, &code).await {
            Ok(room) => room,
            Err(ServiceError::NotFound(_)) => return,
            Err(err) => {
                warn!(code, error = %err, "grace expiry timer could not read room");
                return;
            }
        };

        if let Err(err) = settle_expiry(&state, room, SystemTime::now()).await {
            warn!(code, error = %err, "grace expiry settlement failed");
        }
    });
}
