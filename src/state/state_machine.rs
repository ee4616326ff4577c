//! Legal transitions between room lifecycle states.
//!
//! The table is pure: services validate an event against the latest stored
//! snapshot, then commit the resulting state together with its side fields in
//! a single atomic patch. Conditional transitions (timeout, grace expiry,
//! trivia reveal) stay idempotent because their precondition is re-checked
//! against the freshest document before every write, never against a cached
//! copy.

use thiserror::Error;

use crate::state::room::GameState;

/// Events that can move a room between lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    /// Host opens the game from the lobby.
    StartGame,
    /// A member scanned a code and a challenge was dispatched.
    ScanChallenge,
    /// The active challenge is cleared (advance, timeout, or trivia reveal).
    ResolveChallenge,
    /// The host left; the grace window opens.
    HostDisconnect,
    /// The original host returned within the grace window.
    HostReclaim,
    /// The grace window expired and a temporary host takes the seat.
    PromoteTemporaryHost,
    /// The last member left the room.
    CloseRoom,
}

/// Error returned when an event cannot be applied from the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while {from:?}")]
pub struct InvalidTransition {
    /// State the room was in.
    pub from: GameState,
    /// Event that was rejected.
    pub event: RoomEvent,
}

/// Compute the state an event leads to, or reject it.
pub fn transition(from: GameState, event: RoomEvent) -> Result<GameState, InvalidTransition> {
    use GameState::*;

    let next = match (from, event) {
        (Waiting, RoomEvent::StartGame) => Started,
        (Started, RoomEvent::ScanChallenge) => Playing,
        (Playing, RoomEvent::ResolveChallenge) => Started,
        // The pause overlay can open from any live state.
        (Waiting | Started | Playing, RoomEvent::HostDisconnect) => Paused,
        (Paused, RoomEvent::HostReclaim) => Started,
        (Paused, RoomEvent::PromoteTemporaryHost) => Started,
        // An emptied room closes regardless of where it was.
        (Waiting | Started | Playing | Paused, RoomEvent::CloseRoom) => Ended,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use GameState::*;

    #[test]
    fn happy_path_loops_between_started_and_playing() {
        assert_eq!(transition(Waiting, RoomEvent::StartGame), Ok(Started));
        assert_eq!(transition(Started, RoomEvent::ScanChallenge), Ok(Playing));
        assert_eq!(transition(Playing, RoomEvent::ResolveChallenge), Ok(Started));
        assert_eq!(transition(Started, RoomEvent::ScanChallenge), Ok(Playing));
    }

    #[test]
    fn pause_overlay_opens_from_any_live_state() {
        for from in [Waiting, Started, Playing] {
            assert_eq!(transition(from, RoomEvent::HostDisconnect), Ok(Paused));
        }
    }

    #[test]
    fn paused_room_resumes_via_reclaim_or_promotion() {
        assert_eq!(transition(Paused, RoomEvent::HostReclaim), Ok(Started));
        assert_eq!(
            transition(Paused, RoomEvent::PromoteTemporaryHost),
            Ok(Started)
        );
    }

    #[test]
    fn scanning_requires_started() {
        for from in [Waiting, Playing, Paused, Ended] {
            let err = transition(from, RoomEvent::ScanChallenge).unwrap_err();
            assert_eq!(err.from, from);
            assert_eq!(err.event, RoomEvent::ScanChallenge);
        }
    }

    #[test]
    fn start_game_rejected_outside_the_lobby() {
        for from in [Started, Playing, Paused, Ended] {
            assert!(transition(from, RoomEvent::StartGame).is_err());
        }
    }

    #[test]
    fn ended_is_terminal() {
        for event in [
            RoomEvent::StartGame,
            RoomEvent::ScanChallenge,
            RoomEvent::ResolveChallenge,
            RoomEvent::HostDisconnect,
            RoomEvent::HostReclaim,
            RoomEvent::PromoteTemporaryHost,
            RoomEvent::CloseRoom,
        ] {
            assert!(transition(Ended, event).is_err());
        }
    }
}
