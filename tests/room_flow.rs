//! End-to-end exercises of the room lifecycle against the in-memory store:
//! creation, membership, challenge dispatch, scoring, and host failover.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use futures::future::BoxFuture;

use key_quest_back::{
    config::AppConfig,
    dao::{
        content::{ChallengeContent, ContentError},
        models::RoomPatch,
        room_store::memory::MemoryRoomStore,
    },
    error::ServiceError,
    services::{challenge_service, failover, room_service, score_service},
    state::{
        AppState, SharedState,
        room::{ChallengeKind, ChallengePayload, GameState, ImagePayload, PromptPayload, TriviaPayload},
    },
};

struct StubContent;

impl ChallengeContent for StubContent {
    fn fetch(
        &self,
        kind: ChallengeKind,
    ) -> BoxFuture<'static, Result<ChallengePayload, ContentError>> {
        let payload = match kind {
            ChallengeKind::Trivia => ChallengePayload::Trivia(TriviaPayload {
                question: "Which planet is closest to the sun?".into(),
                options: vec!["Venus".into(), "Mercury".into(), "Mars".into()],
                correct_answer_index: 1,
            }),
            ChallengeKind::Image => ChallengePayload::Image(ImagePayload {
                url: "https://content.example/images/42.png".into(),
                description: "A landmark to guess".into(),
            }),
            _ => ChallengePayload::Prompt(PromptPayload {
                text: "Do the thing".into(),
                category: None,
            }),
        };
        Box::pin(async move { Ok(payload) })
    }
}

async fn test_state() -> SharedState {
    let state = AppState::new(AppConfig::default(), Arc::new(StubContent));
    state
        .install_room_store(Arc::new(MemoryRoomStore::new()))
        .await;
    state
}

/// Create a room and move extra players into it.
async fn room_with_players(state: &SharedState, host: &str, others: &[&str]) -> String {
    let snapshot = room_service::create_room(state, host.to_string(), None)
        .await
        .expect("room created");
    for player in others {
        room_service::join_room(state, &snapshot.code, player.to_string())
            .await
            .expect("player joined");
    }
    snapshot.code
}

#[tokio::test]
async fn created_room_waits_with_host_as_only_member() {
    let state = test_state().await;
    let snapshot = room_service::create_room(&state, "host".into(), None)
        .await
        .unwrap();

    assert_eq!(snapshot.code.len(), 6);
    assert!(snapshot.code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(snapshot.game_state, GameState::Waiting);
    assert_eq!(snapshot.players, vec!["host".to_string()]);
    assert_eq!(snapshot.scores.get("host"), Some(&0));
    assert!(snapshot.active_challenge.is_none());
    assert!(snapshot.host.is_online);

    let reread = room_service::get_room(&state, &snapshot.code, None).await.unwrap();
    assert_eq!(reread.players, snapshot.players);
}

#[tokio::test]
async fn join_rejects_the_seventh_player_without_mutation() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a", "b", "c", "d", "e"]).await;

    let err = room_service::join_room(&state, &code, "late".into())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Full(_)));

    let room = room_service::get_room(&state, &code, None).await.unwrap();
    assert_eq!(room.players.len(), 6);
    assert!(!room.players.contains(&"late".to_string()));
    assert!(!room.scores.contains_key("late"));
}

#[tokio::test]
async fn rejoining_member_gets_the_snapshot_back_unchanged() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;

    let room = room_service::join_room(&state, &code, "a".into()).await.unwrap();
    assert_eq!(room.players.len(), 2);
    assert_eq!(room.scores.len(), 2);
}

#[tokio::test]
async fn only_the_host_can_start_the_game() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;

    let err = room_service::start_game(&state, &code, "a").await.unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let room = room_service::start_game(&state, &code, "host").await.unwrap();
    assert_eq!(room.game_state, GameState::Started);
}

#[tokio::test]
async fn scan_dispatches_a_timed_challenge() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();

    let room = challenge_service::scan(&state, &code, "a", "https://game.example/trivia/7")
        .await
        .unwrap();

    assert_eq!(room.game_state, GameState::Playing);
    let challenge = room.active_challenge.expect("challenge active");
    assert_eq!(challenge.kind, ChallengeKind::Trivia);
    assert_eq!(challenge.current_player, "a");
    assert!(challenge.deadline.is_some());

    // A second scan while one is in play is rejected.
    let err = challenge_service::scan(&state, &code, "host", "https://game.example/reto/1")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[tokio::test]
async fn self_paced_challenges_carry_no_deadline() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();

    let room = challenge_service::scan(&state, &code, "a", "https://game.example/image/3")
        .await
        .unwrap();
    let challenge = room.active_challenge.expect("challenge active");
    assert_eq!(challenge.kind, ChallengeKind::Image);
    assert!(challenge.deadline.is_none());
}

#[tokio::test]
async fn unrecognized_scan_content_is_rejected() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();

    let err = challenge_service::scan(&state, &code, "a", "https://game.example/shop")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidChallengeCode));

    let room = room_service::get_room(&state, &code, None).await.unwrap();
    assert_eq!(room.game_state, GameState::Started);
}

#[tokio::test]
async fn resolve_settles_once_and_stays_idempotent() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();
    challenge_service::scan(&state, &code, "a", "https://game.example/reto/4")
        .await
        .unwrap();

    let first = challenge_service::resolve(&state, &code, "host").await.unwrap();
    assert_eq!(first.game_state, GameState::Started);
    assert!(first.active_challenge.is_none());

    // The losing racer observes the settled room and changes nothing.
    let second = challenge_service::resolve(&state, &code, "a").await.unwrap();
    assert_eq!(second.game_state, GameState::Started);
}

#[tokio::test]
async fn trivia_records_only_the_first_answer_from_the_current_player() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();
    challenge_service::scan(&state, &code, "a", "https://game.example/trivia/7")
        .await
        .unwrap();

    let err = challenge_service::answer_trivia(&state, &code, "host", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let room = challenge_service::answer_trivia(&state, &code, "a", 1).await.unwrap();
    let answer = room
        .active_challenge
        .expect("challenge active")
        .last_answer
        .expect("answer recorded");
    assert_eq!(answer.player, "a");
    assert!(answer.correct);

    // Second attempt is a no-op; the first answer stands.
    let room = challenge_service::answer_trivia(&state, &code, "a", 0).await.unwrap();
    let answer = room
        .active_challenge
        .expect("challenge active")
        .last_answer
        .expect("answer kept");
    assert_eq!(answer.selected_index, 1);
}

#[tokio::test]
async fn trivia_answer_index_must_be_in_range() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();
    challenge_service::scan(&state, &code, "a", "https://game.example/trivia/7")
        .await
        .unwrap();

    let err = challenge_service::answer_trivia(&state, &code, "a", 9)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn host_leave_pauses_and_reclaim_within_grace_restores() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a", "b"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();

    let room = room_service::leave_room(&state, &code, "host".into()).await.unwrap();
    assert_eq!(room.game_state, GameState::Paused);
    assert!(!room.host.is_online);
    assert!(room.grace_deadline.is_some());
    // The host seat is vacated from the member list for the pause.
    assert!(!room.players.contains(&"host".to_string()));
    assert_eq!(room.players.len(), 2);
    let candidate = room.temporary_host.clone().expect("candidate chosen");
    assert!(candidate == "a" || candidate == "b");

    let room = failover::reclaim(&state, &code, "host", SystemTime::now())
        .await
        .unwrap();
    assert_eq!(room.game_state, GameState::Started);
    assert!(room.host.is_online);
    assert!(room.players.contains(&"host".to_string()));
    assert_eq!(room.players.len(), 3);
    assert_eq!(room.temporary_host, None);
    assert_eq!(room.grace_deadline, None);
}

#[tokio::test]
async fn last_real_member_leaving_a_paused_room_ends_it() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();
    room_service::leave_room(&state, &code, "host".into()).await.unwrap();

    let room = room_service::leave_room(&state, &code, "a".into()).await.unwrap();
    assert_eq!(room.game_state, GameState::Ended);
    assert!(room.players.is_empty());
}

#[tokio::test]
async fn host_read_with_identity_reclaims_the_paused_room() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();
    room_service::leave_room(&state, &code, "host".into()).await.unwrap();

    // An anonymous read leaves the pause in place.
    let room = room_service::get_room(&state, &code, None).await.unwrap();
    assert_eq!(room.game_state, GameState::Paused);

    let room = room_service::get_room(&state, &code, Some("host")).await.unwrap();
    assert_eq!(room.game_state, GameState::Started);
    assert!(room.host.is_online);
    assert!(room.players.contains(&"host".to_string()));
}

#[tokio::test]
async fn host_disconnect_abandons_the_active_challenge() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();
    challenge_service::scan(&state, &code, "a", "https://game.example/riddle/2")
        .await
        .unwrap();

    let room = room_service::leave_room(&state, &code, "host".into()).await.unwrap();
    assert_eq!(room.game_state, GameState::Paused);
    assert!(room.active_challenge.is_none());
}

#[tokio::test]
async fn expired_grace_window_promotes_the_candidate_on_read() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();
    room_service::leave_room(&state, &code, "host".into()).await.unwrap();

    let room = room_service::find_room(&state, &code).await.unwrap();
    let later = SystemTime::now() + Duration::from_secs(180);
    let room = failover::settle_expiry(&state, room, later).await.unwrap();

    assert_eq!(room.game_state, GameState::Started);
    assert_eq!(room.host.id, "a");
    assert!(room.host.is_online);
    assert_eq!(room.temporary_host, None);
    assert_eq!(room.grace_deadline, None);
}

#[tokio::test]
async fn reclaim_after_the_deadline_yields_to_the_promotion() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();
    room_service::leave_room(&state, &code, "host".into()).await.unwrap();

    let later = SystemTime::now() + Duration::from_secs(180);
    let room = failover::reclaim(&state, &code, "host", later).await.unwrap();

    assert_eq!(room.game_state, GameState::Started);
    assert_eq!(room.host.id, "a");
}

#[tokio::test]
async fn paused_room_without_candidate_stays_paused() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &[]).await;

    // Shape the document directly: paused, window long expired, nobody left
    // to promote.
    let store = state.room_store().await.unwrap();
    let past = SystemTime::now() - Duration::from_secs(300);
    store
        .update_room(
            code.clone(),
            RoomPatch {
                game_state: Some(GameState::Paused),
                host_is_online: Some(false),
                grace_deadline: Some(Some(past)),
                temporary_host: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let room = room_service::find_room(&state, &code).await.unwrap();
    let room = failover::settle_expiry(&state, room, SystemTime::now())
        .await
        .unwrap();
    assert_eq!(room.game_state, GameState::Paused);
}

#[tokio::test]
async fn departing_candidate_forces_a_reselection() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a", "b"]).await;
    room_service::start_game(&state, &code, "host").await.unwrap();

    let room = room_service::leave_room(&state, &code, "host".into()).await.unwrap();
    let candidate = room.temporary_host.clone().expect("candidate chosen");
    let other = if candidate == "a" { "b" } else { "a" };

    let room = room_service::leave_room(&state, &code, candidate).await.unwrap();
    assert_eq!(room.temporary_host.as_deref(), Some(other));
}

#[tokio::test]
async fn last_member_out_ends_the_room() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &[]).await;

    let room = room_service::leave_room(&state, &code, "host".into()).await.unwrap();
    assert_eq!(room.game_state, GameState::Ended);
    assert!(room.players.is_empty());
}

#[tokio::test]
async fn ended_room_accepts_no_new_members() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &[]).await;
    room_service::leave_room(&state, &code, "host".into()).await.unwrap();

    let err = room_service::join_room(&state, &code, "late".into())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn score_adjustments_are_host_only_and_clamped() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;

    let err = score_service::adjust_score(&state, &code, "a", "a", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));

    let update = score_service::adjust_score(&state, &code, "host", "a", -1)
        .await
        .unwrap();
    assert_eq!(update.score, 0);

    let update = score_service::adjust_score(&state, &code, "host", "a", 3).await.unwrap();
    assert_eq!(update.score, 3);

    let update = score_service::adjust_score(&state, &code, "host", "a", 5).await.unwrap();
    assert_eq!(update.score, 4);

    let err = score_service::adjust_score(&state, &code, "host", "ghost", 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn departed_player_keeps_an_adjustable_ledger_entry() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &["a"]).await;
    score_service::adjust_score(&state, &code, "host", "a", 2).await.unwrap();

    room_service::leave_room(&state, &code, "a".into()).await.unwrap();
    let room = room_service::get_room(&state, &code, None).await.unwrap();
    assert_eq!(room.scores.get("a"), Some(&2));

    let update = score_service::adjust_score(&state, &code, "host", "a", 1).await.unwrap();
    assert_eq!(update.score, 3);
}

#[tokio::test]
async fn watchers_receive_every_committed_snapshot() {
    let state = test_state().await;
    let code = room_with_players(&state, "host", &[]).await;

    let mut receiver = state.room_events().subscribe(&code);
    room_service::join_room(&state, &code, "a".into()).await.unwrap();

    let event = receiver.recv().await.expect("broadcast received");
    assert_eq!(event.event.as_deref(), Some("room.updated"));
    assert!(event.data.contains("\"a\""));
}
