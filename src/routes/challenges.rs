use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use validator::Validate;

use crate::{
    dto::{
        challenge::{ResolveRequest, ScanRequest, TriviaAnswerRequest},
        room::RoomSnapshot,
        validation::validate_room_code,
    },
    error::AppError,
    services::challenge_service,
    state::SharedState,
};

/// Routes handling the challenge sub-state of a room.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms/{code}/challenge/scan", post(scan))
        .route("/rooms/{code}/challenge/answer", post(answer))
        .route("/rooms/{code}/challenge/resolve", post(resolve))
}

fn checked_code(code: &str) -> Result<&str, AppError> {
    validate_room_code(code)
        .map_err(|err| AppError::BadRequest(format!("invalid room code: {err}")))?;
    Ok(code)
}

/// Dispatch the challenge a member scanned from a QR code.
#[utoipa::path(
    post,
    path = "/rooms/{code}/challenge/scan",
    tag = "challenge",
    params(("code" = String, Path, description = "Six-digit join code")),
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Challenge dispatched", body = RoomSnapshot),
        (status = 400, description = "Unrecognized challenge code"),
        (status = 409, description = "Room is not ready for a scan"),
        (status = 502, description = "Content service unavailable")
    )
)]
pub async fn scan(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    payload.validate()?;
    let code = checked_code(&code)?;
    let snapshot =
        challenge_service::scan(&state, code, &payload.player_id, &payload.content).await?;
    Ok(Json(snapshot))
}

/// Record the current player's trivia answer.
#[utoipa::path(
    post,
    path = "/rooms/{code}/challenge/answer",
    tag = "challenge",
    params(("code" = String, Path, description = "Six-digit join code")),
    request_body = TriviaAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = RoomSnapshot),
        (status = 403, description = "Caller is not the current player"),
        (status = 409, description = "No trivia challenge is active")
    )
)]
pub async fn answer(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<TriviaAnswerRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    payload.validate()?;
    let code = checked_code(&code)?;
    let snapshot = challenge_service::answer_trivia(
        &state,
        code,
        &payload.player_id,
        payload.selected_index,
    )
    .await?;
    Ok(Json(snapshot))
}

/// Close the active challenge and return to play.
#[utoipa::path(
    post,
    path = "/rooms/{code}/challenge/resolve",
    tag = "challenge",
    params(("code" = String, Path, description = "Six-digit join code")),
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Current room snapshot after resolution", body = RoomSnapshot),
        (status = 403, description = "Caller is not a member")
    )
)]
pub async fn resolve(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<ResolveRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    payload.validate()?;
    let code = checked_code(&code)?;
    let snapshot = challenge_service::resolve(&state, code, &payload.player_id).await?;
    Ok(Json(snapshot))
}
