use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    dto::{
        room::{
            CreateRoomRequest, JoinRoomRequest, LeaveRoomRequest, ReconnectRequest, RoomSnapshot,
            ScoreAdjustmentRequest, ScoreUpdateResponse, StartGameRequest,
        },
        validation::validate_room_code,
    },
    error::AppError,
    services::{failover, room_service, score_service},
    state::SharedState,
};

/// Routes handling room lifecycle and membership.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{code}", get(get_room))
        .route("/rooms/{code}/join", post(join_room))
        .route("/rooms/{code}/leave", post(leave_room))
        .route("/rooms/{code}/start", post(start_game))
        .route("/rooms/{code}/reconnect", post(reconnect))
        .route("/rooms/{code}/scores/{player_id}", put(adjust_score))
}

/// Optional caller identity on the room read path.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GetRoomParams {
    /// Identifier of the reading player, if known.
    pub player_id: Option<String>,
}

fn checked_code(code: &str) -> Result<&str, AppError> {
    validate_room_code(code)
        .map_err(|err| AppError::BadRequest(format!("invalid room code: {err}")))?;
    Ok(code)
}

/// Open a new room with the caller as host.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "room",
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Room created", body = RoomSnapshot)
    )
)]
pub async fn create_room(
    State(state): State<SharedState>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    payload.validate()?;
    let snapshot = room_service::create_room(&state, payload.host_id, payload.max_players).await?;
    Ok(Json(snapshot))
}

/// Fetch the latest snapshot of a room. When the caller identifies itself as
/// the disconnected host, the read doubles as a reclaim attempt.
#[utoipa::path(
    get,
    path = "/rooms/{code}",
    tag = "room",
    params(
        ("code" = String, Path, description = "Six-digit join code"),
        GetRoomParams
    ),
    responses(
        (status = 200, description = "Current room snapshot", body = RoomSnapshot),
        (status = 404, description = "Room not found")
    )
)]
pub async fn get_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Query(params): Query<GetRoomParams>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let code = checked_code(&code)?;
    let snapshot = room_service::get_room(&state, code, params.player_id.as_deref()).await?;
    Ok(Json(snapshot))
}

/// Join a room by its code.
#[utoipa::path(
    post,
    path = "/rooms/{code}/join",
    tag = "room",
    params(("code" = String, Path, description = "Six-digit join code")),
    request_body = JoinRoomRequest,
    responses(
        (status = 200, description = "Joined; current room snapshot", body = RoomSnapshot),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Room is full")
    )
)]
pub async fn join_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<JoinRoomRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    payload.validate()?;
    let code = checked_code(&code)?;
    let snapshot = room_service::join_room(&state, code, payload.player_id).await?;
    Ok(Json(snapshot))
}

/// Leave a room. A departing host opens the failover grace window.
#[utoipa::path(
    post,
    path = "/rooms/{code}/leave",
    tag = "room",
    params(("code" = String, Path, description = "Six-digit join code")),
    request_body = LeaveRoomRequest,
    responses(
        (status = 200, description = "Left; current room snapshot", body = RoomSnapshot),
        (status = 404, description = "Room not found")
    )
)]
pub async fn leave_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<LeaveRoomRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    payload.validate()?;
    let code = checked_code(&code)?;
    let snapshot = room_service::leave_room(&state, code, payload.player_id).await?;
    Ok(Json(snapshot))
}

/// Start the game. Host only.
#[utoipa::path(
    post,
    path = "/rooms/{code}/start",
    tag = "room",
    params(("code" = String, Path, description = "Six-digit join code")),
    request_body = StartGameRequest,
    responses(
        (status = 200, description = "Game started", body = RoomSnapshot),
        (status = 403, description = "Caller is not the host"),
        (status = 409, description = "Room is not waiting")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<StartGameRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    payload.validate()?;
    let code = checked_code(&code)?;
    let snapshot = room_service::start_game(&state, code, &payload.player_id).await?;
    Ok(Json(snapshot))
}

/// Reclaim the host seat within the grace window.
#[utoipa::path(
    post,
    path = "/rooms/{code}/reconnect",
    tag = "room",
    params(("code" = String, Path, description = "Six-digit join code")),
    request_body = ReconnectRequest,
    responses(
        (status = 200, description = "Current room snapshot after the reclaim attempt", body = RoomSnapshot),
        (status = 403, description = "Caller is not the disconnected host"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn reconnect(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Json(payload): Json<ReconnectRequest>,
) -> Result<Json<RoomSnapshot>, AppError> {
    payload.validate()?;
    let code = checked_code(&code)?;
    let room = failover::reclaim(
        &state,
        code,
        &payload.player_id,
        std::time::SystemTime::now(),
    )
    .await?;
    Ok(Json(RoomSnapshot::from(&room)))
}

/// Adjust a player's key count. Host only.
#[utoipa::path(
    put,
    path = "/rooms/{code}/scores/{player_id}",
    tag = "room",
    params(
        ("code" = String, Path, description = "Six-digit join code"),
        ("player_id" = String, Path, description = "Player whose keys to adjust")
    ),
    request_body = ScoreAdjustmentRequest,
    responses(
        (status = 200, description = "Score adjusted", body = ScoreUpdateResponse),
        (status = 403, description = "Caller is not the host"),
        (status = 404, description = "Room or player not found")
    )
)]
pub async fn adjust_score(
    State(state): State<SharedState>,
    Path((code, player_id)): Path<(String, String)>,
    Json(payload): Json<ScoreAdjustmentRequest>,
) -> Result<Json<ScoreUpdateResponse>, AppError> {
    payload.validate()?;
    let code = checked_code(&code)?;
    let update =
        score_service::adjust_score(&state, code, &payload.host_id, &player_id, payload.delta)
            .await?;
    Ok(Json(update))
}
