use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::profile::{InitProfileRequest, ProfileSnapshot, UpdateProfileRequest},
    error::AppError,
    services::profile_service,
    state::SharedState,
};

/// Routes handling player profiles.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/profiles", post(init_profile))
        .route(
            "/profiles/{player_id}",
            get(get_profile).put(update_profile),
        )
}

/// Ensure a profile exists for the given account, creating defaults on first
/// sight.
#[utoipa::path(
    post,
    path = "/profiles",
    tag = "profile",
    request_body = InitProfileRequest,
    responses(
        (status = 200, description = "Existing or freshly created profile", body = ProfileSnapshot)
    )
)]
pub async fn init_profile(
    State(state): State<SharedState>,
    Json(payload): Json<InitProfileRequest>,
) -> Result<Json<ProfileSnapshot>, AppError> {
    payload.validate()?;
    let profile = profile_service::init_profile(&state, &payload.email).await?;
    Ok(Json(profile))
}

/// Fetch a profile.
#[utoipa::path(
    get,
    path = "/profiles/{player_id}",
    tag = "profile",
    params(("player_id" = String, Path, description = "Player identifier")),
    responses(
        (status = 200, description = "Stored profile", body = ProfileSnapshot),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn get_profile(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
) -> Result<Json<ProfileSnapshot>, AppError> {
    let profile = profile_service::get_profile(&state, &player_id).await?;
    Ok(Json(profile))
}

/// Update the mutable parts of a profile.
#[utoipa::path(
    put,
    path = "/profiles/{player_id}",
    tag = "profile",
    params(("player_id" = String, Path, description = "Player identifier")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileSnapshot),
        (status = 400, description = "Empty display name"),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn update_profile(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileSnapshot>, AppError> {
    payload.validate()?;
    let profile = profile_service::update_profile(&state, &player_id, payload).await?;
    Ok(Json(profile))
}
