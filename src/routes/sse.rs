use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{
    dto::{sse::ServerEvent, validation::validate_room_code},
    error::AppError,
    services::sse_service,
    state::SharedState,
};

const EVENT_HANDSHAKE: &str = "room.handshake";

#[utoipa::path(
    get,
    path = "/rooms/{code}/events",
    tag = "room",
    params(("code" = String, Path, description = "Six-digit join code")),
    responses((status = 200, description = "Room SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream every committed snapshot of a room to the connected client.
pub async fn room_stream(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    validate_room_code(&code)
        .map_err(|err| AppError::BadRequest(format!("invalid room code: {err}")))?;

    let (receiver, handshake) = sse_service::subscribe_room(&state, &code).await?;
    info!(code, "new room SSE connection");

    let initial = ServerEvent::json(Some(EVENT_HANDSHAKE.to_string()), &handshake)
        .map_err(|err| AppError::Internal(format!("failed to serialize handshake: {err}")))?;

    Ok(sse_service::to_sse_stream(receiver, code, Some(initial)))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/rooms/{code}/events", get(room_stream))
}
