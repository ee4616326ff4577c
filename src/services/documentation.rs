use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Key Quest Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::room_stream,
        crate::routes::rooms::create_room,
        crate::routes::rooms::get_room,
        crate::routes::rooms::join_room,
        crate::routes::rooms::leave_room,
        crate::routes::rooms::start_game,
        crate::routes::rooms::reconnect,
        crate::routes::rooms::adjust_score,
        crate::routes::challenges::scan,
        crate::routes::challenges::answer,
        crate::routes::challenges::resolve,
        crate::routes::profiles::init_profile,
        crate::routes::profiles::get_profile,
        crate::routes::profiles::update_profile,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::room::CreateRoomRequest,
            crate::dto::room::JoinRoomRequest,
            crate::dto::room::LeaveRoomRequest,
            crate::dto::room::StartGameRequest,
            crate::dto::room::ReconnectRequest,
            crate::dto::room::ScoreAdjustmentRequest,
            crate::dto::room::ScoreUpdateResponse,
            crate::dto::room::RoomSnapshot,
            crate::dto::room::HostSnapshot,
            crate::dto::challenge::ScanRequest,
            crate::dto::challenge::TriviaAnswerRequest,
            crate::dto::challenge::ResolveRequest,
            crate::dto::challenge::ActiveChallengeSnapshot,
            crate::dto::challenge::LastAnswerSnapshot,
            crate::dto::profile::InitProfileRequest,
            crate::dto::profile::UpdateProfileRequest,
            crate::dto::profile::ProfileSnapshot,
            crate::dto::sse::RoomHandshake,
            crate::state::room::GameState,
            crate::state::room::ChallengeKind,
            crate::state::room::ChallengePayload,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "room", description = "Room lifecycle, membership and scores"),
        (name = "challenge", description = "QR challenge dispatch and resolution"),
        (name = "profile", description = "Player profile management"),
    )
)]
pub struct ApiDoc;
