use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        admin::{
            ActionResponse, CommandResponse, CreateClubRequest, CreateHistoryMatchRequest,
            CreateLiveMatchRequest, CreatePlayersRequest, CreateTournamentRequest, GoalRequest,
            LifecycleAction, StageRequest,
        },
        public::{LineupResponse, LiveMatchesResponse},
    },
    error::AppError,
    routes::auth::{AdminToken, require_admin},
    services::{admin_service, board_supervisor, public_service},
    state::{SharedState, state_machine::MatchCommand},
};

/// Operator endpoints; every route requires an admin bearer token.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/matches", get(list_matches).post(create_live_match))
        .route("/admin/matches/refresh", post(refresh_matches))
        .route("/admin/matches/{id}/stage", post(change_stage))
        .route("/admin/matches/{id}/goals", post(register_goal))
        .route("/admin/matches/{id}/{action}", post(lifecycle_command))
        .route("/admin/clubs", post(create_club))
        .route("/admin/players", post(create_players))
        .route("/admin/tournaments", post(create_tournament))
        .route("/admin/history", post(create_history_match))
        .route("/admin/teams/{id}/lineup", get(team_lineup))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// Live board as the operator sees it.
#[utoipa::path(
    get,
    path = "/admin/matches",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Admin bearer token")),
    responses((status = 200, description = "Live matches", body = LiveMatchesResponse))
)]
pub async fn list_matches(State(state): State<SharedState>) -> Json<LiveMatchesResponse> {
    Json(public_service::live_matches(&state).await)
}

/// Refetch the live matches right away instead of waiting for the next poll.
#[utoipa::path(
    post,
    path = "/admin/matches/refresh",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Admin bearer token")),
    responses(
        (status = 200, description = "Board refreshed", body = ActionResponse),
        (status = 503, description = "League backend unreachable")
    )
)]
pub async fn refresh_matches(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    let count = board_supervisor::refresh_board(&state).await?;
    Ok(Json(ActionResponse {
        message: format!("{count} live matches loaded"),
    }))
}

/// Create a live match; it starts at 0-0 and `not_started`.
#[utoipa::path(
    post,
    path = "/admin/matches",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Admin bearer token")),
    request_body = CreateLiveMatchRequest,
    responses(
        (status = 201, description = "Live match created", body = ActionResponse),
        (status = 400, description = "Invalid teams or tournament")
    )
)]
pub async fn create_live_match(
    State(state): State<SharedState>,
    Extension(AdminToken(token)): Extension<AdminToken>,
    Valid(Json(payload)): Valid<Json<CreateLiveMatchRequest>>,
) -> Result<(StatusCode, Json<ActionResponse>), AppError> {
    let response = admin_service::create_live_match(&state, token, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Drive the match lifecycle: start, pause, resume, suspend or finish.
#[utoipa::path(
    post,
    path = "/admin/matches/{id}/{action}",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Admin bearer token"),
        ("id" = String, Path, description = "Live match identifier"),
        ("action" = LifecycleAction, Path, description = "Lifecycle command")
    ),
    responses(
        (
            status = 200,
            description = "Command acknowledged by the league backend",
            body = CommandResponse
        ),
        (status = 404, description = "Unknown live match"),
        (status = 409, description = "Command not allowed from the current status")
    )
)]
pub async fn lifecycle_command(
    State(state): State<SharedState>,
    Extension(AdminToken(token)): Extension<AdminToken>,
    Path((id, action)): Path<(String, LifecycleAction)>,
) -> Result<Json<CommandResponse>, AppError> {
    let command = MatchCommand::from(action);
    Ok(Json(
        admin_service::run_command(&state, token, id, command).await?,
    ))
}

/// Move a match to extra time or penalties.
#[utoipa::path(
    post,
    path = "/admin/matches/{id}/stage",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Admin bearer token"),
        ("id" = String, Path, description = "Live match identifier")
    ),
    request_body = StageRequest,
    responses(
        (status = 200, description = "Stage changed", body = CommandResponse),
        (status = 409, description = "Stage is not after the current one")
    )
)]
pub async fn change_stage(
    State(state): State<SharedState>,
    Extension(AdminToken(token)): Extension<AdminToken>,
    Path(id): Path<String>,
    Json(payload): Json<StageRequest>,
) -> Result<Json<CommandResponse>, AppError> {
    let command = MatchCommand::Stage(payload.stage);
    Ok(Json(
        admin_service::run_command(&state, token, id, command).await?,
    ))
}

/// Register a goal with its scorer and optional assist.
#[utoipa::path(
    post,
    path = "/admin/matches/{id}/goals",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Admin bearer token"),
        ("id" = String, Path, description = "Live match identifier")
    ),
    request_body = GoalRequest,
    responses(
        (status = 200, description = "Goal registered", body = CommandResponse),
        (status = 400, description = "Scorer missing"),
        (status = 409, description = "Match is not live")
    )
)]
pub async fn register_goal(
    State(state): State<SharedState>,
    Extension(AdminToken(token)): Extension<AdminToken>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<GoalRequest>>,
) -> Result<Json<CommandResponse>, AppError> {
    Ok(Json(
        admin_service::register_goal(&state, token, id, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/admin/clubs",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Admin bearer token")),
    request_body = CreateClubRequest,
    responses((status = 201, description = "Club created", body = ActionResponse))
)]
/// Create a club on the league backend.
pub async fn create_club(
    State(state): State<SharedState>,
    Extension(AdminToken(token)): Extension<AdminToken>,
    Valid(Json(payload)): Valid<Json<CreateClubRequest>>,
) -> Result<(StatusCode, Json<ActionResponse>), AppError> {
    let response = admin_service::create_club(&state, token, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Add several players to a club at once.
#[utoipa::path(
    post,
    path = "/admin/players",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Admin bearer token")),
    request_body = CreatePlayersRequest,
    responses((status = 201, description = "Players created", body = ActionResponse))
)]
pub async fn create_players(
    State(state): State<SharedState>,
    Extension(AdminToken(token)): Extension<AdminToken>,
    Valid(Json(payload)): Valid<Json<CreatePlayersRequest>>,
) -> Result<(StatusCode, Json<ActionResponse>), AppError> {
    let response = admin_service::create_players(&state, token, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/admin/tournaments",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Admin bearer token")),
    request_body = CreateTournamentRequest,
    responses((status = 201, description = "Tournament created", body = ActionResponse))
)]
/// Create a tournament on the league backend.
pub async fn create_tournament(
    State(state): State<SharedState>,
    Extension(AdminToken(token)): Extension<AdminToken>,
    Valid(Json(payload)): Valid<Json<CreateTournamentRequest>>,
) -> Result<(StatusCode, Json<ActionResponse>), AppError> {
    let response = admin_service::create_tournament(&state, token, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Record a match that was played without the live console.
#[utoipa::path(
    post,
    path = "/admin/history",
    tag = "admin",
    params(("Authorization" = String, Header, description = "Admin bearer token")),
    request_body = CreateHistoryMatchRequest,
    responses(
        (status = 201, description = "Match stored", body = ActionResponse),
        (status = 400, description = "Goals do not add up to the score")
    )
)]
pub async fn create_history_match(
    State(state): State<SharedState>,
    Extension(AdminToken(token)): Extension<AdminToken>,
    Valid(Json(payload)): Valid<Json<CreateHistoryMatchRequest>>,
) -> Result<(StatusCode, Json<ActionResponse>), AppError> {
    let response = admin_service::create_history_match(&state, token, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Roster offered by the goal form.
#[utoipa::path(
    get,
    path = "/admin/teams/{id}/lineup",
    tag = "admin",
    params(
        ("Authorization" = String, Header, description = "Admin bearer token"),
        ("id" = String, Path, description = "Club identifier")
    ),
    responses((status = 200, description = "Roster grouped by position", body = LineupResponse))
)]
pub async fn team_lineup(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<LineupResponse>, AppError> {
    Ok(Json(admin_service::lineup(&state, id).await?))
}
