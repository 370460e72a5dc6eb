use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::{
        common::{MatchView, TeamView},
        public::{
            FixtureView, FixturesQuery, HistoryResponse, LineupResponse, LiveMatchesResponse,
            StandingView, TopScorerView, TournamentView,
        },
    },
    error::AppError,
    services::public_service,
    state::SharedState,
};

/// Anonymous read-only endpoints backing the public viewer.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/public/matches", get(live_matches))
        .route("/public/matches/{id}", get(live_match))
        .route("/public/tournaments", get(tournaments))
        .route("/public/tournaments/{id}/standings", get(standings))
        .route("/public/tournaments/{id}/scorers", get(top_scorers))
        .route("/public/history", get(history))
        .route("/public/fixtures", get(fixtures))
        .route("/public/teams", get(teams))
        .route("/public/teams/{id}/lineup", get(lineup))
}

#[utoipa::path(
    get,
    path = "/public/matches",
    tag = "public",
    responses((
        status = 200,
        description = "Live matches with computed clocks",
        body = LiveMatchesResponse
    ))
)]
/// Live board with clocks computed at request time.
pub async fn live_matches(State(state): State<SharedState>) -> Json<LiveMatchesResponse> {
    Json(public_service::live_matches(&state).await)
}

#[utoipa::path(
    get,
    path = "/public/matches/{id}",
    tag = "public",
    params(("id" = String, Path, description = "Live match identifier")),
    responses(
        (status = 200, description = "Live match", body = MatchView),
        (status = 404, description = "Match not on the live board")
    )
)]
/// One live match by identifier.
pub async fn live_match(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MatchView>, AppError> {
    Ok(Json(public_service::live_match(&state, &id).await?))
}

#[utoipa::path(
    get,
    path = "/public/tournaments",
    tag = "public",
    responses((status = 200, description = "Tournaments", body = [TournamentView]))
)]
/// Every tournament known to the league backend.
pub async fn tournaments(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TournamentView>>, AppError> {
    Ok(Json(public_service::tournaments(&state).await?))
}

#[utoipa::path(
    get,
    path = "/public/tournaments/{id}/standings",
    tag = "public",
    params(("id" = String, Path, description = "Tournament identifier")),
    responses((status = 200, description = "Standings, leader first", body = [StandingView]))
)]
/// Standings sorted by points, then goal difference.
pub async fn standings(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StandingView>>, AppError> {
    Ok(Json(public_service::standings(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/public/tournaments/{id}/scorers",
    tag = "public",
    params(("id" = String, Path, description = "Tournament identifier")),
    responses((status = 200, description = "Goal leaders", body = [TopScorerView]))
)]
/// Goal leaders counted from the live board.
pub async fn top_scorers(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Json<Vec<TopScorerView>> {
    Json(public_service::top_scorers(&state, &id).await)
}

#[utoipa::path(
    get,
    path = "/public/history",
    tag = "public",
    responses((
        status = 200,
        description = "Completed matches with a summary",
        body = HistoryResponse
    ))
)]
/// Completed matches, most recent first.
pub async fn history(State(state): State<SharedState>) -> Result<Json<HistoryResponse>, AppError> {
    Ok(Json(public_service::history(&state).await?))
}

#[utoipa::path(
    get,
    path = "/public/fixtures",
    tag = "public",
    params(FixturesQuery),
    responses((status = 200, description = "Upcoming fixtures", body = [FixtureView]))
)]
/// Upcoming fixtures, soonest first.
pub async fn fixtures(
    State(state): State<SharedState>,
    Query(query): Query<FixturesQuery>,
) -> Result<Json<Vec<FixtureView>>, AppError> {
    Ok(Json(public_service::fixtures(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/public/teams",
    tag = "public",
    responses((status = 200, description = "Clubs", body = [TeamView]))
)]
/// Registered clubs.
pub async fn teams(State(state): State<SharedState>) -> Result<Json<Vec<TeamView>>, AppError> {
    Ok(Json(public_service::teams(&state).await?))
}

#[utoipa::path(
    get,
    path = "/public/teams/{id}/lineup",
    tag = "public",
    params(("id" = String, Path, description = "Club identifier")),
    responses((status = 200, description = "Roster grouped by position", body = LineupResponse))
)]
/// Roster of a club grouped by position.
pub async fn lineup(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<LineupResponse>, AppError> {
    Ok(Json(public_service::lineup(&state, id).await?))
}
