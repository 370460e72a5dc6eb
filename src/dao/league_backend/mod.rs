//! Client side of the authoritative league backend.

/// reqwest implementation of [`LeagueBackend`].
pub mod rest;

use futures::future::BoxFuture;

use crate::dao::backend::BackendResult;
use crate::dao::models::{
    ActionBody, HistoryMatchEntity, LiveMatchEntity, NewHistoryMatchDocument, NewLiveMatchDocument,
    NewPlayerDocument, NewTeamDocument, NewTournamentDocument, PlayerEntity, ScheduledMatchEntity,
    ScoreDocument, StandingEntity, TeamEntity, TournamentEntity, UserProfileEntity,
    UserSyncDocument,
};

/// Bearer access token forwarded on authenticated backend calls.
pub type AccessToken = String;

/// Abstraction over the authoritative league REST backend.
///
/// Every mutating call carries the operator's bearer token; public reads are
/// anonymous.
pub trait LeagueBackend: Send + Sync {
    /// `GET /live-matches`: every match on the live board.
    fn list_live_matches(&self) -> BoxFuture<'static, BackendResult<Vec<LiveMatchEntity>>>;
    /// `POST /live-matches`.
    fn create_live_match(
        &self,
        token: AccessToken,
        document: NewLiveMatchDocument,
    ) -> BoxFuture<'static, BackendResult<()>>;
    /// `POST /live-matches/{id}/{action}` with an optional body.
    fn send_match_action(
        &self,
        token: AccessToken,
        match_id: String,
        action: &'static str,
        body: Option<ActionBody>,
    ) -> BoxFuture<'static, BackendResult<()>>;
    /// `PUT /live-matches/{id}/score` with the goal participants.
    fn register_goal(
        &self,
        token: AccessToken,
        match_id: String,
        document: ScoreDocument,
    ) -> BoxFuture<'static, BackendResult<()>>;
    /// `GET /players/lineup/{team_id}`.
    fn team_lineup(&self, team_id: String) -> BoxFuture<'static, BackendResult<Vec<PlayerEntity>>>;
    /// `GET /team`.
    fn list_teams(&self) -> BoxFuture<'static, BackendResult<Vec<TeamEntity>>>;
    /// `POST /team`.
    fn create_team(
        &self,
        token: AccessToken,
        document: NewTeamDocument,
    ) -> BoxFuture<'static, BackendResult<()>>;
    /// `POST /players/bulk`.
    fn create_players(
        &self,
        token: AccessToken,
        documents: Vec<NewPlayerDocument>,
    ) -> BoxFuture<'static, BackendResult<()>>;
    /// `GET /tournaments`.
    fn list_tournaments(&self) -> BoxFuture<'static, BackendResult<Vec<TournamentEntity>>>;
    /// `POST /tournaments`.
    fn create_tournament(
        &self,
        token: AccessToken,
        document: NewTournamentDocument,
    ) -> BoxFuture<'static, BackendResult<()>>;
    /// `GET /api/matches`: completed matches.
    fn list_history(&self) -> BoxFuture<'static, BackendResult<Vec<HistoryMatchEntity>>>;
    /// `POST /api/matches`.
    fn create_history_match(
        &self,
        token: AccessToken,
        document: NewHistoryMatchDocument,
    ) -> BoxFuture<'static, BackendResult<()>>;
    /// `GET /team-tournament-standings/{id}/standings`.
    fn standings(
        &self,
        tournament_id: String,
    ) -> BoxFuture<'static, BackendResult<Vec<StandingEntity>>>;
    /// `GET /scheduled-matches/upcoming`, optionally for one tournament.
    fn upcoming_matches(
        &self,
        tournament_id: Option<String>,
        limit: u32,
    ) -> BoxFuture<'static, BackendResult<Vec<ScheduledMatchEntity>>>;
    /// `GET /api/users/profile`: admin flag of the token's owner.
    fn user_profile(&self, token: AccessToken)
    -> BoxFuture<'static, BackendResult<UserProfileEntity>>;
    /// `GET /api/users`: raw user record of the token's owner.
    fn current_user(&self, token: AccessToken)
    -> BoxFuture<'static, BackendResult<serde_json::Value>>;
    /// `POST /api/users`: upsert the caller's identity.
    fn sync_user(
        &self,
        token: AccessToken,
        document: UserSyncDocument,
    ) -> BoxFuture<'static, BackendResult<serde_json::Value>>;
    /// `HEAD /tournaments`: reachability check.
    fn health_check(&self) -> BoxFuture<'static, BackendResult<()>>;
}
