use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::dto::common::{GoalView, MatchView, PlayerView, TeamView};

/// Live board as seen by viewers.
#[derive(Debug, Serialize, ToSchema)]
pub struct LiveMatchesResponse {
    /// RFC 3339 timestamp of the last successful fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<String>,
    /// True when the last fetch from the league backend failed.
    pub degraded: bool,
    /// Matches in backend order.
    pub matches: Vec<MatchView>,
}

/// Row of a tournament standings table.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct StandingView {
    /// 1-based rank.
    pub position: usize,
    /// Club.
    pub team: TeamView,
    /// Finished matches.
    pub matches_played: u32,
    /// Matches won.
    pub wins: u32,
    /// Matches drawn.
    pub draws: u32,
    /// Matches lost.
    pub losses: u32,
    /// Goals scored.
    pub goals_for: u32,
    /// Goals conceded.
    pub goals_against: u32,
    /// `goals_for - goals_against`.
    pub goal_difference: i32,
    /// Three per win, one per draw.
    pub points: u32,
}

/// Goals tally of a single player.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct TopScorerView {
    /// Backend identifier, or `custom`.
    pub player_id: String,
    /// Full name when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Club of the most recent goal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    /// Goals scored.
    pub goals: u32,
    /// Distinct matches the player scored in.
    pub matches: u32,
}

/// Completed match.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct HistoryMatchView {
    /// Backend identifier.
    pub id: String,
    /// Date the match was played.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Home side.
    pub team_a: TeamView,
    /// Away side.
    pub team_b: TeamView,
    /// Final goals of team A.
    pub score_a: u32,
    /// Final goals of team B.
    pub score_b: u32,
    /// Goals in scoring order.
    pub goals: Vec<GoalView>,
}

/// Aggregates over the match history.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct HistorySummary {
    /// Completed matches.
    pub total_matches: usize,
    /// Goals across all completed matches.
    pub total_goals: u64,
    /// Rounded to two decimals; 0 without matches.
    pub average_goals: f64,
}

/// Match history with its summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    /// Aggregates over `matches`.
    pub summary: HistorySummary,
    /// Most recent first.
    pub matches: Vec<HistoryMatchView>,
}

/// Upcoming fixture.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct FixtureView {
    /// Backend identifier.
    pub id: String,
    /// Scheduled date.
    pub date: String,
    /// Kick-off time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Home side.
    pub team_a: TeamView,
    /// Away side.
    pub team_b: TeamView,
    /// Owning tournament.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<String>,
    /// Venue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stadium: Option<String>,
    /// Appointed referee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referee: Option<String>,
    /// Round of the tournament.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matchday: Option<u32>,
}

/// Query accepted by the fixtures endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct FixturesQuery {
    /// Restrict to one tournament.
    pub tournament: Option<String>,
    /// Maximum number of fixtures (default 10).
    pub limit: Option<u32>,
}

/// Players of one position.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct PositionGroup {
    /// Position label.
    pub position: String,
    /// Players ordered by jersey number.
    pub players: Vec<PlayerView>,
}

/// Roster grouped by position, goalkeepers first.
#[derive(Debug, Serialize, ToSchema)]
pub struct LineupResponse {
    /// Club the roster belongs to.
    pub team_id: String,
    /// Position groups.
    pub groups: Vec<PositionGroup>,
}

/// Tournament listing entry.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct TournamentView {
    /// Backend identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// League, cup, ...
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Season label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}
