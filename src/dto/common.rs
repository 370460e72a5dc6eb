use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::{
    dao::models::{GoalEntity, PlayerEntity, PlayerRef, TeamEntity, TeamRef},
    dto::format_timestamp,
    state::{
        clock::format_clock,
        live_match::LiveMatch,
        state_machine::{MatchStage, MatchStatus},
    },
};

/// Club as shown by the console.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct TeamView {
    /// Backend identifier.
    pub id: String,
    /// Missing when the backend only returned the identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Short name shown on the scoreboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

impl From<&TeamRef> for TeamView {
    fn from(team: &TeamRef) -> Self {
        match team {
            TeamRef::Populated(team) => team.into(),
            TeamRef::Id(id) => Self {
                id: id.clone(),
                name: None,
                abbreviation: None,
            },
        }
    }
}

impl From<&TeamEntity> for TeamView {
    fn from(team: &TeamEntity) -> Self {
        Self {
            id: team.id.clone(),
            name: Some(team.name.clone()),
            abbreviation: team.abbreviation.clone(),
        }
    }
}

/// Registered player.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct PlayerView {
    /// Backend identifier.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Jersey number.
    pub number: u32,
    /// Playing position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl From<PlayerEntity> for PlayerView {
    fn from(player: PlayerEntity) -> Self {
        Self {
            id: player.id,
            first_name: player.first_name,
            last_name: player.last_name,
            number: player.number,
            position: player.position,
        }
    }
}

/// Goal participant reference with its display name when known.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct ParticipantView {
    /// Backend identifier, or `custom` for an unregistered player.
    pub id: String,
    /// Full name when the reference was populated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&PlayerRef> for ParticipantView {
    fn from(player: &PlayerRef) -> Self {
        match player {
            PlayerRef::Populated(player) => Self {
                id: player.id.clone(),
                name: Some(full_name(&player.first_name, &player.last_name)),
            },
            PlayerRef::Id(id) => Self {
                id: id.clone(),
                name: None,
            },
        }
    }
}

/// Goal of a match in scoring order.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct GoalView {
    /// Scorer.
    pub player: ParticipantView,
    /// Assisting player, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assist: Option<ParticipantView>,
    /// Playing minute, counted from 1.
    pub minute: u32,
    /// Club credited with the goal.
    pub team_id: String,
}

impl From<&GoalEntity> for GoalView {
    fn from(goal: &GoalEntity) -> Self {
        Self {
            player: (&goal.player).into(),
            assist: goal.assist.as_ref().map(ParticipantView::from),
            minute: goal.minute,
            team_id: goal.team.id().to_string(),
        }
    }
}

/// Live match with its clock computed at snapshot time.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct MatchView {
    /// Backend identifier.
    pub id: String,
    /// Home side.
    pub team_a: TeamView,
    /// Away side.
    pub team_b: TeamView,
    /// Goals of team A.
    pub score_a: u32,
    /// Goals of team B.
    pub score_b: u32,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Current stage of play.
    pub stage: MatchStage,
    /// Playing time in whole seconds.
    pub elapsed_seconds: u64,
    /// Playing time rendered as `MM:SS`.
    pub clock: String,
    /// True while the clock advances with wall-clock time.
    pub running: bool,
    /// RFC 3339 instant the clock was last started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// RFC 3339 instant the clock was last stopped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_time: Option<String>,
    /// Seconds banked before the last start.
    pub resume_offset: u64,
    /// Owning tournament.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<String>,
    /// Scheduled date as sent by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Goals in scoring order.
    pub goals: Vec<GoalView>,
}

impl MatchView {
    /// Project `live` with its clock evaluated at `now`.
    pub fn at(live: &LiveMatch, now: OffsetDateTime) -> Self {
        let elapsed = live.elapsed_seconds(now);
        Self {
            id: live.id.clone(),
            team_a: (&live.team_a).into(),
            team_b: (&live.team_b).into(),
            score_a: live.score_a,
            score_b: live.score_b,
            status: live.status,
            stage: live.stage,
            elapsed_seconds: elapsed,
            clock: format_clock(elapsed),
            running: live.clock_reading().is_running(),
            start_time: live.start_time.map(format_timestamp),
            paused_time: live.paused_time.map(format_timestamp),
            resume_offset: live.resume_offset,
            tournament_id: live.tournament.as_ref().map(|t| t.id().to_string()),
            date: live.date.clone(),
            goals: live.goals.iter().map(GoalView::from).collect(),
        }
    }
}

/// Clock value of a single running match.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct ClockView {
    /// Match the clock belongs to.
    pub match_id: String,
    /// Playing time in whole seconds.
    pub elapsed_seconds: u64,
    /// Playing time rendered as `MM:SS`.
    pub clock: String,
    /// Minute a goal scored now would be credited to.
    pub minute: u32,
}

pub(crate) fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}
