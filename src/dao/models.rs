//! Wire representations of the league backend documents.
//!
//! The backend returns references either populated (full document) or as a bare
//! identifier depending on the endpoint, so references are untagged enums.
//! Counters and lists also arrive as explicit `null` on older documents; those
//! fields fall back to their default instead of failing the whole fetch.

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};
use time::OffsetDateTime;

use crate::state::state_machine::{MatchStage, MatchStatus, TeamSide};

/// Club document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntity {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// The backend spells this field `abreviation`.
    #[serde(rename = "abreviation", default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

/// A club reference, populated or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeamRef {
    /// Full document.
    Populated(TeamEntity),
    /// Bare identifier.
    Id(String),
}

impl TeamRef {
    /// Identifier of the referenced club.
    pub fn id(&self) -> &str {
        match self {
            TeamRef::Populated(team) => &team.id,
            TeamRef::Id(id) => id,
        }
    }

    /// Display name when the reference is populated.
    pub fn name(&self) -> Option<&str> {
        match self {
            TeamRef::Populated(team) => Some(&team.name),
            TeamRef::Id(_) => None,
        }
    }
}

/// Tournament document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentEntity {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// League, cup, ...
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Season label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    /// First match day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Last match day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// A tournament reference, populated or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TournamentRef {
    /// Full document.
    Populated(TournamentEntity),
    /// Bare identifier.
    Id(String),
}

impl TournamentRef {
    /// Identifier of the referenced tournament.
    pub fn id(&self) -> &str {
        match self {
            TournamentRef::Populated(tournament) => &tournament.id,
            TournamentRef::Id(id) => id,
        }
    }
}

/// Registered player document.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntity {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Jersey number; 0 when unknown.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub number: u32,
    /// Playing position, free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// A player reference, populated or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerRef {
    /// Full document.
    Populated(PlayerEntity),
    /// Bare identifier.
    Id(String),
}

impl PlayerRef {
    /// Identifier of the referenced player.
    pub fn id(&self) -> &str {
        match self {
            PlayerRef::Populated(player) => &player.id,
            PlayerRef::Id(id) => id,
        }
    }
}

/// Goal recorded on a match.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalEntity {
    /// Backend identifier; absent on goals mirrored locally.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Scorer.
    pub player: PlayerRef,
    /// Assisting player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assist: Option<PlayerRef>,
    /// Minute the goal is credited to.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub minute: u32,
    /// Scoring club; the live-match endpoints populate it.
    pub team: TeamRef,
}

/// Live match document as returned by `GET /live-matches`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMatchEntity {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Home club.
    pub team_a: TeamRef,
    /// Away club.
    pub team_b: TeamRef,
    /// Home goals.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub score_a: u32,
    /// Away goals.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub score_b: u32,
    /// Goals in scoring order.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub goals: Vec<GoalEntity>,
    /// Scheduled date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Kick-off instant.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    /// When the clock was last frozen.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub paused_time: Option<OffsetDateTime>,
    /// Accumulated paused seconds; JavaScript backends may send fractions.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub resume_offset: f64,
    /// Stage the match is in.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub current_stage: MatchStage,
    /// Owning tournament.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament: Option<TournamentRef>,
    /// Clock value frozen when the match finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_elapsed_seconds: Option<u64>,
}

/// Computed standings row for a club in a tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingEntity {
    /// Club the row belongs to.
    pub team: TeamRef,
    /// Matches played.
    #[serde(default)]
    pub matches_played: u32,
    /// Matches won.
    #[serde(default)]
    pub wins: u32,
    /// Matches drawn.
    #[serde(default)]
    pub draws: u32,
    /// Matches lost.
    #[serde(default)]
    pub losses: u32,
    /// Goals scored.
    #[serde(default)]
    pub goals_for: u32,
    /// Goals conceded.
    #[serde(default)]
    pub goals_against: u32,
    /// Goals scored minus conceded.
    #[serde(default)]
    pub goal_difference: i32,
    /// League points.
    #[serde(default)]
    pub points: u32,
}

/// Upcoming fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledMatchEntity {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Match day.
    pub date: String,
    /// Kick-off time of day.
    #[serde(default)]
    pub time: Option<String>,
    /// Home club.
    pub team_a: TeamRef,
    /// Away club.
    pub team_b: TeamRef,
    /// Owning tournament.
    #[serde(default)]
    pub tournament: Option<TournamentRef>,
    /// Venue.
    #[serde(default)]
    pub stadium: Option<String>,
    /// Referee name.
    #[serde(default)]
    pub referee: Option<String>,
    /// Round number.
    #[serde(default)]
    pub matchday: Option<u32>,
    /// Scheduling status.
    #[serde(default)]
    pub status: Option<String>,
}

/// Completed match stored in the history collection.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMatchEntity {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Match day.
    #[serde(default)]
    pub date: Option<String>,
    /// Home club.
    pub team_a: TeamRef,
    /// Away club.
    pub team_b: TeamRef,
    /// Final home score.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub score_a: u32,
    /// Final away score.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub score_b: u32,
    /// Goals in scoring order.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub goals: Vec<GoalEntity>,
}

/// Response of `GET /api/users/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileEntity {
    /// Whether the caller may use the admin console.
    #[serde(default)]
    pub is_admin: bool,
    /// Stored user document.
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

/// Body of `POST /live-matches`. Scores always start at 0-0.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLiveMatchDocument {
    /// Home club id.
    pub team_a: String,
    /// Away club id.
    pub team_b: String,
    /// Tournament id.
    pub tournament: String,
    /// Always 0 on creation.
    pub score_a: u32,
    /// Always 0 on creation.
    pub score_b: u32,
    /// Creation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// Body of `POST /team`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeamDocument {
    /// Club name.
    pub name: String,
    /// Upper-cased short code.
    #[serde(rename = "abreviation")]
    pub abbreviation: String,
    /// City or neighbourhood.
    pub location: String,
    /// Division.
    pub division: String,
    /// Head coach.
    pub coach: String,
    /// Home ground.
    pub stadium: String,
}

/// One element of the `POST /players/bulk` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayerDocument {
    /// Club id.
    pub club: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Jersey number.
    pub number: u32,
    /// Playing position.
    pub position: String,
}

/// Body of `POST /tournaments`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournamentDocument {
    /// Tournament name.
    pub name: String,
    /// League, cup, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Season label.
    pub season: String,
    /// Free text.
    pub description: String,
    /// First match day.
    pub start_date: Option<String>,
    /// Last match day.
    pub end_date: Option<String>,
    /// Participating club ids.
    pub teams: Vec<String>,
}

/// Goal of a completed match submitted to `POST /api/matches`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHistoryGoalDocument {
    /// Scorer id.
    pub player: String,
    /// Assist id, empty when none.
    pub assist: String,
    /// Minute of the goal.
    pub minute: u32,
    /// Scoring club id.
    pub team: String,
    /// Minute rendered as `33'`.
    pub time: String,
}

/// Body of `POST /api/matches`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHistoryMatchDocument {
    /// Match day.
    pub date: String,
    /// Home club id.
    pub team_a: String,
    /// Away club id.
    pub team_b: String,
    /// Final home score.
    pub score_a: u32,
    /// Final away score.
    pub score_b: u32,
    /// One entry per goal.
    pub goals: Vec<NewHistoryGoalDocument>,
}

/// Body of `POST /api/users`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSyncDocument {
    /// Subject of the identity provider token.
    pub auth0_id: String,
    /// Verified e-mail.
    pub email: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Avatar URL.
    pub picture: Option<String>,
}

/// Inline description of a player that is not in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPlayerDocument {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Jersey number.
    pub number: u32,
    /// Club the custom player plays for.
    pub team: String,
    /// Playing position.
    pub position: String,
}

/// Body of `PUT /live-matches/{id}/score`.
///
/// Exactly one of `scorer_id` / `scorer_custom` is set; the assist fields are
/// optional and mutually exclusive too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDocument {
    /// Credited side.
    pub team: TeamSide,
    /// Goals added.
    pub delta: u32,
    /// Roster scorer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scorer_id: Option<String>,
    /// Scorer outside the roster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scorer_custom: Option<CustomPlayerDocument>,
    /// Roster assist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assist_id: Option<String>,
    /// Assist outside the roster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assist_custom: Option<CustomPlayerDocument>,
}

/// Optional body sent with a lifecycle action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", untagged)]
pub enum ActionBody {
    /// Body of the `stage` action.
    Stage {
        /// Target stage.
        stage: MatchStage,
    },
    /// Body of the `finish` action.
    Finish {
        /// Clock value when the match ended.
        #[serde(rename = "finalElapsedSeconds")]
        final_elapsed_seconds: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_match_accepts_populated_and_bare_references() {
        let json = r#"{
            "_id": "m1",
            "teamA": {"_id": "t1", "name": "Rivers", "abreviation": "RIV"},
            "teamB": "t2",
            "scoreA": 1,
            "scoreB": 0,
            "goals": [{
                "_id": "g1",
                "player": {"_id": "p1", "firstName": "Ana", "lastName": "Diaz", "number": 9},
                "minute": 12,
                "team": "t1"
            }],
            "status": "paused",
            "startTime": "2024-05-04T16:00:00.000Z",
            "pausedTime": "2024-05-04T16:02:05Z",
            "resumeOffset": 12.7,
            "currentStage": "extra_time",
            "tournament": "tour-1"
        }"#;

        let entity: LiveMatchEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.team_a.name(), Some("Rivers"));
        assert_eq!(entity.team_b.id(), "t2");
        assert_eq!(entity.status, MatchStatus::Paused);
        assert_eq!(entity.current_stage, MatchStage::ExtraTime);
        assert_eq!(entity.goals[0].player.id(), "p1");
        assert_eq!(entity.tournament.as_ref().map(TournamentRef::id), Some("tour-1"));
        assert!(entity.start_time.is_some());
    }

    #[test]
    fn minimal_live_match_uses_defaults() {
        let json = r#"{"_id": "m2", "teamA": "a", "teamB": "b", "status": "not_started"}"#;
        let entity: LiveMatchEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.score_a, 0);
        assert!(entity.goals.is_empty());
        assert_eq!(entity.current_stage, MatchStage::Regular);
        assert_eq!(entity.start_time, None);
    }

    #[test]
    fn goal_team_may_be_populated() {
        let json = r#"{
            "_id": "m3",
            "teamA": {"_id": "ta", "name": "Rivers"},
            "teamB": {"_id": "tb", "name": "Harbour"},
            "scoreA": 1,
            "goals": [{"player": "p1", "minute": 4, "team": {"_id": "ta", "name": "Rivers"}}],
            "status": "live"
        }"#;

        let entity: LiveMatchEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.goals[0].team.id(), "ta");
        assert_eq!(entity.goals[0].team.name(), Some("Rivers"));
    }

    #[test]
    fn explicit_nulls_fall_back_to_defaults() {
        let json = r#"{
            "_id": "m4",
            "teamA": "a",
            "teamB": "b",
            "scoreA": null,
            "scoreB": null,
            "goals": null,
            "status": "paused",
            "startTime": null,
            "pausedTime": null,
            "resumeOffset": null,
            "currentStage": null,
            "tournament": null
        }"#;

        let entity: LiveMatchEntity = serde_json::from_str(json).unwrap();
        assert_eq!((entity.score_a, entity.score_b), (0, 0));
        assert!(entity.goals.is_empty());
        assert_eq!(entity.resume_offset, 0.0);
        assert_eq!(entity.current_stage, MatchStage::Regular);
        assert_eq!(entity.tournament, None);
    }

    #[test]
    fn score_document_omits_unused_variants() {
        let body = ScoreDocument {
            team: TeamSide::A,
            delta: 1,
            scorer_id: Some("p1".into()),
            scorer_custom: None,
            assist_id: None,
            assist_custom: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"team": "A", "delta": 1, "scorerId": "p1"})
        );
    }

    #[test]
    fn action_bodies_match_backend_shape() {
        let stage = serde_json::to_value(ActionBody::Stage {
            stage: MatchStage::Penalties,
        })
        .unwrap();
        assert_eq!(stage, serde_json::json!({"stage": "penalties"}));

        let finish = serde_json::to_value(ActionBody::Finish {
            final_elapsed_seconds: 5_400,
        })
        .unwrap();
        assert_eq!(finish, serde_json::json!({"finalElapsedSeconds": 5400}));
    }
}
