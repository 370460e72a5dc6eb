//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    dto::{
        common::MatchView,
        validation::{validate_distinct_teams, validate_goal_count, validate_not_blank},
    },
    services::goal_attribution::ScorerSelection,
    state::state_machine::{MatchCommand, MatchStage, MatchStatus, TeamSide},
};

fn default_delta() -> u32 {
    1
}

/// Lifecycle command addressed through `/admin/matches/{id}/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    /// Kick off.
    Start,
    /// Freeze the clock.
    Pause,
    /// Restart a paused clock.
    Resume,
    /// Interrupt play.
    Suspend,
    /// End the match.
    Finish,
}

impl From<LifecycleAction> for MatchCommand {
    fn from(action: LifecycleAction) -> Self {
        match action {
            LifecycleAction::Start => MatchCommand::Start,
            LifecycleAction::Pause => MatchCommand::Pause,
            LifecycleAction::Resume => MatchCommand::Resume,
            LifecycleAction::Suspend => MatchCommand::Suspend,
            LifecycleAction::Finish => MatchCommand::Finish,
        }
    }
}

/// Request to move a match to a later stage.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StageRequest {
    /// Target stage; must be later than the current one.
    pub stage: MatchStage,
}

/// Goal registration submitted from the admin dashboard.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GoalRequest {
    /// Side credited with the goal.
    pub team: TeamSide,
    /// Goals to add; defaults to 1.
    #[serde(default = "default_delta")]
    #[validate(range(min = 1))]
    pub delta: u32,
    /// Roster or custom scorer.
    pub scorer: ScorerSelection,
    /// Optional assist; dropped when incomplete.
    #[serde(default)]
    pub assist: Option<ScorerSelection>,
}

/// Result of an acknowledged match command.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommandResponse {
    /// Target match.
    pub match_id: String,
    /// Backend action that was sent.
    pub action: String,
    /// Status after the command.
    pub status: MatchStatus,
    /// Match as re-read from the backend right after the command, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<MatchView>,
}

/// Generic action acknowledgement used by admin endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Human-readable outcome.
    pub message: String,
}

/// New live match. Scores always start at 0-0.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "validate_live_match_teams"))]
pub struct CreateLiveMatchRequest {
    /// Home club id.
    #[validate(custom(function = "validate_not_blank"))]
    pub team_a: String,
    /// Away club id; must differ from `team_a`.
    #[validate(custom(function = "validate_not_blank"))]
    pub team_b: String,
    /// Tournament id.
    #[validate(custom(function = "validate_not_blank"))]
    pub tournament: String,
}

fn validate_live_match_teams(request: &CreateLiveMatchRequest) -> Result<(), ValidationError> {
    validate_distinct_teams(&request.team_a, &request.team_b)
}

/// New club.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateClubRequest {
    /// Club name.
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    /// Short code, upper-cased before sending.
    #[validate(custom(function = "validate_not_blank"))]
    pub abbreviation: String,
    /// City or neighbourhood.
    #[serde(default)]
    pub location: String,
    /// Division the club plays in.
    #[serde(default)]
    pub division: String,
    /// Head coach.
    #[validate(custom(function = "validate_not_blank"))]
    pub coach: String,
    /// Home ground.
    #[validate(custom(function = "validate_not_blank"))]
    pub stadium: String,
}

/// One player of a bulk creation.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct NewPlayerInput {
    /// First name.
    #[validate(custom(function = "validate_not_blank"))]
    pub first_name: String,
    /// Last name.
    #[validate(custom(function = "validate_not_blank"))]
    pub last_name: String,
    /// Jersey number.
    #[validate(range(min = 1))]
    pub number: u32,
    /// Playing position.
    #[validate(custom(function = "validate_not_blank"))]
    pub position: String,
}

/// Several players joining the same club.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePlayersRequest {
    /// Club id the players join.
    #[validate(custom(function = "validate_not_blank"))]
    pub club: String,
    /// At least one player.
    #[validate(length(min = 1), nested)]
    pub players: Vec<NewPlayerInput>,
}

/// New tournament.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTournamentRequest {
    /// Tournament name.
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    /// League, cup, ...
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_not_blank"))]
    pub kind: String,
    /// Season label, e.g. `2024`.
    #[validate(custom(function = "validate_not_blank"))]
    pub season: String,
    /// Free text.
    #[serde(default)]
    pub description: String,
    /// First match day.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Last match day.
    #[serde(default)]
    pub end_date: Option<String>,
    /// Participating club ids.
    #[serde(default)]
    pub teams: Vec<String>,
}

/// Goal of a completed match entered after the fact.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct HistoryGoalInput {
    /// Scorer id.
    #[validate(custom(function = "validate_not_blank"))]
    pub player: String,
    /// Assist id.
    #[serde(default)]
    pub assist: Option<String>,
    /// Minute of the goal, from 1.
    #[validate(range(min = 1))]
    pub minute: u32,
    /// Club id of the scoring side.
    #[validate(custom(function = "validate_not_blank"))]
    pub team: String,
}

/// Completed match added to the history.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "validate_history_match"))]
pub struct CreateHistoryMatchRequest {
    /// Match day.
    #[validate(custom(function = "validate_not_blank"))]
    pub date: String,
    /// Home club id.
    #[validate(custom(function = "validate_not_blank"))]
    pub team_a: String,
    /// Away club id.
    #[validate(custom(function = "validate_not_blank"))]
    pub team_b: String,
    /// Final home score.
    #[serde(default)]
    pub score_a: u32,
    /// Final away score.
    #[serde(default)]
    pub score_b: u32,
    /// One entry per goal.
    #[serde(default)]
    #[validate(nested)]
    pub goals: Vec<HistoryGoalInput>,
}

fn validate_history_match(request: &CreateHistoryMatchRequest) -> Result<(), ValidationError> {
    validate_distinct_teams(&request.team_a, &request.team_b)?;
    validate_goal_count(request.goals.len(), request.score_a, request.score_b)?;

    let sides = [request.team_a.trim(), request.team_b.trim()];
    let foreign_goal = request
        .goals
        .iter()
        .any(|goal| !sides.contains(&goal.team.trim()));
    if foreign_goal {
        let mut err = ValidationError::new("goal_team");
        err.message = Some("every goal must be credited to one of the two teams".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(score_a: u32, score_b: u32, goal_teams: &[&str]) -> CreateHistoryMatchRequest {
        CreateHistoryMatchRequest {
            date: "2024-05-04".into(),
            team_a: "ta".into(),
            team_b: "tb".into(),
            score_a,
            score_b,
            goals: goal_teams
                .iter()
                .map(|team| HistoryGoalInput {
                    player: "p1".into(),
                    assist: None,
                    minute: 10,
                    team: team.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn lifecycle_actions_map_to_commands() {
        let action: LifecycleAction = serde_json::from_str(r#""suspend""#).unwrap();
        assert_eq!(MatchCommand::from(action), MatchCommand::Suspend);
        assert!(serde_json::from_str::<LifecycleAction>(r#""stage""#).is_err());
    }

    #[test]
    fn live_match_requires_distinct_teams_and_tournament() {
        let request = CreateLiveMatchRequest {
            team_a: "ta".into(),
            team_b: "ta".into(),
            tournament: "t".into(),
        };
        assert!(request.validate().is_err());

        let request = CreateLiveMatchRequest {
            team_a: "ta".into(),
            team_b: "tb".into(),
            tournament: " ".into(),
        };
        assert!(request.validate().is_err());

        let request = CreateLiveMatchRequest {
            team_a: "ta".into(),
            team_b: "tb".into(),
            tournament: "t".into(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn goal_request_defaults_delta_to_one() {
        let request: GoalRequest =
            serde_json::from_str(r#"{"team": "A", "scorer": {"player_id": "p1"}}"#).unwrap();
        assert_eq!(request.delta, 1);
        assert!(request.validate().is_ok());

        let request: GoalRequest =
            serde_json::from_str(r#"{"team": "A", "delta": 0, "scorer": {}}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn bulk_players_validate_each_entry() {
        let request: CreatePlayersRequest = serde_json::from_value(serde_json::json!({
            "club": "ta",
            "players": [
                {"first_name": "Ana", "last_name": "Diaz", "number": 9, "position": "Delantero"},
                {"first_name": "Leo", "last_name": "", "number": 0, "position": "Portero"}
            ]
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request: CreatePlayersRequest =
            serde_json::from_value(serde_json::json!({"club": "ta", "players": []})).unwrap();
        assert!(request.validate().is_err());

        let request: CreatePlayersRequest = serde_json::from_value(serde_json::json!({
            "club": "ta",
            "players": [
                {"first_name": "Ana", "last_name": "Diaz", "number": 9, "position": "Delantero"}
            ]
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn club_requires_coach_and_stadium() {
        let request: CreateClubRequest = serde_json::from_value(serde_json::json!({
            "name": "Rivers", "abbreviation": "RIV", "coach": "", "stadium": "North"
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn tournament_reads_type_field() {
        let request: CreateTournamentRequest = serde_json::from_value(serde_json::json!({
            "name": "Apertura", "type": "league", "season": "2024"
        }))
        .unwrap();
        assert_eq!(request.kind, "league");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn history_match_goals_must_match_score() {
        assert!(history(1, 1, &["ta", "tb"]).validate().is_ok());
        assert!(history(2, 1, &["ta", "tb"]).validate().is_err());
        assert!(history(1, 0, &["elsewhere"]).validate().is_err());

        let mut request = history(1, 0, &["ta"]);
        request.goals[0].minute = 0;
        assert!(request.validate().is_err());
    }
}
