//! Resolve goal form input into a well-typed score submission.

use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    dao::models::{CustomPlayerDocument, PlayerEntity, PlayerRef, ScoreDocument},
    state::{live_match::GoalCredit, state_machine::TeamSide},
};

/// Player id sent by roster dropdowns when the operator chose "other player".
const CUSTOM_SENTINEL: &str = "custom";
const SCORER_POSITION: &str = "Delantero";
const ASSIST_POSITION: &str = "Mediocampista";

/// Raw participant selection as submitted by the goal form.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ScorerSelection {
    /// Roster player id, or `custom`.
    #[serde(default)]
    pub player_id: Option<String>,
    /// First name of a custom player.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name of a custom player.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Jersey number of a custom player.
    #[serde(default)]
    pub number: Option<u32>,
    /// Position of a custom player.
    #[serde(default)]
    pub position: Option<String>,
}

/// Player not present in the roster, described inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPlayer {
    /// Trimmed first name.
    pub first_name: String,
    /// Trimmed last name.
    pub last_name: String,
    /// Jersey number, 0 when unknown.
    pub number: u32,
    /// Position, defaulted per role.
    pub position: String,
}

/// Resolved scorer or assist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Participant {
    /// Roster player.
    Existing {
        /// Roster identifier.
        id: String,
    },
    /// Player described inline by the operator.
    Custom(CustomPlayer),
}

impl Participant {
    /// Reference mirrored on the board until the backend assigns an id.
    fn to_player_ref(&self) -> PlayerRef {
        match self {
            Participant::Existing { id } => PlayerRef::Id(id.clone()),
            Participant::Custom(player) => PlayerRef::Populated(PlayerEntity {
                id: CUSTOM_SENTINEL.to_string(),
                first_name: player.first_name.clone(),
                last_name: player.last_name.clone(),
                number: player.number,
                position: Some(player.position.clone()),
            }),
        }
    }
}

/// Goal submission ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRequest {
    /// Credited side.
    pub team: TeamSide,
    /// Goals added.
    pub delta: u32,
    /// Resolved scorer.
    pub scorer: Participant,
    /// Resolved assist, if complete.
    pub assist: Option<Participant>,
}

/// Reasons a goal submission is refused before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributionError {
    /// Neither a roster id nor a complete name was given for the scorer.
    #[error("a goal needs a roster scorer or the scorer's first and last name")]
    MissingScorer,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

impl ScorerSelection {
    /// Resolve the selection; `None` when it names nobody.
    fn resolve(&self, default_position: &str) -> Option<Participant> {
        if let Some(id) =
            non_blank(self.player_id.as_deref()).filter(|id| *id != CUSTOM_SENTINEL)
        {
            return Some(Participant::Existing { id: id.to_string() });
        }

        let first_name = non_blank(self.first_name.as_deref())?;
        let last_name = non_blank(self.last_name.as_deref())?;
        Some(Participant::Custom(CustomPlayer {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            number: self.number.unwrap_or(0),
            position: non_blank(self.position.as_deref())
                .unwrap_or(default_position)
                .to_string(),
        }))
    }
}

/// Build a score request. Fails when the scorer is unspecified; an incomplete
/// assist is dropped.
pub fn resolve_goal(
    team: TeamSide,
    delta: u32,
    scorer: &ScorerSelection,
    assist: Option<&ScorerSelection>,
) -> Result<ScoreRequest, AttributionError> {
    let scorer = scorer
        .resolve(SCORER_POSITION)
        .ok_or(AttributionError::MissingScorer)?;
    let assist = assist.and_then(|assist| assist.resolve(ASSIST_POSITION));

    Ok(ScoreRequest {
        team,
        delta,
        scorer,
        assist,
    })
}

impl ScoreRequest {
    /// Participants mirrored on the board once the backend acknowledged the goal.
    pub fn credit(&self) -> GoalCredit {
        GoalCredit {
            scorer: self.scorer.to_player_ref(),
            assist: self.assist.as_ref().map(Participant::to_player_ref),
        }
    }

    /// Wire body for `PUT /live-matches/{id}/score`; custom players are
    /// attached to `team_id`.
    pub fn into_document(self, team_id: &str) -> ScoreDocument {
        let (scorer_id, scorer_custom) = split(self.scorer, team_id);
        let (assist_id, assist_custom) = match self.assist {
            Some(assist) => split(assist, team_id),
            None => (None, None),
        };

        ScoreDocument {
            team: self.team,
            delta: self.delta,
            scorer_id,
            scorer_custom,
            assist_id,
            assist_custom,
        }
    }
}

fn split(
    participant: Participant,
    team_id: &str,
) -> (Option<String>, Option<CustomPlayerDocument>) {
    match participant {
        Participant::Existing { id } => (Some(id), None),
        Participant::Custom(player) => (
            None,
            Some(CustomPlayerDocument {
                first_name: player.first_name,
                last_name: player.last_name,
                number: player.number,
                team: team_id.to_string(),
                position: player.position,
            }),
        ),
    }
}
