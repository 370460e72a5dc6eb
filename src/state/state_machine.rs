use std::{
    fmt,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status of a live match as persisted by the league backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Created, clock not running.
    NotStarted,
    /// Clock running.
    Live,
    /// Clock frozen by the operator; can be resumed.
    Paused,
    /// Clock frozen because play was interrupted.
    Suspended,
    /// Match over. `finish` is a legacy literal for the same status.
    #[serde(alias = "finish")]
    Finished,
}

impl MatchStatus {
    /// Wire literal of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::NotStarted => "not_started",
            MatchStatus::Live => "live",
            MatchStatus::Paused => "paused",
            MatchStatus::Suspended => "suspended",
            MatchStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-phase of a match. Ordered: a match only ever moves to a later stage.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    /// Regular playing time.
    #[default]
    Regular,
    /// Extra time after a draw.
    ExtraTime,
    /// Penalty shoot-out.
    Penalties,
}

impl MatchStage {
    /// Wire literal of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStage::Regular => "regular",
            MatchStage::ExtraTime => "extra_time",
            MatchStage::Penalties => "penalties",
        }
    }
}

/// Side of the fixture a goal is credited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TeamSide {
    /// Home side (`teamA`).
    A,
    /// Away side (`teamB`).
    B,
}

/// Operator commands that can be issued against a live match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCommand {
    /// Kick off: `not_started -> live`.
    Start,
    /// Freeze the clock: `live -> paused`.
    Pause,
    /// Restart the clock: `paused -> live`.
    Resume,
    /// Interrupt play: `live | paused -> suspended`.
    Suspend,
    /// Move to a later stage without touching the status.
    Stage(MatchStage),
    /// End the match: `live | paused -> finished`.
    Finish,
    /// Register `delta` goals for `team` while live.
    Score {
        /// Credited side.
        team: TeamSide,
        /// Number of goals added to the side's score.
        delta: u32,
    },
}

impl MatchCommand {
    /// Action segment used in `POST /live-matches/{id}/{action}`.
    pub fn action(&self) -> &'static str {
        match self {
            MatchCommand::Start => "start",
            MatchCommand::Pause => "pause",
            MatchCommand::Resume => "resume",
            MatchCommand::Suspend => "suspend",
            MatchCommand::Stage(_) => "stage",
            MatchCommand::Finish => "finish",
            MatchCommand::Score { .. } => "score",
        }
    }
}

/// Why a command was refused before reaching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The command is not valid from the current status.
    NotAllowedFromStatus,
    /// A stage change must move strictly forward.
    StageNotForward {
        /// Stage the match is currently in.
        current: MatchStage,
    },
    /// A score command must add at least one goal.
    ZeroDelta,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotAllowedFromStatus => f.write_str("not allowed from this status"),
            RejectReason::StageNotForward { current } => {
                write!(f, "stage can only advance past `{}`", current.as_str())
            }
            RejectReason::ZeroDelta => f.write_str("score delta must be positive"),
        }
    }
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: `{}` cannot be applied while `{from}` ({reason})", .command.action())]
pub struct InvalidTransition {
    /// The status the match was in when the command was requested.
    pub from: MatchStatus,
    /// The refused command.
    pub command: MatchCommand,
    /// Details of the refusal.
    pub reason: RejectReason,
}

/// Errors that can occur when planning a state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A transition is already pending and must be applied or aborted.
    AlreadyPending {
        /// Command waiting for the backend.
        command: MatchCommand,
        /// How long it has been waiting.
        pending_for: Duration,
    },
    /// The requested transition is not valid from the current status.
    InvalidTransition(InvalidTransition),
}

/// Errors that can occur when applying a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
    /// The mirror was synchronised with the backend since the plan was created.
    VersionMismatch {
        /// Version when plan was created.
        expected: usize,
        /// Current version.
        actual: usize,
    },
}

/// Errors that can occur when aborting a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
}

/// Unique identifier for a planned state transition.
pub type PlanId = Uuid;

/// A validated transition waiting for the backend acknowledgement.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Unique identifier for this plan.
    pub id: PlanId,
    /// Status when the plan was made.
    pub from: MatchStatus,
    /// Status after the transition.
    pub to: MatchStatus,
    /// Stage after the transition.
    pub stage: MatchStage,
    /// Command that triggered this transition.
    pub command: MatchCommand,
    /// Version number after applying this transition.
    pub version_next: usize,
    /// Timestamp when this plan was created.
    pub pending_since: Instant,
}

/// Snapshot of a match state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Current status.
    pub status: MatchStatus,
    /// Current stage.
    pub stage: MatchStage,
    /// Version number (increments on each transition or sync).
    pub version: usize,
    /// Status the pending transition leads to, if any.
    pub pending: Option<MatchStatus>,
}

/// Mirror of a single match lifecycle, guarding which operator commands may be
/// sent to the backend.
#[derive(Debug, Clone)]
pub struct MatchStateMachine {
    status: MatchStatus,
    stage: MatchStage,
    version: usize,
    pending: Option<Plan>,
}

impl Default for MatchStateMachine {
    fn default() -> Self {
        Self::new(MatchStatus::NotStarted, MatchStage::Regular)
    }
}

impl MatchStateMachine {
    /// Build a mirror of a match in the given status and stage.
    pub fn new(status: MatchStatus, stage: MatchStage) -> Self {
        Self {
            status,
            stage,
            version: 0,
            pending: None,
        }
    }

    /// Current status.
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// Current stage.
    pub fn stage(&self) -> MatchStage {
        self.stage
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status,
            stage: self.stage,
            version: self.version,
            pending: self.pending.as_ref().map(|plan| plan.to),
        }
    }

    /// Plan a transition by validating that the command can be applied from the
    /// current status. Returns a Plan that can later be applied or aborted.
    pub fn plan(&mut self, command: MatchCommand) -> Result<Plan, PlanError> {
        if let Some(pending) = &self.pending {
            return Err(PlanError::AlreadyPending {
                command: pending.command,
                pending_for: pending.pending_since.elapsed(),
            });
        }

        let (to, stage) = self
            .compute_transition(command)
            .map_err(PlanError::InvalidTransition)?;

        let plan = Plan {
            id: Uuid::new_v4(),
            from: self.status,
            to,
            stage,
            command,
            version_next: self.version + 1,
            pending_since: Instant::now(),
        };

        self.pending = Some(plan.clone());

        Ok(plan)
    }

    /// Apply a planned transition once the backend has acknowledged it.
    pub fn apply(&mut self, plan_id: PlanId) -> Result<MatchStatus, ApplyError> {
        let plan = self.pending.take().ok_or(ApplyError::NoPending)?;

        if plan.id != plan_id {
            let expected_plan_id = plan.id;
            self.pending = Some(plan);
            return Err(ApplyError::IdMismatch {
                expected: expected_plan_id,
                got: plan_id,
            });
        }

        if self.version + 1 != plan.version_next {
            return Err(ApplyError::VersionMismatch {
                expected: plan.version_next,
                actual: self.version + 1,
            });
        }

        self.status = plan.to;
        self.stage = plan.stage;
        self.version = plan.version_next;

        Ok(self.status)
    }

    /// Abort a planned transition without applying it.
    pub fn abort(&mut self, plan_id: PlanId) -> Result<(), AbortError> {
        let plan = self.pending.as_ref().ok_or(AbortError::NoPending)?;

        if plan.id != plan_id {
            return Err(AbortError::IdMismatch {
                expected: plan.id,
                got: plan_id,
            });
        }

        self.pending = None;
        Ok(())
    }

    /// Overwrite the mirror with the values reported by the backend.
    ///
    /// A pending plan survives the sync but applying it fails with
    /// [`ApplyError::VersionMismatch`].
    pub fn sync(&mut self, status: MatchStatus, stage: MatchStage) {
        if self.status == status && self.stage == stage {
            return;
        }
        self.status = status;
        self.stage = stage;
        self.version += 1;
    }

    fn compute_transition(
        &self,
        command: MatchCommand,
    ) -> Result<(MatchStatus, MatchStage), InvalidTransition> {
        let reject = |reason| InvalidTransition {
            from: self.status,
            command,
            reason,
        };

        let next = match (self.status, command) {
            (MatchStatus::NotStarted, MatchCommand::Start) => (MatchStatus::Live, self.stage),
            (MatchStatus::Live, MatchCommand::Pause) => (MatchStatus::Paused, self.stage),
            (MatchStatus::Paused, MatchCommand::Resume) => (MatchStatus::Live, self.stage),
            (MatchStatus::Live | MatchStatus::Paused, MatchCommand::Suspend) => {
                (MatchStatus::Suspended, self.stage)
            }
            (MatchStatus::Live | MatchStatus::Paused, MatchCommand::Stage(target)) => {
                if target <= self.stage {
                    return Err(reject(RejectReason::StageNotForward {
                        current: self.stage,
                    }));
                }
                (self.status, target)
            }
            (MatchStatus::Live | MatchStatus::Paused, MatchCommand::Finish) => {
                (MatchStatus::Finished, self.stage)
            }
            (MatchStatus::Live, MatchCommand::Score { delta, .. }) => {
                if delta == 0 {
                    return Err(reject(RejectReason::ZeroDelta));
                }
                (MatchStatus::Live, self.stage)
            }
            _ => return Err(reject(RejectReason::NotAllowedFromStatus)),
        };

        Ok(next)
    }
}
