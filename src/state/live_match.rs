//! Local mirror of a live match as last reported by the backend.

use time::OffsetDateTime;

use crate::dao::models::{GoalEntity, LiveMatchEntity, PlayerRef, TeamRef, TournamentRef};
use crate::state::{
    clock::{self, ClockReading, goal_minute},
    state_machine::{MatchCommand, MatchStage, MatchStatus, TeamSide},
};

/// A live match with its lifecycle timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveMatch {
    /// Backend identifier.
    pub id: String,
    /// Home club.
    pub team_a: TeamRef,
    /// Away club.
    pub team_b: TeamRef,
    /// Goals credited to `team_a`.
    pub score_a: u32,
    /// Goals credited to `team_b`.
    pub score_b: u32,
    /// Goals in scoring order as stored by the backend.
    pub goals: Vec<GoalEntity>,
    /// Scheduled date as sent by the backend.
    pub date: Option<String>,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Current stage.
    pub stage: MatchStage,
    /// Kick-off instant.
    pub start_time: Option<OffsetDateTime>,
    /// When the clock was last frozen.
    pub paused_time: Option<OffsetDateTime>,
    /// Whole seconds spent paused before the last resume.
    pub resume_offset: u64,
    /// Clock value frozen by `finish`.
    pub final_elapsed: Option<u64>,
    /// Tournament the match belongs to.
    pub tournament: Option<TournamentRef>,
}

/// Scorer and assist of an acknowledged goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalCredit {
    /// Player credited with the goal.
    pub scorer: PlayerRef,
    /// Player credited with the assist.
    pub assist: Option<PlayerRef>,
}

/// A command plus what the mirror needs to reproduce its effects.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchChange {
    /// Command checked by the state machine.
    pub command: MatchCommand,
    /// Goal participants; only read for `Score`.
    pub credit: Option<GoalCredit>,
}

impl MatchChange {
    /// A `Score` command crediting `credit` for each goal.
    pub fn goal(team: TeamSide, delta: u32, credit: GoalCredit) -> Self {
        Self {
            command: MatchCommand::Score { team, delta },
            credit: Some(credit),
        }
    }
}

impl From<MatchCommand> for MatchChange {
    fn from(command: MatchCommand) -> Self {
        Self {
            command,
            credit: None,
        }
    }
}

impl From<LiveMatchEntity> for LiveMatch {
    fn from(entity: LiveMatchEntity) -> Self {
        Self {
            id: entity.id,
            team_a: entity.team_a,
            team_b: entity.team_b,
            score_a: entity.score_a,
            score_b: entity.score_b,
            goals: entity.goals,
            date: entity.date,
            status: entity.status,
            stage: entity.current_stage,
            start_time: entity.start_time,
            paused_time: entity.paused_time,
            resume_offset: whole_offset(entity.resume_offset),
            final_elapsed: entity.final_elapsed_seconds,
            tournament: entity.tournament,
        }
    }
}

/// Floor a possibly fractional, possibly garbage offset to whole seconds.
fn whole_offset(raw: f64) -> u64 {
    if raw.is_finite() && raw > 0.0 {
        raw.floor() as u64
    } else {
        0
    }
}

impl LiveMatch {
    /// Clock inputs of this match.
    pub fn clock_reading(&self) -> ClockReading {
        ClockReading {
            status: self.status,
            start_time: self.start_time,
            paused_time: self.paused_time,
            resume_offset: self.resume_offset,
            final_elapsed: self.final_elapsed,
        }
    }

    /// Playing time at `now`.
    pub fn elapsed_seconds(&self, now: OffsetDateTime) -> u64 {
        clock::elapsed_seconds(&self.clock_reading(), now)
    }

    /// Identifier of the club playing on `side`.
    pub fn team_id(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::A => self.team_a.id(),
            TeamSide::B => self.team_b.id(),
        }
    }

    /// Apply the timestamp effects of an acknowledged lifecycle command.
    pub fn apply_command(&mut self, command: MatchCommand, now: OffsetDateTime) {
        self.apply_change(&command.into(), now);
    }

    /// Apply the timestamp and score effects of an acknowledged change.
    ///
    /// The command must already have been validated by the match state machine.
    pub fn apply_change(&mut self, change: &MatchChange, now: OffsetDateTime) {
        match change.command {
            MatchCommand::Start => {
                self.status = MatchStatus::Live;
                self.start_time = Some(now);
                self.paused_time = None;
                self.resume_offset = 0;
            }
            MatchCommand::Pause => {
                self.status = MatchStatus::Paused;
                self.paused_time = Some(now);
            }
            MatchCommand::Resume => {
                if let Some(paused) = self.paused_time.take() {
                    let paused_for = u64::try_from((now - paused).whole_seconds()).unwrap_or(0);
                    self.resume_offset = self.resume_offset.saturating_add(paused_for);
                }
                self.status = MatchStatus::Live;
            }
            MatchCommand::Suspend => {
                if self.status != MatchStatus::Paused || self.paused_time.is_none() {
                    self.paused_time = Some(now);
                }
                self.status = MatchStatus::Suspended;
            }
            MatchCommand::Stage(stage) => {
                self.stage = stage;
            }
            MatchCommand::Finish => {
                self.final_elapsed = Some(self.elapsed_seconds(now));
                self.status = MatchStatus::Finished;
            }
            MatchCommand::Score { team, delta } => {
                // Without participants the next refetch brings score and goals together.
                if let Some(credit) = &change.credit {
                    self.record_goals(team, delta, credit, now);
                }
            }
        }
    }

    /// Append `delta` goals for `team` and bump its score by the same amount.
    fn record_goals(
        &mut self,
        team: TeamSide,
        delta: u32,
        credit: &GoalCredit,
        now: OffsetDateTime,
    ) {
        let minute = goal_minute(self.elapsed_seconds(now));
        let club = match team {
            TeamSide::A => self.team_a.clone(),
            TeamSide::B => self.team_b.clone(),
        };
        for _ in 0..delta {
            self.goals.push(GoalEntity {
                id: None,
                player: credit.scorer.clone(),
                assist: credit.assist.clone(),
                minute,
                team: club.clone(),
            });
        }
        match team {
            TeamSide::A => self.score_a = self.score_a.saturating_add(delta),
            TeamSide::B => self.score_b = self.score_b.saturating_add(delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::datetime};

    use super::*;
    use crate::state::clock::format_clock;

    const KICK_OFF: OffsetDateTime = datetime!(2024-05-04 16:00:00 UTC);

    fn fresh_match() -> LiveMatch {
        let entity: LiveMatchEntity = serde_json::from_value(serde_json::json!({
            "_id": "m1",
            "teamA": {"_id": "ta", "name": "Rivers"},
            "teamB": {"_id": "tb", "name": "Harbour"},
            "status": "not_started"
        }))
        .unwrap();
        entity.into()
    }

    fn at(seconds: i64) -> OffsetDateTime {
        KICK_OFF + Duration::seconds(seconds)
    }

    #[test]
    fn fractional_offsets_are_floored() {
        assert_eq!(whole_offset(12.9), 12);
        assert_eq!(whole_offset(-3.0), 0);
        assert_eq!(whole_offset(f64::NAN), 0);
    }

    #[test]
    fn pause_resume_cycle_keeps_clock_continuous() {
        let mut live = fresh_match();
        live.apply_command(MatchCommand::Start, at(0));
        assert_eq!(format_clock(live.elapsed_seconds(at(0))), "00:00");

        live.apply_command(MatchCommand::Pause, at(125));
        assert_eq!(format_clock(live.elapsed_seconds(at(125))), "02:05");
        assert_eq!(format_clock(live.elapsed_seconds(at(150))), "02:05");

        live.apply_command(MatchCommand::Resume, at(155));
        assert_eq!(live.resume_offset, 30);
        assert_eq!(live.paused_time, None);
        assert_eq!(format_clock(live.elapsed_seconds(at(155))), "02:05");
        assert_eq!(format_clock(live.elapsed_seconds(at(165))), "02:15");
    }

    #[test]
    fn suspend_from_paused_keeps_pause_timestamp() {
        let mut live = fresh_match();
        live.apply_command(MatchCommand::Start, at(0));
        live.apply_command(MatchCommand::Pause, at(60));
        live.apply_command(MatchCommand::Suspend, at(600));

        assert_eq!(live.status, MatchStatus::Suspended);
        assert_eq!(live.paused_time, Some(at(60)));
        assert_eq!(live.elapsed_seconds(at(9_000)), 60);
    }

    #[test]
    fn suspend_from_live_stamps_now() {
        let mut live = fresh_match();
        live.apply_command(MatchCommand::Start, at(0));
        live.apply_command(MatchCommand::Suspend, at(300));
        assert_eq!(live.paused_time, Some(at(300)));
    }

    #[test]
    fn finish_records_final_clock() {
        let mut live = fresh_match();
        live.apply_command(MatchCommand::Start, at(0));
        live.apply_command(MatchCommand::Pause, at(5_400));
        live.apply_command(MatchCommand::Finish, at(6_000));

        assert_eq!(live.status, MatchStatus::Finished);
        assert_eq!(live.final_elapsed, Some(5_400));
        assert_eq!(live.elapsed_seconds(at(90_000)), 5_400);
    }

    fn credit(scorer: &str) -> GoalCredit {
        GoalCredit {
            scorer: PlayerRef::Id(scorer.into()),
            assist: None,
        }
    }

    #[test]
    fn score_and_stage_only_touch_their_fields() {
        let mut live = fresh_match();
        live.apply_command(MatchCommand::Start, at(0));
        live.apply_change(&MatchChange::goal(TeamSide::B, 2, credit("p9")), at(10));
        live.apply_command(MatchCommand::Stage(MatchStage::ExtraTime), at(20));

        assert_eq!((live.score_a, live.score_b), (0, 2));
        assert_eq!(live.stage, MatchStage::ExtraTime);
        assert_eq!(live.status, MatchStatus::Live);
        assert_eq!(live.team_id(TeamSide::B), "tb");
    }

    #[test]
    fn acknowledged_goal_appends_to_goal_list() {
        let mut live = fresh_match();
        live.apply_command(MatchCommand::Start, at(0));
        let with_assist = GoalCredit {
            scorer: PlayerRef::Id("p1".into()),
            assist: Some(PlayerRef::Id("p2".into())),
        };
        live.apply_change(&MatchChange::goal(TeamSide::A, 1, with_assist), at(754));

        assert_eq!(live.score_a + live.score_b, live.goals.len() as u32);
        let goal = &live.goals[0];
        assert_eq!(goal.player.id(), "p1");
        assert_eq!(goal.assist.as_ref().map(PlayerRef::id), Some("p2"));
        assert_eq!(goal.team.id(), "ta");
        assert_eq!(goal.minute, goal_minute(754));
    }

    #[test]
    fn bare_score_command_waits_for_refetch() {
        let mut live = fresh_match();
        live.apply_command(MatchCommand::Start, at(0));
        live.apply_command(
            MatchCommand::Score {
                team: TeamSide::A,
                delta: 1,
            },
            at(30),
        );

        assert_eq!((live.score_a, live.score_b), (0, 0));
        assert!(live.goals.is_empty());
    }
}
