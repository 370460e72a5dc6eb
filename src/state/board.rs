//! In-memory list of live matches shared by the poller, the ticker and admin
//! commands.

use indexmap::IndexMap;
use time::OffsetDateTime;

use crate::{
    dto::common::{ClockView, MatchView},
    state::{
        clock::{format_clock, goal_minute},
        live_match::LiveMatch,
        state_machine::{MatchStateMachine, MatchStatus},
    },
};

/// A match together with the machine guarding its operator commands.
#[derive(Debug, Clone)]
pub struct BoardEntry {
    /// Last known match document plus local clock data.
    pub live_match: LiveMatch,
    /// Command guard of the match.
    pub machine: MatchStateMachine,
}

impl BoardEntry {
    fn new(live_match: LiveMatch) -> Self {
        let machine = MatchStateMachine::new(live_match.status, live_match.stage);
        Self {
            live_match,
            machine,
        }
    }
}

/// Ordered match list, replaced wholesale by each authoritative fetch.
#[derive(Debug, Default)]
pub struct LiveBoard {
    entries: IndexMap<String, BoardEntry>,
    refreshed_at: Option<OffsetDateTime>,
}

impl LiveBoard {
    /// Empty board, never refreshed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the board with `matches` (last write wins).
    ///
    /// Matches absent from `matches` are dropped. Machines of matches already on
    /// the board are synced so any in-flight plan can no longer be applied.
    pub fn replace_all(&mut self, matches: Vec<LiveMatch>, now: OffsetDateTime) {
        let mut previous = std::mem::take(&mut self.entries);

        for mut live_match in matches {
            let entry = match previous.swap_remove(&live_match.id) {
                Some(mut entry) => {
                    if live_match.status == MatchStatus::Finished
                        && live_match.final_elapsed.is_none()
                    {
                        live_match.final_elapsed = entry.live_match.final_elapsed;
                    }
                    entry
                        .machine
                        .sync(live_match.status, live_match.stage);
                    entry.live_match = live_match;
                    entry
                }
                None => BoardEntry::new(live_match),
            };
            self.entries.insert(entry.live_match.id.clone(), entry);
        }

        self.refreshed_at = Some(now);
    }

    /// Entry of `match_id`.
    pub fn get(&self, match_id: &str) -> Option<&BoardEntry> {
        self.entries.get(match_id)
    }

    /// Mutable entry of `match_id`.
    pub fn get_mut(&mut self, match_id: &str) -> Option<&mut BoardEntry> {
        self.entries.get_mut(match_id)
    }

    /// Number of matches on the board.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before the first fetch or when no match is live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the board was last replaced by a fetch.
    pub fn refreshed_at(&self) -> Option<OffsetDateTime> {
        self.refreshed_at
    }

    /// All matches in backend order with clocks evaluated at `now`.
    pub fn snapshot(&self, now: OffsetDateTime) -> Vec<MatchView> {
        self.entries
            .values()
            .map(|entry| MatchView::at(&entry.live_match, now))
            .collect()
    }

    /// Whether any clock on the board advances with wall-clock time.
    pub fn has_running_clock(&self) -> bool {
        self.entries
            .values()
            .any(|entry| entry.live_match.clock_reading().is_running())
    }

    /// Clock values of running matches at `now`.
    pub fn running_clocks(&self, now: OffsetDateTime) -> Vec<ClockView> {
        self.entries
            .values()
            .filter(|entry| entry.live_match.clock_reading().is_running())
            .map(|entry| {
                let elapsed = entry.live_match.elapsed_seconds(now);
                ClockView {
                    match_id: entry.live_match.id.clone(),
                    elapsed_seconds: elapsed,
                    clock: format_clock(elapsed),
                    minute: goal_minute(elapsed),
                }
            })
            .collect()
    }

    /// Iterate over every match on the board.
    pub fn matches(&self) -> impl Iterator<Item = &LiveMatch> {
        self.entries.values().map(|entry| &entry.live_match)
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::datetime};

    use super::*;
    use crate::{
        dao::models::LiveMatchEntity,
        state::state_machine::{ApplyError, MatchCommand},
    };

    const NOW: OffsetDateTime = datetime!(2024-05-04 16:00:00 UTC);

    fn live_match(id: &str, status: &str) -> LiveMatch {
        let mut json = serde_json::json!({
            "_id": id,
            "teamA": "ta",
            "teamB": "tb",
            "status": status,
        });
        if status != "not_started" {
            json["startTime"] = serde_json::json!("2024-05-04T15:00:00Z");
        }
        serde_json::from_value::<LiveMatchEntity>(json)
            .unwrap()
            .into()
    }

    #[test]
    fn replace_all_is_last_write_wins() {
        let mut board = LiveBoard::new();
        board.replace_all(vec![live_match("m1", "live"), live_match("m2", "not_started")], NOW);
        assert_eq!(board.len(), 2);

        board.replace_all(vec![live_match("m3", "paused")], NOW);
        assert_eq!(board.len(), 1);
        assert!(board.get("m1").is_none());
        assert_eq!(board.refreshed_at(), Some(NOW));
    }

    #[test]
    fn replace_all_keeps_backend_order() {
        let mut board = LiveBoard::new();
        board.replace_all(vec![live_match("m1", "live"), live_match("m2", "live")], NOW);
        board.replace_all(vec![live_match("m2", "live"), live_match("m1", "live")], NOW);

        let ids: Vec<_> = board.matches().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m2", "m1"]);
    }

    #[test]
    fn refresh_invalidates_in_flight_plans() {
        let mut board = LiveBoard::new();
        board.replace_all(vec![live_match("m1", "live")], NOW);

        let plan = board
            .get_mut("m1")
            .unwrap()
            .machine
            .plan(MatchCommand::Pause)
            .unwrap();
        board.replace_all(vec![live_match("m1", "suspended")], NOW);

        let result = board.get_mut("m1").unwrap().machine.apply(plan.id);
        assert!(matches!(result, Err(ApplyError::VersionMismatch { .. })));
    }

    #[test]
    fn finished_match_keeps_local_final_clock() {
        let mut board = LiveBoard::new();
        let mut finished = live_match("m1", "finished");
        finished.final_elapsed = Some(5_400);
        board.replace_all(vec![finished], NOW);

        board.replace_all(vec![live_match("m1", "finished")], NOW);
        let entry = board.get("m1").unwrap();
        assert_eq!(entry.live_match.final_elapsed, Some(5_400));
    }

    #[test]
    fn running_clocks_only_include_live_matches() {
        let mut board = LiveBoard::new();
        board.replace_all(
            vec![live_match("m1", "live"), live_match("m2", "not_started")],
            NOW,
        );
        assert!(board.has_running_clock());

        let clocks = board.running_clocks(NOW + Duration::seconds(5));
        assert_eq!(clocks.len(), 1);
        assert_eq!(clocks[0].match_id, "m1");
        assert_eq!(clocks[0].clock, "60:05");

        board.replace_all(vec![live_match("m2", "not_started")], NOW);
        assert!(!board.has_running_clock());
        assert!(board.running_clocks(NOW).is_empty());
    }

    #[test]
    fn snapshot_renders_clock_strings() {
        let mut board = LiveBoard::new();
        board.replace_all(vec![live_match("m1", "live")], NOW);
        let views = board.snapshot(NOW);
        assert_eq!(views[0].clock, "60:00");
        assert!(views[0].running);
    }
}
