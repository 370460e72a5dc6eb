//! Match clock reconstruction.
//!
//! The displayed playing time is always derived from the timestamps persisted by
//! the backend and a fresh `now`. Nothing here keeps a running counter, so a
//! missed tick corrects itself on the next computation.

use time::OffsetDateTime;

use crate::state::state_machine::MatchStatus;

/// Timestamp inputs needed to compute the playing time of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    /// Current status of the match.
    pub status: MatchStatus,
    /// When the match first went live.
    pub start_time: Option<OffsetDateTime>,
    /// When the match was last paused or suspended.
    pub paused_time: Option<OffsetDateTime>,
    /// Accumulated paused seconds excluded from the playing time.
    pub resume_offset: u64,
    /// Playing time recorded when the match finished.
    pub final_elapsed: Option<u64>,
}

impl ClockReading {
    /// Whether the clock advances with wall-clock time.
    pub fn is_running(&self) -> bool {
        self.status == MatchStatus::Live && self.start_time.is_some()
    }
}

/// Seconds of playing time at `now`.
pub fn elapsed_seconds(reading: &ClockReading, now: OffsetDateTime) -> u64 {
    let Some(start) = reading.start_time else {
        return reading.final_elapsed.unwrap_or(0);
    };

    match reading.status {
        MatchStatus::NotStarted => 0,
        MatchStatus::Live => since(start, now, reading.resume_offset),
        MatchStatus::Paused | MatchStatus::Suspended => match reading.paused_time {
            Some(paused) => since(start, paused, reading.resume_offset),
            // A paused match without a pause timestamp is frozen at its start.
            None => 0,
        },
        MatchStatus::Finished => match (reading.final_elapsed, reading.paused_time) {
            (Some(frozen), _) => frozen,
            (None, Some(paused)) => since(start, paused, reading.resume_offset),
            (None, None) => 0,
        },
    }
}

fn since(start: OffsetDateTime, until: OffsetDateTime, resume_offset: u64) -> u64 {
    let whole_seconds = (until - start).whole_seconds();
    let seconds = u64::try_from(whole_seconds).unwrap_or(0);
    seconds.saturating_sub(resume_offset)
}

/// Render playing time as `MM:SS`; minutes are not wrapped at 60.
pub fn format_clock(elapsed: u64) -> String {
    format!("{:02}:{:02}", elapsed / 60, elapsed % 60)
}

/// Minute a goal scored at `elapsed` seconds is credited to (first minute is 1).
pub fn goal_minute(elapsed: u64) -> u32 {
    u32::try_from(elapsed / 60 + 1).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::datetime};

    use super::*;

    const KICK_OFF: OffsetDateTime = datetime!(2024-05-04 16:00:00 UTC);

    fn reading(status: MatchStatus) -> ClockReading {
        ClockReading {
            status,
            start_time: Some(KICK_OFF),
            paused_time: None,
            resume_offset: 0,
            final_elapsed: None,
        }
    }

    #[test]
    fn not_started_reads_zero() {
        let mut clock = reading(MatchStatus::NotStarted);
        clock.start_time = None;
        assert_eq!(elapsed_seconds(&clock, KICK_OFF + Duration::hours(1)), 0);
        assert!(!clock.is_running());
    }

    #[test]
    fn live_clock_is_monotonic_in_now() {
        let mut clock = reading(MatchStatus::Live);
        clock.resume_offset = 42;

        let mut previous = 0;
        for second in (0..4_000).step_by(7) {
            let value = elapsed_seconds(&clock, KICK_OFF + Duration::seconds(second));
            assert!(value >= previous);
            previous = value;
        }
        assert_eq!(
            elapsed_seconds(&clock, KICK_OFF + Duration::seconds(142)),
            100
        );
    }

    #[test]
    fn live_clock_floors_sub_second_precision() {
        let clock = reading(MatchStatus::Live);
        let now = KICK_OFF + Duration::milliseconds(61_999);
        assert_eq!(elapsed_seconds(&clock, now), 61);
    }

    #[test]
    fn paused_and_suspended_clocks_ignore_now() {
        for status in [MatchStatus::Paused, MatchStatus::Suspended] {
            let mut clock = reading(status);
            clock.paused_time = Some(KICK_OFF + Duration::seconds(125));

            let early = elapsed_seconds(&clock, KICK_OFF + Duration::seconds(130));
            let late = elapsed_seconds(&clock, KICK_OFF + Duration::hours(3));
            assert_eq!(early, 125);
            assert_eq!(late, 125);
        }
    }

    #[test]
    fn finished_clock_uses_recorded_value() {
        let mut clock = reading(MatchStatus::Finished);
        clock.final_elapsed = Some(5_400);
        clock.paused_time = Some(KICK_OFF + Duration::seconds(10));
        assert_eq!(elapsed_seconds(&clock, KICK_OFF + Duration::days(1)), 5_400);

        clock.final_elapsed = None;
        assert_eq!(elapsed_seconds(&clock, KICK_OFF + Duration::days(1)), 10);
    }

    #[test]
    fn clock_never_goes_negative() {
        let mut clock = reading(MatchStatus::Live);
        clock.resume_offset = 500;
        assert_eq!(elapsed_seconds(&clock, KICK_OFF + Duration::seconds(10)), 0);
        assert_eq!(elapsed_seconds(&clock, KICK_OFF - Duration::seconds(10)), 0);
    }

    #[test]
    fn format_pads_and_does_not_wrap_minutes() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(125), "02:05");
        assert_eq!(format_clock(3_600), "60:00");
        assert_eq!(format_clock(7_265), "121:05");
    }

    #[test]
    fn goal_minute_starts_at_one() {
        assert_eq!(goal_minute(0), 1);
        assert_eq!(goal_minute(59), 1);
        assert_eq!(goal_minute(60), 2);
        assert_eq!(goal_minute(5_399), 90);
    }
}
