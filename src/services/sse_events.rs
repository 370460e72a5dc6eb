use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;

use crate::{
    dto::{
        common::{ClockView, MatchView},
        format_timestamp,
        sse::{
            ClockTickEvent, CommandAppliedEvent, MatchesRefreshedEvent, ServerEvent, SystemStatus,
        },
    },
    state::{
        SharedState,
        state_machine::{MatchCommand, MatchStage, MatchStatus},
    },
};

/// Full board after an authoritative fetch.
pub const EVENT_MATCHES_REFRESHED: &str = "matches.refreshed";
/// Clocks of running matches.
pub const EVENT_CLOCK_TICK: &str = "clock.tick";
/// Operator command acknowledged by the backend.
pub const EVENT_COMMAND_APPLIED: &str = "match.command";
/// Backend reachability changed.
pub const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast a fresh board snapshot to viewers and operators.
pub fn broadcast_matches_refreshed(
    state: &SharedState,
    matches: Vec<MatchView>,
    refreshed_at: OffsetDateTime,
) {
    let payload = MatchesRefreshedEvent {
        refreshed_at: format_timestamp(refreshed_at),
        matches,
    };
    send_public_event(state, EVENT_MATCHES_REFRESHED, &payload);
    send_admin_event(state, EVENT_MATCHES_REFRESHED, &payload);
}

/// Broadcast recomputed clocks of running matches.
pub fn broadcast_clock_tick(state: &SharedState, clocks: Vec<ClockView>, at: OffsetDateTime) {
    let payload = ClockTickEvent {
        at: format_timestamp(at),
        clocks,
    };
    send_public_event(state, EVENT_CLOCK_TICK, &payload);
}

/// Notify operators that the backend acknowledged `command`.
pub fn broadcast_command_applied(
    state: &SharedState,
    match_id: &str,
    command: MatchCommand,
    status: MatchStatus,
    stage: MatchStage,
) {
    let payload = CommandAppliedEvent {
        match_id: match_id.to_string(),
        action: command.action().to_string(),
        status,
        stage,
    };
    send_admin_event(state, EVENT_COMMAND_APPLIED, &payload);
}

/// Broadcast a backend reachability change.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    send_public_event(state, EVENT_SYSTEM_STATUS, &payload);
    send_admin_event(state, EVENT_SYSTEM_STATUS, &payload);
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}

fn send_admin_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.admin_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize admin SSE payload"),
    }
}
