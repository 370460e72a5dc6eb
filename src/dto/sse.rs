use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::common::{ClockView, MatchView},
    state::state_machine::{MatchStage, MatchStatus},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE `event:` name; the default message type when absent.
    pub event: Option<String>,
    /// Serialized JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream (`public` or `admin`).
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the last fetch from the league backend failed.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend becomes reachable or unreachable.
pub struct SystemStatus {
    /// True when the league backend cannot be reached.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast after every authoritative refetch of the match list.
pub struct MatchesRefreshedEvent {
    /// RFC 3339 timestamp of the fetch.
    pub refreshed_at: String,
    /// Matches as fetched.
    pub matches: Vec<MatchView>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast every tick while at least one clock is running.
pub struct ClockTickEvent {
    /// RFC 3339 timestamp the clocks were computed at.
    pub at: String,
    /// One entry per running clock.
    pub clocks: Vec<ClockView>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast to operators once the backend acknowledged a command.
pub struct CommandAppliedEvent {
    /// Match the command targeted.
    pub match_id: String,
    /// Command name, e.g. `pause`.
    pub action: String,
    /// Status after the command.
    pub status: MatchStatus,
    /// Stage after the command.
    pub stage: MatchStage,
}
