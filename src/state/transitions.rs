use time::OffsetDateTime;

use crate::{
    error::ServiceError,
    services::sse_events::broadcast_command_applied,
    state::{
        SharedState,
        live_match::MatchChange,
        state_machine::{MatchStage, MatchStatus},
    },
};

/// Run a match command through its state machine, then tell operators about it.
///
/// Nothing is broadcast when the command is refused locally or by the backend.
pub async fn run_transition_with_broadcast<C, F, Fut, T>(
    state: &SharedState,
    match_id: &str,
    change: C,
    now: OffsetDateTime,
    work: F,
) -> Result<(T, MatchStatus), ServiceError>
where
    C: Into<MatchChange>,
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, ServiceError>>,
{
    let change = change.into();
    let command = change.command;
    let (value, status) = state.run_transition(match_id, change, now, work).await?;
    let stage = state
        .snapshot(match_id)
        .await
        .map(|snapshot| snapshot.stage)
        .unwrap_or(MatchStage::Regular);
    broadcast_command_applied(state, match_id, command, status, stage);
    Ok((value, status))
}
