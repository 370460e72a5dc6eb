use time::OffsetDateTime;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

use crate::{
    error::ServiceError,
    services::sse_events::{
        broadcast_clock_tick, broadcast_matches_refreshed, broadcast_system_status,
    },
    state::{SharedState, live_match::LiveMatch},
};

/// Handles of the poller and ticker; dropping the guard stops both timers.
pub struct BackgroundTasks {
    poller: JoinHandle<()>,
    ticker: JoinHandle<()>,
}

impl BackgroundTasks {
    /// Whether both timers are still scheduled.
    pub fn is_running(&self) -> bool {
        !self.poller.is_finished() && !self.ticker.is_finished()
    }
}

impl Drop for BackgroundTasks {
    fn drop(&mut self) {
        self.poller.abort();
        self.ticker.abort();
    }
}

/// Start the periodic refetch and the clock ticker.
pub fn spawn(state: SharedState) -> BackgroundTasks {
    let poller = tokio::spawn(run_poller(state.clone()));
    let ticker = tokio::spawn(run_ticker(state));
    BackgroundTasks { poller, ticker }
}

async fn run_poller(state: SharedState) {
    let mut timer = interval(state.config().poll_interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        timer.tick().await;
        // failures are logged by refresh_board; the next period retries
        let _ = refresh_board(&state).await;
    }
}

async fn run_ticker(state: SharedState) {
    let mut timer = interval(state.config().tick_interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        timer.tick().await;
        tick_clocks(&state, OffsetDateTime::now_utc()).await;
    }
}

/// Replace the board with the backend's match list and broadcast the snapshot.
///
/// On failure the previous board stays in place.
pub async fn refresh_board(state: &SharedState) -> Result<usize, ServiceError> {
    let fetched = state.backend().list_live_matches().await;

    let entities = match fetched {
        Ok(entities) => entities,
        Err(err) => {
            warn!(error = %err, "failed to refresh live matches; keeping previous board");
            if state.update_degraded(true) {
                broadcast_system_status(state, true);
            }
            return Err(err.into());
        }
    };

    if state.update_degraded(false) {
        info!("league backend reachable again");
        broadcast_system_status(state, false);
    }

    let now = OffsetDateTime::now_utc();
    let matches = entities.into_iter().map(LiveMatch::from).collect::<Vec<_>>();
    let snapshot = {
        let mut board = state.board().write().await;
        board.replace_all(matches, now);
        board.snapshot(now)
    };

    let count = snapshot.len();
    debug!(count, "live board refreshed");
    broadcast_matches_refreshed(state, snapshot, now);
    Ok(count)
}

/// Recompute running clocks at `now`; returns how many were broadcast.
pub async fn tick_clocks(state: &SharedState, now: OffsetDateTime) -> usize {
    let clocks = {
        let board = state.board().read().await;
        if !board.has_running_clock() {
            return 0;
        }
        board.running_clocks(now)
    };

    let count = clocks.len();
    broadcast_clock_tick(state, clocks, now);
    count
}
