use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Check the league backend and report alongside the board size.
///
/// The check result is reported but does not flip the degraded flag; only the
/// poller does that.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let reachable = match state.backend().health_check().await {
        Ok(()) => !state.is_degraded(),
        Err(err) => {
            warn!(error = %err, "league backend health check failed");
            false
        }
    };

    let live_matches = state.board().read().await.len();
    HealthResponse::new(reachable, live_matches)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        services::board_supervisor::refresh_board,
        state::{AppState, test_support::RecordingBackend},
    };

    #[tokio::test]
    async fn reports_degraded_until_first_refresh() {
        let backend = Arc::new(RecordingBackend::default());
        let state = AppState::new(AppConfig::default(), backend.clone());
        assert_eq!(health_status(&state).await.status, "degraded");

        refresh_board(&state).await.unwrap();
        let health = health_status(&state).await;
        assert_eq!(health.status, "ok");
        assert!(health.backend_reachable);
        assert_eq!(health.live_matches, 0);
    }

    #[tokio::test]
    async fn unreachable_backend_is_degraded() {
        let backend = Arc::new(RecordingBackend::default());
        let state = AppState::new(AppConfig::default(), backend.clone());
        refresh_board(&state).await.unwrap();

        *backend.reject.lock().unwrap() = Some((503, "maintenance".into()));
        assert_eq!(health_status(&state).await.status, "degraded");
    }
}
