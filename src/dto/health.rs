use serde::Serialize;
use utoipa::ToSchema;

/// Payload of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok", or "degraded" while the league backend cannot be reached.
    pub status: &'static str,
    /// Whether the league backend answered this request.
    pub backend_reachable: bool,
    /// Matches currently held on the live board.
    pub live_matches: usize,
}

impl HealthResponse {
    /// Report built from one reachability check.
    pub fn new(backend_reachable: bool, live_matches: usize) -> Self {
        Self {
            status: if backend_reachable { "ok" } else { "degraded" },
            backend_reachable,
            live_matches,
        }
    }
}
