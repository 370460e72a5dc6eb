pub mod board;
pub mod clock;
pub mod live_match;
mod sse;
/// Per-match plan, apply and abort of operator commands.
pub mod state_machine;
/// Command execution with broadcast on success.
pub mod transitions;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use time::OffsetDateTime;
use tokio::sync::{RwLock, watch};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    dao::league_backend::LeagueBackend,
    error::ServiceError,
    state::{
        board::LiveBoard,
        live_match::MatchChange,
        state_machine::{MatchCommand, MatchStatus},
    },
};

pub use self::sse::{SseHub, SseState};
pub use self::state_machine::{AbortError, ApplyError, Plan, PlanError, PlanId, Snapshot};

/// Handle to the application state shared by routes and background tasks.
pub type SharedState = Arc<AppState>;

/// Central application state: injected configuration, the backend handle and
/// the live board mirror.
pub struct AppState {
    config: AppConfig,
    backend: Arc<dyn LeagueBackend>,
    sse: SseState,
    board: RwLock<LiveBoard>,
    admin_sessions: DashMap<String, Instant>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application reports degraded mode until the first successful fetch.
    pub fn new(config: AppConfig, backend: Arc<dyn LeagueBackend>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            backend,
            sse: SseState::new(64, 16),
            board: RwLock::new(LiveBoard::new()),
            admin_sessions: DashMap::new(),
            degraded: degraded_tx,
        })
    }

    /// Configuration the application was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle to the authoritative league backend.
    pub fn backend(&self) -> Arc<dyn LeagueBackend> {
        self.backend.clone()
    }

    /// Shared live board.
    pub fn board(&self) -> &RwLock<LiveBoard> {
        &self.board
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        self.sse.public()
    }

    /// Broadcast hub used for the admin SSE stream.
    pub fn admin_sse(&self) -> &SseHub {
        self.sse.admin()
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Record whether the backend answered the last fetch; returns true when the flag flipped.
    pub fn update_degraded(&self, value: bool) -> bool {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }

    /// Whether `token` was verified as an admin token within the cache TTL.
    pub fn is_cached_admin(&self, token: &str) -> bool {
        let ttl = self.config.admin_cache_ttl;
        let fresh = self
            .admin_sessions
            .get(token)
            .is_some_and(|verified_at| verified_at.elapsed() < ttl);
        if !fresh {
            self.admin_sessions.remove(token);
        }
        fresh
    }

    /// Remember `token` as a verified admin token, dropping entries past the TTL.
    pub fn remember_admin(&self, token: &str) {
        let ttl = self.config.admin_cache_ttl;
        if ttl.is_zero() {
            return;
        }
        self.admin_sessions
            .retain(|_, verified_at| verified_at.elapsed() < ttl);
        self.admin_sessions.insert(token.to_string(), Instant::now());
    }

    /// Forget `token`, e.g. after the backend rejected it.
    pub fn forget_admin(&self, token: &str) {
        self.admin_sessions.remove(token);
    }

    fn transition_timeout(&self) -> Option<Duration> {
        let limit = self.config.transition_timeout;
        (!limit.is_zero()).then_some(limit)
    }

    /// Plan a command on the machine of `match_id`.
    async fn plan_transition(
        &self,
        match_id: &str,
        command: MatchCommand,
    ) -> Result<Plan, ServiceError> {
        let mut board = self.board.write().await;
        let entry = board
            .get_mut(match_id)
            .ok_or_else(|| ServiceError::NotFound(format!("live match `{match_id}`")))?;
        Ok(entry.machine.plan(command)?)
    }

    /// Commit an acknowledged plan and mirror its effects.
    ///
    /// When the board was synced while the command was in flight the backend
    /// view already on the board wins and its status is returned instead.
    async fn apply_planned_transition(
        &self,
        match_id: &str,
        plan_id: PlanId,
        change: &MatchChange,
        now: OffsetDateTime,
    ) -> Result<MatchStatus, ApplyError> {
        let mut board = self.board.write().await;
        let Some(entry) = board.get_mut(match_id) else {
            return Err(ApplyError::NoPending);
        };
        match entry.machine.apply(plan_id) {
            Ok(status) => {
                entry.live_match.apply_change(change, now);
                Ok(status)
            }
            Err(ApplyError::VersionMismatch { expected, actual }) => {
                info!(
                    match_id,
                    command = ?change.command,
                    expected,
                    actual,
                    "board synced while command was in flight; keeping synced view"
                );
                Ok(entry.machine.status())
            }
            Err(err) => Err(err),
        }
    }

    async fn abort_transition(&self, match_id: &str, plan_id: PlanId) -> Result<(), AbortError> {
        let mut board = self.board.write().await;
        match board.get_mut(match_id) {
            Some(entry) => entry.machine.abort(plan_id),
            None => Err(AbortError::NoPending),
        }
    }

    /// Snapshot the machine of a single match.
    pub async fn snapshot(&self, match_id: &str) -> Option<Snapshot> {
        let board = self.board.read().await;
        board.get(match_id).map(|entry| entry.machine.snapshot())
    }

    /// Validate a change locally, run the remote `work`, then commit or abort.
    ///
    /// The board is only mutated after `work` succeeded. Commands on the same
    /// match are serialised by the machine's single pending plan.
    pub async fn run_transition<C, F, Fut, T>(
        &self,
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
        let Plan { id: plan_id, .. } = self.plan_transition(match_id, command).await?;

        let work_future = work();
        let outcome = if let Some(limit) = self.transition_timeout() {
            match timeout(limit, work_future).await {
                Ok(result) => result,
                Err(_) => {
                    if let Err(abort_err) = self.abort_transition(match_id, plan_id).await {
                        warn!(
                            match_id,
                            command = ?command,
                            plan_id = %plan_id,
                            error = ?abort_err,
                            "failed to abort transition after timeout"
                        );
                    }
                    return Err(ServiceError::Timeout);
                }
            }
        } else {
            work_future.await
        };

        match outcome {
            Ok(value) => {
                let next = self
                    .apply_planned_transition(match_id, plan_id, &change, now)
                    .await?;
                Ok((value, next))
            }
            Err(err) => {
                if let Err(abort_err) = self.abort_transition(match_id, plan_id).await {
                    warn!(
                        match_id,
                        command = ?command,
                        plan_id = %plan_id,
                        error = ?abort_err,
                        "failed to abort transition after work error"
                    );
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use futures::future::BoxFuture;

    use crate::dao::{
        backend::{BackendError, BackendResult},
        league_backend::{AccessToken, LeagueBackend},
        models::*,
    };

    /// In-memory backend recording calls; every call succeeds unless `reject` is set.
    #[derive(Default)]
    pub struct RecordingBackend {
        pub matches: Mutex<Vec<LiveMatchEntity>>,
        pub calls: Mutex<Vec<String>>,
        pub reject: Mutex<Option<(u16, String)>>,
        pub profile: Mutex<Option<UserProfileEntity>>,
    }

    impl RecordingBackend {
        pub fn with_matches(matches: Vec<LiveMatchEntity>) -> Self {
            Self {
                matches: Mutex::new(matches),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn outcome(&self, call: String) -> BackendResult<()> {
            self.calls.lock().unwrap().push(call);
            match self.reject.lock().unwrap().clone() {
                Some((status, message)) => Err(BackendError::Rejected { status, message }),
                None => Ok(()),
            }
        }

        fn ready<T: Send + 'static>(
            value: BackendResult<T>,
        ) -> BoxFuture<'static, BackendResult<T>> {
            Box::pin(async move { value })
        }
    }

    impl LeagueBackend for RecordingBackend {
        fn list_live_matches(&self) -> BoxFuture<'static, BackendResult<Vec<LiveMatchEntity>>> {
            let result = self
                .outcome("GET /live-matches".into())
                .map(|()| self.matches.lock().unwrap().clone());
            Self::ready(result)
        }

        fn create_live_match(
            &self,
            _token: AccessToken,
            document: NewLiveMatchDocument,
        ) -> BoxFuture<'static, BackendResult<()>> {
            Self::ready(self.outcome(format!(
                "POST /live-matches {} vs {}",
                document.team_a, document.team_b
            )))
        }

        fn send_match_action(
            &self,
            _token: AccessToken,
            match_id: String,
            action: &'static str,
            body: Option<ActionBody>,
        ) -> BoxFuture<'static, BackendResult<()>> {
            let body = body
                .map(|body| serde_json::to_string(&body).unwrap_or_default())
                .unwrap_or_default();
            Self::ready(self.outcome(format!("POST /live-matches/{match_id}/{action} {body}")))
        }

        fn register_goal(
            &self,
            _token: AccessToken,
            match_id: String,
            document: ScoreDocument,
        ) -> BoxFuture<'static, BackendResult<()>> {
            let body = serde_json::to_string(&document).unwrap_or_default();
            Self::ready(self.outcome(format!("PUT /live-matches/{match_id}/score {body}")))
        }

        fn team_lineup(
            &self,
            team_id: String,
        ) -> BoxFuture<'static, BackendResult<Vec<PlayerEntity>>> {
            let result = self
                .outcome(format!("GET /players/lineup/{team_id}"))
                .map(|()| Vec::new());
            Self::ready(result)
        }

        fn list_teams(&self) -> BoxFuture<'static, BackendResult<Vec<TeamEntity>>> {
            Self::ready(self.outcome("GET /team".into()).map(|()| Vec::new()))
        }

        fn create_team(
            &self,
            _token: AccessToken,
            document: NewTeamDocument,
        ) -> BoxFuture<'static, BackendResult<()>> {
            Self::ready(self.outcome(format!("POST /team {}", document.name)))
        }

        fn create_players(
            &self,
            _token: AccessToken,
            documents: Vec<NewPlayerDocument>,
        ) -> BoxFuture<'static, BackendResult<()>> {
            Self::ready(self.outcome(format!("POST /players/bulk {}", documents.len())))
        }

        fn list_tournaments(&self) -> BoxFuture<'static, BackendResult<Vec<TournamentEntity>>> {
            Self::ready(self.outcome("GET /tournaments".into()).map(|()| Vec::new()))
        }

        fn create_tournament(
            &self,
            _token: AccessToken,
            document: NewTournamentDocument,
        ) -> BoxFuture<'static, BackendResult<()>> {
            Self::ready(self.outcome(format!("POST /tournaments {}", document.name)))
        }

        fn list_history(&self) -> BoxFuture<'static, BackendResult<Vec<HistoryMatchEntity>>> {
            Self::ready(self.outcome("GET /api/matches".into()).map(|()| Vec::new()))
        }

        fn create_history_match(
            &self,
            _token: AccessToken,
            document: NewHistoryMatchDocument,
        ) -> BoxFuture<'static, BackendResult<()>> {
            Self::ready(self.outcome(format!("POST /api/matches {}", document.goals.len())))
        }

        fn standings(
            &self,
            tournament_id: String,
        ) -> BoxFuture<'static, BackendResult<Vec<StandingEntity>>> {
            let result = self
                .outcome(format!("GET /team-tournament-standings/{tournament_id}/standings"))
                .map(|()| Vec::new());
            Self::ready(result)
        }

        fn upcoming_matches(
            &self,
            tournament_id: Option<String>,
            limit: u32,
        ) -> BoxFuture<'static, BackendResult<Vec<ScheduledMatchEntity>>> {
            let result = self
                .outcome(format!(
                    "GET /scheduled-matches/upcoming {} {limit}",
                    tournament_id.unwrap_or_default()
                ))
                .map(|()| Vec::new());
            Self::ready(result)
        }

        fn user_profile(
            &self,
            _token: AccessToken,
        ) -> BoxFuture<'static, BackendResult<UserProfileEntity>> {
            let profile = self.profile.lock().unwrap().clone();
            let result = self
                .outcome("GET /api/users/profile".into())
                .and_then(|()| {
                    profile.ok_or(BackendError::Rejected {
                        status: 401,
                        message: "invalid token".into(),
                    })
                });
            Self::ready(result)
        }

        fn current_user(
            &self,
            _token: AccessToken,
        ) -> BoxFuture<'static, BackendResult<serde_json::Value>> {
            Self::ready(
                self.outcome("GET /api/users".into())
                    .map(|()| serde_json::Value::Null),
            )
        }

        fn sync_user(
            &self,
            _token: AccessToken,
            document: UserSyncDocument,
        ) -> BoxFuture<'static, BackendResult<serde_json::Value>> {
            Self::ready(
                self.outcome(format!("POST /api/users {}", document.auth0_id))
                    .map(|()| serde_json::Value::Null),
            )
        }

        fn health_check(&self) -> BoxFuture<'static, BackendResult<()>> {
            Self::ready(self.outcome("HEAD /tournaments".into()))
        }
    }
}
