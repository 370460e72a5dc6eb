//! Business logic behind the admin routes. Match commands go through the
//! per-match state machine before reaching the league backend; creations are
//! validated by their DTOs and forwarded as-is.

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::{
    dao::{
        league_backend::AccessToken,
        models::{
            ActionBody, NewHistoryGoalDocument, NewHistoryMatchDocument, NewLiveMatchDocument,
            NewPlayerDocument, NewTeamDocument, NewTournamentDocument,
        },
    },
    dto::{
        admin::{
            ActionResponse, CommandResponse, CreateClubRequest, CreateHistoryMatchRequest,
            CreateLiveMatchRequest, CreatePlayersRequest, CreateTournamentRequest, GoalRequest,
        },
        common::MatchView,
        public::LineupResponse,
    },
    error::ServiceError,
    services::{board_supervisor::refresh_board, goal_attribution::resolve_goal, public_service},
    state::{
        SharedState,
        live_match::MatchChange,
        state_machine::MatchCommand,
        transitions::run_transition_with_broadcast,
    },
};

/// Send a lifecycle command (`start`, `pause`, `resume`, `suspend`, `stage`,
/// `finish`) for `match_id`.
///
/// The command is checked against the local machine first; a refused command
/// never reaches the backend.
pub async fn run_command(
    state: &SharedState,
    token: AccessToken,
    match_id: String,
    command: MatchCommand,
) -> Result<CommandResponse, ServiceError> {
    if matches!(command, MatchCommand::Score { .. }) {
        return Err(ServiceError::InvalidInput(
            "goals are registered through the goals endpoint".into(),
        ));
    }

    let now = OffsetDateTime::now_utc();
    let body = match command {
        MatchCommand::Stage(stage) => Some(ActionBody::Stage { stage }),
        MatchCommand::Finish => Some(ActionBody::Finish {
            final_elapsed_seconds: elapsed_on_board(state, &match_id, now).await,
        }),
        _ => None,
    };

    let backend = state.backend();
    let remote_id = match_id.clone();
    let outcome = run_transition_with_broadcast(state, &match_id, command, now, move || {
        let request = backend.send_match_action(token, remote_id, command.action(), body);
        async move { request.await.map_err(ServiceError::from) }
    })
    .await;

    let status = settle(state, &match_id, outcome).await?.1;
    info!(%match_id, action = command.action(), %status, "match command acknowledged");

    Ok(CommandResponse {
        current: current_view(state, &match_id).await,
        match_id,
        action: command.action().to_string(),
        status,
    })
}

/// Register one or more goals for a side of a live match.
///
/// The scorer is resolved before anything else: a goal without a roster id or
/// a complete custom name is refused without any backend call.
pub async fn register_goal(
    state: &SharedState,
    token: AccessToken,
    match_id: String,
    request: GoalRequest,
) -> Result<CommandResponse, ServiceError> {
    let score = resolve_goal(
        request.team,
        request.delta,
        &request.scorer,
        request.assist.as_ref(),
    )?;

    let team_id = {
        let board = state.board().read().await;
        let entry = board
            .get(&match_id)
            .ok_or_else(|| ServiceError::NotFound(format!("live match `{match_id}`")))?;
        entry.live_match.team_id(request.team).to_string()
    };

    let change = MatchChange::goal(request.team, request.delta, score.credit());
    let command = change.command;
    let document = score.into_document(&team_id);
    debug!(%match_id, ?document, "registering goal");

    let backend = state.backend();
    let remote_id = match_id.clone();
    let outcome = run_transition_with_broadcast(
        state,
        &match_id,
        change,
        OffsetDateTime::now_utc(),
        move || {
            let request = backend.register_goal(token, remote_id, document);
            async move { request.await.map_err(ServiceError::from) }
        },
    )
    .await;

    let status = settle(state, &match_id, outcome).await?.1;
    info!(%match_id, team = ?request.team, delta = request.delta, "goal registered");

    Ok(CommandResponse {
        current: current_view(state, &match_id).await,
        match_id,
        action: command.action().to_string(),
        status,
    })
}

/// Create a live match between two clubs; it starts at 0-0 in `not_started`.
pub async fn create_live_match(
    state: &SharedState,
    token: AccessToken,
    request: CreateLiveMatchRequest,
) -> Result<ActionResponse, ServiceError> {
    let document = NewLiveMatchDocument {
        team_a: request.team_a.trim().to_string(),
        team_b: request.team_b.trim().to_string(),
        tournament: request.tournament.trim().to_string(),
        score_a: 0,
        score_b: 0,
        date: OffsetDateTime::now_utc(),
    };
    state.backend().create_live_match(token, document).await?;
    refresh_quietly(state).await;

    Ok(ActionResponse {
        message: "live match created".into(),
    })
}

/// Forward a club creation to the backend.
pub async fn create_club(
    state: &SharedState,
    token: AccessToken,
    request: CreateClubRequest,
) -> Result<ActionResponse, ServiceError> {
    let document = NewTeamDocument {
        name: request.name.trim().to_string(),
        abbreviation: request.abbreviation.trim().to_uppercase(),
        location: request.location.trim().to_string(),
        division: request.division.trim().to_string(),
        coach: request.coach.trim().to_string(),
        stadium: request.stadium.trim().to_string(),
    };
    state.backend().create_team(token, document).await?;

    Ok(ActionResponse {
        message: format!("club `{}` created", request.name.trim()),
    })
}

/// Register a batch of players under one club.
pub async fn create_players(
    state: &SharedState,
    token: AccessToken,
    request: CreatePlayersRequest,
) -> Result<ActionResponse, ServiceError> {
    let club = request.club.trim().to_string();
    let documents: Vec<_> = request
        .players
        .into_iter()
        .map(|player| NewPlayerDocument {
            club: club.clone(),
            first_name: player.first_name.trim().to_string(),
            last_name: player.last_name.trim().to_string(),
            number: player.number,
            position: player.position.trim().to_string(),
        })
        .collect();
    let count = documents.len();
    state.backend().create_players(token, documents).await?;

    Ok(ActionResponse {
        message: format!("{count} players created"),
    })
}

/// Forward a tournament creation to the backend.
pub async fn create_tournament(
    state: &SharedState,
    token: AccessToken,
    request: CreateTournamentRequest,
) -> Result<ActionResponse, ServiceError> {
    let document = NewTournamentDocument {
        name: request.name.trim().to_string(),
        kind: request.kind.trim().to_string(),
        season: request.season.trim().to_string(),
        description: request.description,
        start_date: request.start_date,
        end_date: request.end_date,
        teams: request.teams,
    };
    state.backend().create_tournament(token, document).await?;

    Ok(ActionResponse {
        message: format!("tournament `{}` created", request.name.trim()),
    })
}

/// Add a completed match to the history.
pub async fn create_history_match(
    state: &SharedState,
    token: AccessToken,
    request: CreateHistoryMatchRequest,
) -> Result<ActionResponse, ServiceError> {
    let goals = request
        .goals
        .into_iter()
        .map(|goal| NewHistoryGoalDocument {
            player: goal.player.trim().to_string(),
            assist: goal.assist.unwrap_or_default().trim().to_string(),
            time: format!("{}'", goal.minute),
            minute: goal.minute,
            team: goal.team.trim().to_string(),
        })
        .collect();

    let document = NewHistoryMatchDocument {
        date: request.date,
        team_a: request.team_a.trim().to_string(),
        team_b: request.team_b.trim().to_string(),
        score_a: request.score_a,
        score_b: request.score_b,
        goals,
    };
    state.backend().create_history_match(token, document).await?;

    Ok(ActionResponse {
        message: "match added to history".into(),
    })
}

/// Roster used by the goal form.
pub async fn lineup(state: &SharedState, team_id: String) -> Result<LineupResponse, ServiceError> {
    public_service::lineup(state, team_id).await
}

async fn elapsed_on_board(state: &SharedState, match_id: &str, now: OffsetDateTime) -> u64 {
    let board = state.board().read().await;
    board
        .get(match_id)
        .map(|entry| entry.live_match.elapsed_seconds(now))
        .unwrap_or_default()
}

async fn current_view(state: &SharedState, match_id: &str) -> Option<MatchView> {
    let board = state.board().read().await;
    board
        .get(match_id)
        .map(|entry| MatchView::at(&entry.live_match, OffsetDateTime::now_utc()))
}

/// Re-read the board after a command reached the backend.
///
/// An acknowledged command whose plan went stale locally still changed the
/// backend, so the board is refetched for `InvalidState` outcomes as well.
async fn settle<T>(
    state: &SharedState,
    match_id: &str,
    outcome: Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    match outcome {
        Ok(value) => {
            refresh_quietly(state).await;
            Ok(value)
        }
        Err(err @ ServiceError::InvalidState(_)) => {
            debug!(match_id, error = %err, "command conflicted locally; refetching board");
            refresh_quietly(state).await;
            Err(err)
        }
        Err(err) => Err(err),
    }
}

async fn refresh_quietly(state: &SharedState) {
    // refresh_board logs its own failures; the periodic poll retries
    let _ = refresh_board(state).await;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::models::LiveMatchEntity,
        services::goal_attribution::{AttributionError, ScorerSelection},
        state::{
            AppState,
            state_machine::{MatchStage, MatchStatus, TeamSide},
            test_support::RecordingBackend,
        },
    };

    fn entity(status: &str) -> LiveMatchEntity {
        serde_json::from_value(serde_json::json!({
            "_id": "m1",
            "teamA": {"_id": "ta", "name": "Rivers"},
            "teamB": "tb",
            "status": status,
            "startTime": "2024-05-04T16:00:00Z",
            "pausedTime": "2024-05-04T16:02:05Z",
        }))
        .unwrap()
    }

    async fn setup(status: &str) -> (SharedState, Arc<RecordingBackend>) {
        let backend = Arc::new(RecordingBackend::with_matches(vec![entity(status)]));
        let state = AppState::new(AppConfig::default(), backend.clone());
        refresh_board(&state).await.unwrap();
        backend.calls.lock().unwrap().clear();
        (state, backend)
    }

    fn goal(scorer: ScorerSelection) -> GoalRequest {
        GoalRequest {
            team: TeamSide::A,
            delta: 1,
            scorer,
            assist: None,
        }
    }

    #[tokio::test]
    async fn acknowledged_command_reports_new_status_and_refetches() {
        let (state, backend) = setup("not_started").await;
        let mut admin_rx = state.admin_sse().subscribe();

        let response = run_command(&state, "tok".into(), "m1".into(), MatchCommand::Start)
            .await
            .unwrap();

        assert_eq!(response.status, MatchStatus::Live);
        assert_eq!(response.action, "start");
        assert_eq!(
            backend.calls(),
            ["POST /live-matches/m1/start ", "GET /live-matches"]
        );
        let event = admin_rx.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some("match.command"));
    }

    #[tokio::test]
    async fn refused_command_never_calls_backend() {
        let (state, backend) = setup("not_started").await;

        let err = run_command(&state, "tok".into(), "m1".into(), MatchCommand::Pause)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidTransition(_)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn finish_carries_final_clock() {
        let (state, backend) = setup("paused").await;

        run_command(&state, "tok".into(), "m1".into(), MatchCommand::Finish)
            .await
            .unwrap();

        assert_eq!(
            backend.calls()[0],
            r#"POST /live-matches/m1/finish {"finalElapsedSeconds":125}"#
        );
    }

    #[tokio::test]
    async fn stage_sends_stage_body() {
        let (state, backend) = setup("live").await;

        run_command(
            &state,
            "tok".into(),
            "m1".into(),
            MatchCommand::Stage(MatchStage::ExtraTime),
        )
        .await
        .unwrap();

        assert_eq!(
            backend.calls()[0],
            r#"POST /live-matches/m1/stage {"stage":"extra_time"}"#
        );
    }

    #[tokio::test]
    async fn rejected_command_leaves_board_untouched() {
        let (state, backend) = setup("live").await;
        *backend.reject.lock().unwrap() = Some((400, "match already paused".into()));

        let err = run_command(&state, "tok".into(), "m1".into(), MatchCommand::Pause)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::RemoteRejection { status: 400, .. }));
        let board = state.board().read().await;
        let entry = board.get("m1").unwrap();
        assert_eq!(entry.machine.status(), MatchStatus::Live);
    }

    #[tokio::test]
    async fn goal_without_scorer_is_refused_before_any_call() {
        let (state, backend) = setup("live").await;

        let err = register_goal(&state, "tok".into(), "m1".into(), goal(ScorerSelection::default()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Attribution(AttributionError::MissingScorer)
        ));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn goal_with_roster_scorer_is_sent() {
        let (state, backend) = setup("live").await;
        let scorer = ScorerSelection {
            player_id: Some("p1".into()),
            ..ScorerSelection::default()
        };

        let response = register_goal(&state, "tok".into(), "m1".into(), goal(scorer))
            .await
            .unwrap();

        assert_eq!(response.action, "score");
        assert_eq!(
            backend.calls()[0],
            r#"PUT /live-matches/m1/score {"team":"A","delta":1,"scorerId":"p1"}"#
        );
    }

    #[tokio::test]
    async fn custom_scorer_is_attached_to_side_club() {
        let (state, backend) = setup("live").await;
        let scorer = ScorerSelection {
            player_id: Some("custom".into()),
            first_name: Some(" Ana ".into()),
            last_name: Some("Diaz".into()),
            ..ScorerSelection::default()
        };

        register_goal(&state, "tok".into(), "m1".into(), goal(scorer))
            .await
            .unwrap();

        let call = &backend.calls()[0];
        assert!(call.contains(r#""firstName":"Ana""#));
        assert!(call.contains(r#""team":"ta""#));
    }

    #[tokio::test]
    async fn history_goals_get_minute_marks() {
        let (state, backend) = setup("live").await;
        let request: CreateHistoryMatchRequest = serde_json::from_value(serde_json::json!({
            "date": "2024-05-04",
            "team_a": "ta",
            "team_b": "tb",
            "score_a": 1,
            "goals": [{"player": "p1", "minute": 33, "team": "ta"}]
        }))
        .unwrap();

        create_history_match(&state, "tok".into(), request)
            .await
            .unwrap();
        assert_eq!(backend.calls(), ["POST /api/matches 1"]);
    }
}
