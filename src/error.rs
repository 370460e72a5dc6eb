use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::backend::BackendError,
    services::goal_attribution::AttributionError,
    state::{AbortError, ApplyError, PlanError, state_machine::InvalidTransition},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// League backend could not be reached or answered garbage.
    #[error("league backend unavailable")]
    Unavailable(#[source] BackendError),
    /// League backend answered with a non-2xx status.
    #[error("league backend rejected the request ({status}): {message}")]
    RemoteRejection {
        /// HTTP status returned by the backend.
        status: u16,
        /// Backend message, or the raw body when it had none.
        message: String,
    },
    /// Command not allowed from the current match status.
    #[error(transparent)]
    InvalidTransition(InvalidTransition),
    /// Goal submission without a usable scorer.
    #[error(transparent)]
    Attribution(#[from] AttributionError),
    /// Missing or expired credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated but not allowed.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Operation exceeded its timeout limit.
    #[error("operation timed out")]
    Timeout,
}

impl From<BackendError> for ServiceError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Rejected { status, message } => {
                ServiceError::RemoteRejection { status, message }
            }
            unavailable @ BackendError::Unavailable { .. } => {
                ServiceError::Unavailable(unavailable)
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Authenticated caller without the required role.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The league backend refused the operation.
    #[error("rejected by league backend: {0}")]
    BadGateway(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::RemoteRejection { status, message } => match status {
                401 => AppError::Unauthorized(message),
                403 => AppError::Forbidden(message),
                404 => AppError::NotFound(message),
                400 | 409 | 422 => AppError::BadRequest(message),
                _ => AppError::BadGateway(message),
            },
            ServiceError::InvalidTransition(invalid) => AppError::Conflict(invalid.to_string()),
            ServiceError::Attribution(err) => AppError::BadRequest(err.to_string()),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Timeout => AppError::ServiceUnavailable("operation timed out".into()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

impl From<PlanError> for ServiceError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::AlreadyPending {
                command,
                pending_for,
            } => ServiceError::InvalidState(format!(
                "`{}` is still waiting for the league backend ({}s)",
                command.action(),
                pending_for.as_secs()
            )),
            PlanError::InvalidTransition(invalid) => ServiceError::InvalidTransition(invalid),
        }
    }
}

impl From<ApplyError> for ServiceError {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::NoPending => ServiceError::InvalidState("no command is pending".into()),
            ApplyError::IdMismatch { .. } => {
                ServiceError::InvalidState("pending command does not match".into())
            }
            ApplyError::VersionMismatch { expected, actual } => ServiceError::InvalidState(format!(
                "match changed while the command was in flight \
                 (expected version {expected}, got {actual})"
            )),
        }
    }
}

impl From<AbortError> for ServiceError {
    fn from(err: AbortError) -> Self {
        match err {
            AbortError::NoPending => ServiceError::InvalidState("no pending command".into()),
            AbortError::IdMismatch { .. } => {
                ServiceError::InvalidState("pending command does not match".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::state::state_machine::{MatchCommand, MatchStatus, RejectReason};

    #[test]
    fn backend_rejection_keeps_status_and_message() {
        let err: ServiceError = BackendError::Rejected {
            status: 400,
            message: "Equipo duplicado".into(),
        }
        .into();
        assert!(matches!(
            AppError::from(err),
            AppError::BadRequest(message) if message == "Equipo duplicado"
        ));
    }

    #[test]
    fn expired_session_maps_to_unauthorized() {
        let err = ServiceError::RemoteRejection {
            status: 401,
            message: "jwt expired".into(),
        };
        assert!(matches!(AppError::from(err), AppError::Unauthorized(_)));
    }

    #[test]
    fn invalid_transition_is_a_conflict_naming_status_and_command() {
        let err: ServiceError = PlanError::InvalidTransition(InvalidTransition {
            from: MatchStatus::Finished,
            command: MatchCommand::Pause,
            reason: RejectReason::NotAllowedFromStatus,
        })
        .into();

        match AppError::from(err) {
            AppError::Conflict(message) => {
                assert!(message.contains("pause"));
                assert!(message.contains("finished"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn pending_command_conflict_names_the_waiting_action() {
        let err: ServiceError = PlanError::AlreadyPending {
            command: MatchCommand::Finish,
            pending_for: std::time::Duration::from_secs(7),
        }
        .into();

        match AppError::from(err) {
            AppError::Conflict(message) => {
                assert!(message.contains("finish"));
                assert!(message.contains("7s"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_body_is_json_message() {
        let response = AppError::Forbidden("admin only".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["message"], "forbidden: admin only");
    }
}
