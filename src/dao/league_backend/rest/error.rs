//! Error types of the REST league backend client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::backend::BackendError;

/// Convenient result alias returning [`RestDaoError`] failures.
pub type RestResult<T> = Result<T, RestDaoError>;

/// Failures that can occur while talking to the league REST backend.
#[derive(Debug, Error)]
pub enum RestDaoError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build league backend client")]
    ClientBuilder {
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or timed out.
    #[error("failed to send league backend request to `{path}`")]
    RequestSend {
        /// Backend path that was requested.
        path: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
    /// The backend answered with a non-2xx status.
    #[error("unexpected league backend status {status} for `{path}`: {message}")]
    RequestStatus {
        /// Backend path that was requested.
        path: String,
        /// Status the backend answered with.
        status: StatusCode,
        /// Message extracted from the error body, or the raw body.
        message: String,
    },
    /// The response payload could not be decoded.
    #[error("failed to decode league backend response for `{path}`")]
    DecodeResponse {
        /// Backend path that was requested.
        path: String,
        /// Underlying reqwest failure.
        #[source]
        source: reqwest::Error,
    },
}

impl From<RestDaoError> for BackendError {
    fn from(value: RestDaoError) -> Self {
        match value {
            RestDaoError::RequestStatus {
                status, message, ..
            } => BackendError::Rejected {
                status: status.as_u16(),
                message,
            },
            other => BackendError::unavailable(other.to_string(), other),
        }
    }
}
