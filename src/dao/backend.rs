//! Transport-neutral errors of the league backend.

use std::error::Error;
use thiserror::Error;

/// Result alias for calls against the league backend.
pub type BackendResult<T> = Result<T, BackendError>;

/// Error raised by league backend implementations regardless of transport.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with a non-2xx status.
    #[error("backend rejected the request with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },
    /// The backend could not be reached or its answer could not be understood.
    #[error("backend unavailable: {message}")]
    Unavailable {
        /// What was being attempted.
        message: String,
        /// Underlying transport or decoding failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl BackendError {
    /// Construct an unavailable error from any transport failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        BackendError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// HTTP status returned by the backend, when it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Rejected { status, .. } => Some(*status),
            BackendError::Unavailable { .. } => None,
        }
    }
}
