//! Request and response payloads exchanged with the frontends.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod admin;
/// Identity payloads.
pub mod auth;
/// Views shared by public and admin routes.
pub mod common;
/// Health check payload.
pub mod health;
/// Viewer-facing responses.
pub mod public;
/// Server-Sent Events payloads.
pub mod sse;
pub mod validation;

pub(crate) fn format_timestamp(time: OffsetDateTime) -> String {
    time.format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
