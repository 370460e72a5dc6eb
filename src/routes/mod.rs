//! HTTP surface of the console.

use axum::Router;

use crate::state::SharedState;

/// Operator routes behind the admin guard.
pub mod admin;
/// Identity routes.
pub mod auth;
/// OpenAPI document and Swagger UI.
pub mod docs;
/// Liveness endpoint.
pub mod health;
/// Read-only viewer routes.
pub mod public;
/// Event streams.
pub mod sse;

/// Compose every route tree and bind the shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(public::router())
        .merge(auth::router())
        .merge(sse::router(state.clone()))
        .merge(admin::router(state.clone()))
        .merge(docs::router())
        .with_state(state)
}
