use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    middleware,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{
    routes::auth::require_admin,
    services::sse_service::{self, StreamKind},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    responses((
        status = 200,
        description = "Board snapshots, clock ticks and status changes",
        content_type = "text/event-stream",
        body = String
    ))
)]
/// Stream board snapshots and clock ticks to viewers.
pub async fn public_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (receiver, handshake) = sse_service::subscribe(&state, StreamKind::Public);
    info!(
        subscribers = state.public_sse().subscriber_count(),
        "new public SSE connection"
    );
    sse_service::to_sse_stream(receiver, handshake, StreamKind::Public)
}

#[utoipa::path(
    get,
    path = "/sse/admin",
    tag = "sse",
    params(("Authorization" = String, Header, description = "Admin bearer token")),
    responses(
        (
            status = 200,
            description = "Operator stream: snapshots and acknowledged commands",
            content_type = "text/event-stream",
            body = String
        ),
        (status = 401, description = "Missing or expired token"),
        (status = 403, description = "Caller is not an administrator")
    )
)]
/// Stream board snapshots and acknowledged commands to operators.
pub async fn admin_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (receiver, handshake) = sse_service::subscribe(&state, StreamKind::Admin);
    info!(
        subscribers = state.admin_sse().subscriber_count(),
        "new admin SSE connection"
    );
    sse_service::to_sse_stream(receiver, handshake, StreamKind::Admin)
}

/// SSE endpoints; the admin stream sits behind the admin check.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/public", get(public_stream))
        .route(
            "/sse/admin",
            get(admin_stream).route_layer(middleware::from_fn_with_state(state, require_admin)),
        )
}
