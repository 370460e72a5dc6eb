use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
    routing::{get, post},
};
use axum_valid::Valid;
use tracing::debug;

use crate::{
    dto::auth::{IdentitySettings, ProfileResponse, SyncUserRequest},
    error::AppError,
    services::auth_service,
    state::SharedState,
};

/// Bearer token of a request that went through [`require_admin`].
#[derive(Debug, Clone)]
pub struct AdminToken(pub String);

/// Extract the bearer token from the `Authorization` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing `Authorization` header".into()))?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("expected a bearer token".into()))?;
    Ok(token.to_string())
}

/// Admit only callers whose token the league backend recognises as admin.
pub async fn require_admin(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())?;
    auth_service::verify_admin(&state, &token).await?;
    debug!(path = %req.uri().path(), "admin request authorised");

    req.extensions_mut().insert(AdminToken(token));
    Ok(next.run(req).await)
}

/// Identity endpoints used by the frontends right after login.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/auth/config", get(identity_settings))
        .route("/auth/profile", get(profile))
        .route("/auth/user", get(current_user))
        .route("/auth/sync", post(sync_user))
}

#[utoipa::path(
    get,
    path = "/auth/config",
    tag = "auth",
    responses((status = 200, description = "Identity provider settings", body = IdentitySettings))
)]
/// Identity provider tenant and audience configured for this console.
pub async fn identity_settings(State(state): State<SharedState>) -> Json<IdentitySettings> {
    let identity = &state.config().identity;
    Json(IdentitySettings {
        domain: identity.domain.clone(),
        audience: identity.audience.clone(),
    })
}

#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "auth",
    params((
        "Authorization" = String,
        Header,
        description = "Bearer access token from the identity provider"
    )),
    responses(
        (status = 200, description = "Caller profile", body = ProfileResponse),
        (status = 401, description = "Missing or expired token")
    )
)]
/// Return the caller's profile and admin flag.
pub async fn profile(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, AppError> {
    let token = bearer_token(&headers)?;
    Ok(Json(auth_service::profile(&state, token).await?))
}

#[utoipa::path(
    get,
    path = "/auth/user",
    tag = "auth",
    params((
        "Authorization" = String,
        Header,
        description = "Bearer access token from the identity provider"
    )),
    responses((status = 200, description = "Stored user document", body = serde_json::Value))
)]
/// User document stored for the caller.
pub async fn current_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = bearer_token(&headers)?;
    Ok(Json(auth_service::current_user(&state, token).await?))
}

#[utoipa::path(
    post,
    path = "/auth/sync",
    tag = "auth",
    params((
        "Authorization" = String,
        Header,
        description = "Bearer access token from the identity provider"
    )),
    request_body = SyncUserRequest,
    responses((status = 200, description = "User document after sync", body = serde_json::Value))
)]
/// Create or update the caller's user document in the league backend.
pub async fn sync_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Valid(Json(payload)): Valid<Json<SyncUserRequest>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = bearer_token(&headers)?;
    Ok(Json(auth_service::sync_user(&state, token, payload).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Err(AppError::Unauthorized(_))));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }
}
