//! Admin authorization and identity sync against the league backend.

use tracing::{debug, warn};

use crate::{
    dao::{backend::BackendError, league_backend::AccessToken, models::UserSyncDocument},
    dto::auth::{ProfileResponse, SyncUserRequest},
    error::ServiceError,
    state::SharedState,
};

/// Make sure `token` belongs to an administrator.
///
/// Verified tokens are cached for the configured TTL; a refused token is
/// evicted so a revoked role takes effect on the next request.
pub async fn verify_admin(state: &SharedState, token: &str) -> Result<(), ServiceError> {
    if state.is_cached_admin(token) {
        return Ok(());
    }

    let outcome = state.backend().user_profile(token.to_string()).await;
    match outcome {
        Ok(profile) if profile.is_admin => {
            debug!("admin token verified");
            state.remember_admin(token);
            Ok(())
        }
        Ok(_) => {
            state.forget_admin(token);
            Err(ServiceError::Forbidden("administrator role required".into()))
        }
        Err(BackendError::Rejected { status: 401, .. }) => {
            state.forget_admin(token);
            Err(ServiceError::Unauthorized("session expired".into()))
        }
        Err(BackendError::Rejected { status: 403, message }) => {
            state.forget_admin(token);
            Err(ServiceError::Forbidden(message))
        }
        Err(err) => {
            warn!(error = %err, "admin profile check failed");
            Err(err.into())
        }
    }
}

/// Profile of the caller, admin flag included.
pub async fn profile(
    state: &SharedState,
    token: AccessToken,
) -> Result<ProfileResponse, ServiceError> {
    let profile = state.backend().user_profile(token).await?;
    Ok(ProfileResponse {
        is_admin: profile.is_admin,
        user: profile.user.unwrap_or_default(),
    })
}

/// User document stored by the backend for the caller.
pub async fn current_user(
    state: &SharedState,
    token: AccessToken,
) -> Result<serde_json::Value, ServiceError> {
    Ok(state.backend().current_user(token).await?)
}

/// Create or update the caller's user document.
pub async fn sync_user(
    state: &SharedState,
    token: AccessToken,
    request: SyncUserRequest,
) -> Result<serde_json::Value, ServiceError> {
    let document = UserSyncDocument {
        auth0_id: request.auth0_id.trim().to_string(),
        email: request.email,
        name: request.name,
        picture: request.picture,
    };
    Ok(state.backend().sync_user(token, document).await?)
}
