use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::validate_not_blank;

/// Identity details pushed by the frontend after login.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SyncUserRequest {
    /// Subject issued by the identity provider.
    #[validate(custom(function = "validate_not_blank"))]
    pub auth0_id: String,
    /// Primary email address.
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub picture: Option<String>,
}

/// Caller identity as known by the league backend.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    /// True when the backend grants operator rights.
    pub is_admin: bool,
    /// User document as stored by the backend.
    #[schema(value_type = Object)]
    pub user: serde_json::Value,
}

/// Identity provider settings the frontends need to request tokens.
#[derive(Debug, Serialize, ToSchema)]
pub struct IdentitySettings {
    /// Identity provider tenant domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// API audience tokens must be issued for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
}
