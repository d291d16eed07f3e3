/**
 * Authentication Handler Types
 *
 * Request and response bodies for the token lifecycle and current-user
 * endpoints. Field names are camelCase on the wire.
 */

use serde::{Deserialize, Serialize};

use crate::backend::auth::users::Identity;

/// Refresh request
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// New token pair returned by a refresh
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Revoke request
///
/// The refresh token is optional; the access token is revoked on its own
/// when it is omitted.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RevokeTokenRequest {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// User response
///
/// The identity attached to the current request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    /// Token subject
    pub id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub authorities: Vec<String>,
}

impl From<&Identity> for UserResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            username: identity.username.clone(),
            authorities: identity.authorities.clone(),
        }
    }
}
