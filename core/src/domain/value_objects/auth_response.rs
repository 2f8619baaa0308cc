//! Authentication response value object for API responses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::principal::Role;
use crate::domain::entities::token::TokenPair;

/// Authentication response returned after a successful login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    /// ID of the authenticated principal
    pub principal_id: Uuid,

    /// Role of the authenticated principal
    pub role: Role,

    /// JWT access token for API authentication
    pub access_token: String,

    /// JWT refresh token for obtaining new access tokens
    pub refresh_token: String,

    /// Access token expiration time in seconds
    pub expires_in: i64,
}

impl AuthResponse {
    /// Creates an authentication response from a token pair
    pub fn from_token_pair(principal_id: Uuid, role: Role, token_pair: TokenPair) -> Self {
        Self {
            principal_id,
            role,
            access_token: token_pair.access_token,
            refresh_token: token_pair.refresh_token,
            expires_in: token_pair.access_expires_in,
        }
    }
}
