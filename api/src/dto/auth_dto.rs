use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    /// Optional client-provided device identifier
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogoutRequest {
    /// Refresh token to revoke alongside the session, if the client has one
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub principal_id: String,
    pub role: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl From<pz_core::domain::value_objects::AuthResponse> for AuthResponse {
    fn from(response: pz_core::domain::value_objects::AuthResponse) -> Self {
        Self {
            principal_id: response.principal_id.to_string(),
            role: response.role.to_string(),
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl From<pz_core::domain::entities::token::TokenPair> for TokenPairResponse {
    fn from(pair: pz_core::domain::entities::token::TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.access_expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutAllResponse {
    pub revoked_sessions: usize,
}
