//! Configuration for the token service

use pz_shared::config::JwtConfig;

/// Configuration for the token service
///
/// The signing secret lives here and is injected into the service
/// constructor at startup; it is never read from ambient global state.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// JWT signing secret (HS256 symmetric key)
    pub jwt_secret: String,
    /// JWT issuer claim
    pub issuer: String,
    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,
    /// Refresh token expiry in days
    pub refresh_token_expiry_days: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-please-change-in-production".to_string(),
            issuer: "plaza".to_string(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 14,
        }
    }
}

impl From<JwtConfig> for TokenConfig {
    fn from(config: JwtConfig) -> Self {
        Self {
            jwt_secret: config.secret,
            issuer: config.issuer,
            access_token_expiry_minutes: config.access_token_expiry_minutes,
            refresh_token_expiry_days: config.refresh_token_expiry_days,
        }
    }
}
