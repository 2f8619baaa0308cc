//! Error type definitions for authentication and token management.
//!
//! Every variant is terminal for the current call; this layer performs no
//! automatic retries. Presentation-layer status codes and machine-readable
//! error codes are mapped in the API crate.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Login rejected. Covers both an unknown identifier and a wrong
    /// secret: the two cases must stay indistinguishable to the caller.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Credentials verified, but the account is suspended.
    #[error("Account suspended")]
    AccountSuspended,

    /// Missing or invalid access token on a protected call.
    #[error("Authentication required")]
    Unauthenticated,

    /// Valid identity, insufficient privilege for the requested route.
    #[error("Access denied")]
    AccessDenied,
}

/// Token-related errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed, unsigned, or tampered token.
    #[error("Invalid token")]
    InvalidToken,

    /// Unknown or expired refresh token. Benign staleness: the token was
    /// never issued by this store, or its record has lapsed.
    #[error("Refresh token not found")]
    RefreshNotFound,

    /// A rotated-or-revoked refresh token was presented again. This is the
    /// canonical token-theft indicator and is logged as a security event.
    #[error("Refresh token reuse detected")]
    RefreshReused,

    /// Token signing or persistence failed.
    #[error("Token generation failed")]
    GenerationFailed,
}

impl AuthError {
    /// Machine-readable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AccountSuspended => "ACCOUNT_SUSPENDED",
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::AccessDenied => "ACCESS_DENIED",
        }
    }
}

impl TokenError {
    /// Machine-readable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::InvalidToken => "INVALID_TOKEN",
            TokenError::RefreshNotFound => "REFRESH_NOT_FOUND",
            TokenError::RefreshReused => "REFRESH_REUSED",
            TokenError::GenerationFailed => "TOKEN_GENERATION_FAILED",
        }
    }
}
