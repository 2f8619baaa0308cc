//! Mapping from domain errors to HTTP responses.
//!
//! Every refresh-path failure maps to 401 with its own machine-readable
//! code, so clients can distinguish "log in again" (REFRESH_NOT_FOUND)
//! from a security event (REFRESH_REUSED) without the response leaking
//! anything about stored tokens.

use actix_web::HttpResponse;

use pz_core::errors::{AuthError, DomainError, TokenError};
use pz_shared::ErrorResponse;

/// Convert a domain error into the appropriate HTTP response
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    match error {
        DomainError::Auth(auth_error) => match auth_error {
            AuthError::InvalidCredentials => HttpResponse::Unauthorized().json(
                ErrorResponse::new(auth_error.code(), "Invalid email or password"),
            ),
            AuthError::AccountSuspended => HttpResponse::Forbidden().json(ErrorResponse::new(
                auth_error.code(),
                "Account has been suspended",
            )),
            AuthError::Unauthenticated => HttpResponse::Unauthorized().json(ErrorResponse::new(
                auth_error.code(),
                "Authentication required",
            )),
            AuthError::AccessDenied => HttpResponse::Forbidden().json(ErrorResponse::new(
                auth_error.code(),
                "Insufficient permissions for this resource",
            )),
        },
        DomainError::Token(token_error) => match token_error {
            TokenError::InvalidToken => HttpResponse::Unauthorized().json(ErrorResponse::new(
                token_error.code(),
                "Token is invalid",
            )),
            TokenError::RefreshNotFound => HttpResponse::Unauthorized().json(ErrorResponse::new(
                token_error.code(),
                "Refresh token is unknown or expired. Please log in again",
            )),
            TokenError::RefreshReused => HttpResponse::Unauthorized().json(ErrorResponse::new(
                token_error.code(),
                "Refresh token has already been used. All descendant sessions were revoked",
            )),
            TokenError::GenerationFailed => {
                tracing::error!("token generation failed");
                HttpResponse::InternalServerError().json(ErrorResponse::new(
                    token_error.code(),
                    "Failed to issue tokens",
                ))
            }
        },
        DomainError::Internal { message } => {
            tracing::error!(error = %message, "internal error");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "INTERNAL_ERROR",
                "An internal server error occurred",
            ))
        }
    }
}
