use actix_web::{web, HttpResponse};

use crate::dto::auth_dto::{RefreshTokenRequest, TokenPairResponse};
use crate::handlers::error_handler::handle_domain_error;

use pz_core::repositories::{PrincipalRepository, TokenRepository};

use super::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new access/refresh pair. The presented
/// token is retired in the same step; presenting it again afterwards is
/// treated as theft and revokes the whole descendant chain.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "eyJ..."
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "refresh_token": "eyJ...",
///     "expires_in": 900
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Invalid, unknown, expired, or already-used token
/// - 500 Internal Server Error: Token generation failure
pub async fn refresh<P, T>(
    state: web::Data<AppState<P, T>>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse
where
    P: PrincipalRepository + 'static,
    T: TokenRepository + 'static,
{
    match state.auth_service.refresh(&request.refresh_token).await {
        Ok(token_pair) => HttpResponse::Ok().json(TokenPairResponse::from(token_pair)),
        Err(error) => handle_domain_error(error),
    }
}
