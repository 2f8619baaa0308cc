use actix_web::{web, HttpResponse};

use crate::dto::auth_dto::{LogoutRequest, LogoutResponse};
use crate::handlers::error_handler::handle_domain_error;
use crate::middleware::auth::AuthContext;

use pz_core::repositories::{PrincipalRepository, TokenRepository};

use super::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Ends the current session. If the body carries the session's refresh
/// token it is revoked; an unknown token or one belonging to another
/// principal is silently ignored. Requires authentication via Bearer
/// token in the Authorization header.
///
/// # Request Body (optional)
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
///     "message": "Logged out successfully"
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid access token
/// - 500 Internal Server Error: Token revocation failure
pub async fn logout<P, T>(
    state: web::Data<AppState<P, T>>,
    auth: AuthContext,
    request: Option<web::Json<LogoutRequest>>,
) -> HttpResponse
where
    P: PrincipalRepository + 'static,
    T: TokenRepository + 'static,
{
    let refresh_token = request.and_then(|body| body.into_inner().refresh_token);

    match state
        .auth_service
        .logout(&auth.claims, refresh_token.as_deref())
        .await
    {
        Ok(()) => HttpResponse::Ok().json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
        Err(error) => handle_domain_error(error),
    }
}
