use actix_web::{web, HttpResponse};

use crate::dto::auth_dto::LogoutAllResponse;
use crate::handlers::error_handler::handle_domain_error;
use crate::middleware::auth::AuthContext;

use pz_core::repositories::{PrincipalRepository, TokenRepository};

use super::AppState;

/// Handler for POST /api/v1/auth/logout-all
///
/// Revokes every active session owned by the caller, on every device.
/// Intended for "sign out everywhere" and suspected credential compromise.
/// Requires authentication via Bearer token in the Authorization header.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "revoked_sessions": 3
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid access token
/// - 500 Internal Server Error: Token revocation failure
pub async fn logout_all<P, T>(
    state: web::Data<AppState<P, T>>,
    auth: AuthContext,
) -> HttpResponse
where
    P: PrincipalRepository + 'static,
    T: TokenRepository + 'static,
{
    match state.auth_service.logout_all(auth.principal_id).await {
        Ok(revoked_sessions) => HttpResponse::Ok().json(LogoutAllResponse { revoked_sessions }),
        Err(error) => handle_domain_error(error),
    }
}
