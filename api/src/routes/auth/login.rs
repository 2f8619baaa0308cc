use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;
use validator::Validate;

use crate::dto::auth_dto::{AuthResponse as DtoAuthResponse, LoginRequest};
use crate::handlers::error_handler::handle_domain_error;

use pz_core::domain::entities::token::SessionMeta;
use pz_core::repositories::{PrincipalRepository, TokenRepository};
use pz_core::services::auth::AuthService;
use pz_shared::ErrorResponse;

/// Application state that holds shared services
pub struct AppState<P, T>
where
    P: PrincipalRepository,
    T: TokenRepository,
{
    pub auth_service: Arc<AuthService<P, T>>,
}

/// Captures client metadata from the login request
///
/// Recorded on the refresh token record and carried across rotations, so
/// a reuse event can be traced back to the device that opened the session.
pub(crate) fn session_meta(req: &HttpRequest, device_id: Option<String>) -> SessionMeta {
    let user_agent = req
        .headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.to_string());
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    SessionMeta {
        device_id,
        user_agent,
        ip,
    }
}

/// Handler for POST /api/v1/auth/login
///
/// Verifies credentials and issues an access/refresh token pair.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "vendor@example.com",
///     "password": "string",
///     "device_id": "optional string"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "principal_id": "550e8400-e29b-41d4-a716-446655440000",
///     "role": "user",
///     "access_token": "eyJ...",
///     "refresh_token": "eyJ...",
///     "expires_in": 900
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Malformed email or empty password
/// - 401 Unauthorized: Unknown email or wrong password (indistinguishable)
/// - 403 Forbidden: Account suspended
/// - 500 Internal Server Error: Token generation failure
pub async fn login<P, T>(
    req: HttpRequest,
    state: web::Data<AppState<P, T>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    P: PrincipalRepository + 'static,
    T: TokenRepository + 'static,
{
    if let Err(errors) = request.validate() {
        return HttpResponse::BadRequest().json(
            ErrorResponse::new("VALIDATION_ERROR", "Invalid login request")
                .with_detail("fields", serde_json::json!(errors.to_string())),
        );
    }

    let meta = session_meta(&req, request.device_id.clone());

    match state
        .auth_service
        .login(&request.email, &request.password, meta)
        .await
    {
        Ok(auth_response) => HttpResponse::Ok().json(DtoAuthResponse::from(auth_response)),
        Err(error) => handle_domain_error(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;

    #[test]
    fn test_session_meta_from_request_headers() {
        let req = actix_test::TestRequest::default()
            .insert_header(("User-Agent", "plaza-ios/2.1"))
            .to_http_request();

        let meta = session_meta(&req, Some("device-42".to_string()));
        assert_eq!(meta.device_id.as_deref(), Some("device-42"));
        assert_eq!(meta.user_agent.as_deref(), Some("plaza-ios/2.1"));
    }
}
