//! Application factory
//!
//! Builds the Actix-web application with routing, CORS, request tracing,
//! and the access-token guard wired onto the protected routes.

use std::sync::Arc;

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use crate::middleware::auth::{AccessTokenVerifier, CapabilityTable, JwtAuth};
use crate::middleware::cors::create_cors;
use crate::routes::auth::{
    login::login, logout::logout, logout_all::logout_all, refresh::refresh, AppState,
};

use pz_core::repositories::{PrincipalRepository, TokenRepository};

/// Create and configure the application with all dependencies
///
/// Login and refresh are unauthenticated by design: login has no token
/// yet, and refresh authenticates with the refresh token itself. Logout
/// routes require a valid access token.
pub fn create_app<P, T>(
    app_state: web::Data<AppState<P, T>>,
    verifier: Arc<dyn AccessTokenVerifier>,
    capabilities: CapabilityTable,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    P: PrincipalRepository + 'static,
    T: TokenRepository + 'static,
{
    let cors = create_cors();

    App::new()
        .app_data(app_state)
        .wrap(TracingLogger::default())
        .wrap(cors)
        // Health check endpoint
        .route("/health", web::get().to(health_check))
        // API v1 routes
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/login", web::post().to(login::<P, T>))
                    .route("/refresh", web::post().to(refresh::<P, T>))
                    .route(
                        "/logout",
                        web::post().to(logout::<P, T>).wrap(JwtAuth::with_capabilities(
                            Arc::clone(&verifier),
                            capabilities.clone(),
                        )),
                    )
                    .route(
                        "/logout-all",
                        web::post()
                            .to(logout_all::<P, T>)
                            .wrap(JwtAuth::with_capabilities(
                                Arc::clone(&verifier),
                                capabilities.clone(),
                            )),
                    ),
            ),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "plaza-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "NOT_FOUND",
        "message": "The requested resource was not found"
    }))
}
