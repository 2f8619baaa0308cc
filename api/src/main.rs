use std::sync::Arc;

use actix_web::{web, HttpServer};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use pz_api::app::create_app;
use pz_api::config::AppConfig;
use pz_api::middleware::auth::{AccessTokenVerifier, CapabilityTable};
use pz_api::routes::auth::AppState;

use pz_core::domain::entities::principal::Role;
use pz_core::services::auth::AuthService;
use pz_core::services::token::{TokenConfig, TokenService};
use pz_infra::{create_pool, MySqlPrincipalRepository, MySqlTokenRepository};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    tracing::info!("starting Plaza API server");

    let config = AppConfig::from_env()?;

    if config.jwt.is_using_default_secret() {
        tracing::warn!("JWT secret is the development default; set PLAZA__JWT__SECRET");
    }

    let pool = create_pool(&config.database).await?;

    let principal_repository = Arc::new(MySqlPrincipalRepository::new(pool.clone()));
    let token_service = Arc::new(TokenService::new(
        MySqlTokenRepository::new(pool.clone()),
        TokenConfig::from(config.jwt.clone()),
    ));
    let auth_service = Arc::new(AuthService::new(
        principal_repository,
        Arc::clone(&token_service),
    ));

    let app_state = web::Data::new(AppState { auth_service });
    let verifier: Arc<dyn AccessTokenVerifier> = token_service;

    // Admin surface is role-gated; everything else accepts any
    // authenticated principal
    let capabilities = CapabilityTable::new().allow("/api/v1/admin", &[Role::Admin]);

    let bind_address = config.server.bind_address();
    tracing::info!(%bind_address, "binding HTTP server");

    let workers = config.server.workers;
    let server = HttpServer::new(move || {
        create_app(
            app_state.clone(),
            Arc::clone(&verifier),
            capabilities.clone(),
        )
    })
    .bind(&bind_address)?;

    let server = if workers > 0 {
        server.workers(workers)
    } else {
        server
    };

    server.run().await?;
    Ok(())
}
