//! JWT authentication middleware for protecting API endpoints.
//!
//! The guard is stateless: it checks the access token's signature and
//! expiry only, with no token-store lookup on the hot path. Revocation
//! takes effect when the short-lived access token lapses and the client
//! must come back through the refresh endpoint.
//!
//! Route authorization is declarative. A [`CapabilityTable`] maps path
//! prefixes to the roles allowed there; routes without an entry accept
//! any authenticated principal.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use uuid::Uuid;

use pz_core::{
    domain::entities::principal::Role,
    domain::entities::token::Claims,
    errors::{AuthError, DomainError, TokenError},
    repositories::TokenRepository,
    services::token::TokenService,
};

use crate::handlers::error_handler::handle_domain_error;

/// Authentication context injected into requests that passed the guard
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Principal ID extracted from JWT claims
    pub principal_id: Uuid,
    /// Role of the principal at token issuance time
    pub role: Role,
    /// Verified claims, kept for handlers that need them (logout)
    pub claims: Claims,
}

impl AuthContext {
    /// Creates a new authentication context from verified JWT claims
    pub fn from_claims(claims: Claims) -> Result<Self, DomainError> {
        let principal_id = claims
            .principal_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidToken))?;
        Ok(Self {
            principal_id,
            role: claims.role,
            claims,
        })
    }
}

/// Trait for wrapping TokenService to allow dynamic dispatch
pub trait AccessTokenVerifier: Send + Sync {
    fn verify_access_token(&self, token: &str) -> Result<Claims, DomainError>;
}

impl<R: TokenRepository> AccessTokenVerifier for TokenService<R> {
    fn verify_access_token(&self, token: &str) -> Result<Claims, DomainError> {
        TokenService::verify_access_token(self, token)
    }
}

/// Path-prefix to allowed-roles mapping
///
/// The longest matching prefix wins, so `/api/v1/admin` can be restricted
/// while its parent scope stays open to every role.
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    rules: Vec<(String, Vec<Role>)>,
}

impl CapabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict a path prefix to the given roles
    pub fn allow(mut self, prefix: impl Into<String>, roles: &[Role]) -> Self {
        self.rules.push((prefix.into(), roles.to_vec()));
        self
    }

    /// Roles allowed for a path, if any rule matches
    pub fn roles_for(&self, path: &str) -> Option<&[Role]> {
        self.rules
            .iter()
            .filter(|(prefix, _)| path.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, roles)| roles.as_slice())
    }

    /// Whether a role may access a path
    pub fn permits(&self, path: &str, role: Role) -> bool {
        match self.roles_for(path) {
            Some(roles) => roles.contains(&role),
            None => true,
        }
    }
}

/// JWT authentication middleware factory
pub struct JwtAuth {
    verifier: Arc<dyn AccessTokenVerifier>,
    capabilities: Arc<CapabilityTable>,
}

impl JwtAuth {
    /// Creates a guard that accepts any authenticated principal
    pub fn new(verifier: Arc<dyn AccessTokenVerifier>) -> Self {
        Self {
            verifier,
            capabilities: Arc::new(CapabilityTable::new()),
        }
    }

    /// Creates a guard that also enforces a capability table
    pub fn with_capabilities(
        verifier: Arc<dyn AccessTokenVerifier>,
        capabilities: CapabilityTable,
    ) -> Self {
        Self {
            verifier,
            capabilities: Arc::new(capabilities),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            verifier: Arc::clone(&self.verifier),
            capabilities: Arc::clone(&self.capabilities),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<dyn AccessTokenVerifier>,
    capabilities: Arc<CapabilityTable>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = Arc::clone(&self.verifier);
        let capabilities = Arc::clone(&self.capabilities);

        Box::pin(async move {
            let token = match extract_bearer_token(&req) {
                Some(token) => token,
                None => {
                    return Ok(reject(req, DomainError::Auth(AuthError::Unauthenticated)));
                }
            };

            let claims = match verifier.verify_access_token(&token) {
                Ok(claims) => claims,
                Err(_) => {
                    return Ok(reject(req, DomainError::Auth(AuthError::Unauthenticated)));
                }
            };

            let context = match AuthContext::from_claims(claims) {
                Ok(context) => context,
                Err(error) => return Ok(reject(req, error)),
            };

            if !capabilities.permits(req.path(), context.role) {
                return Ok(reject(req, DomainError::Auth(AuthError::AccessDenied)));
            }

            req.extensions_mut().insert(context);

            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Renders a guard rejection as the domain error's HTTP response
fn reject<B>(req: ServiceRequest, error: DomainError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(handle_domain_error(error))
        .map_into_right_body()
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.to_string())
}

/// Wraps a domain error's HTTP mapping in an actix error
fn domain_error_response(error: DomainError) -> Error {
    let message = error.to_string();
    InternalError::from_response(message, handle_domain_error(error)).into()
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| {
                domain_error_response(DomainError::Auth(AuthError::Unauthenticated))
            });

        ready(result)
    }
}
