//! Main authentication service implementation

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, SessionMeta, TokenPair};
use crate::domain::value_objects::AuthResponse;
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::repositories::{PrincipalRepository, TokenRepository};
use crate::services::token::TokenService;

/// Bcrypt hash of an arbitrary string, verified against when the login
/// identifier is unknown so that lookup failure and secret mismatch take
/// the same time and produce the same error.
const DUMMY_PASSWORD_HASH: &str =
    "$2b$12$GhvMmNVjRW29ulnudl.LbuAnUtN/LRfe1JsBm1Xu6LE3059z5Tr8m";

/// Authentication service for the session lifecycle: login, refresh,
/// logout, and sign-out-everywhere.
pub struct AuthService<P, T>
where
    P: PrincipalRepository,
    T: TokenRepository,
{
    /// Credential store boundary (consulted, not owned)
    principal_repository: Arc<P>,
    /// Token issuer/verifier and rotation engine
    token_service: Arc<TokenService<T>>,
}

impl<P, T> AuthService<P, T>
where
    P: PrincipalRepository,
    T: TokenRepository,
{
    /// Create a new authentication service
    pub fn new(principal_repository: Arc<P>, token_service: Arc<TokenService<T>>) -> Self {
        Self {
            principal_repository,
            token_service,
        }
    }

    /// Authenticate a principal and issue the initial token pair
    ///
    /// Whether the email is unknown or the password wrong, the caller
    /// sees the same `InvalidCredentials`; account existence is never
    /// disclosed. Suspension is only reported after the secret verified.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        meta: SessionMeta,
    ) -> DomainResult<AuthResponse> {
        let principal = match self.principal_repository.find_by_email(email).await? {
            Some(principal) => principal,
            None => {
                // Equalize timing with the found-principal path
                let _ = bcrypt::verify(password, DUMMY_PASSWORD_HASH);
                return Err(DomainError::Auth(AuthError::InvalidCredentials));
            }
        };

        let matches = bcrypt::verify(password, &principal.password_hash)
            .map_err(|e| DomainError::Internal {
                message: format!("Password verification failed: {}", e),
            })?;
        if !matches {
            return Err(DomainError::Auth(AuthError::InvalidCredentials));
        }

        if !principal.can_login() {
            return Err(DomainError::Auth(AuthError::AccountSuspended));
        }

        if let Err(e) = self
            .principal_repository
            .touch_last_login(principal.id, Utc::now())
            .await
        {
            tracing::warn!(principal_id = %principal.id, error = %e, "failed to record last login");
        }

        let token_pair = self
            .token_service
            .issue_pair(principal.id, principal.role, meta)
            .await?;

        tracing::info!(principal_id = %principal.id, role = %principal.role, "login succeeded");

        Ok(AuthResponse::from_token_pair(
            principal.id,
            principal.role,
            token_pair,
        ))
    }

    /// Exchange a refresh token for a new pair (rotation)
    ///
    /// Pure token-store traffic: the credential store is not consulted.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        self.token_service.refresh(refresh_token).await
    }

    /// Log out the session identified by the presented claims
    ///
    /// A supplied refresh token is revoked if its record exists and belongs
    /// to the caller; otherwise it is ignored. Logout always succeeds once
    /// the access token authenticated the call.
    pub async fn logout(
        &self,
        claims: &Claims,
        refresh_token: Option<&str>,
    ) -> DomainResult<()> {
        let principal_id = claims
            .principal_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidToken))?;

        if let Some(token) = refresh_token {
            let revoked = self
                .token_service
                .revoke_refresh_token(token, principal_id)
                .await?;
            if revoked {
                tracing::info!(principal_id = %principal_id, "session logged out");
            }
        }

        Ok(())
    }

    /// Revoke every active session owned by a principal
    ///
    /// Used for "sign out everywhere" and suspected compromise.
    pub async fn logout_all(&self, principal_id: Uuid) -> DomainResult<usize> {
        let revoked = self.token_service.revoke_all(principal_id).await?;
        tracing::info!(principal_id = %principal_id, revoked, "all sessions revoked");
        Ok(revoked)
    }
}
