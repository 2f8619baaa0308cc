//! Main token service implementation: issuance, verification, and the
//! refresh rotation state machine.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::entities::principal::Role;
use crate::domain::entities::token::{Claims, RefreshTokenRecord, SessionMeta, TokenKind, TokenPair};
use crate::errors::{DomainError, TokenError};
use crate::repositories::TokenRepository;

use super::config::TokenConfig;

/// Service for managing JWT access tokens and stateful refresh tokens
///
/// Access tokens are self-contained: signature and expiry alone decide
/// their validity. Refresh tokens are also signed, but a valid signature
/// is never sufficient to redeem one; the store record must additionally
/// be live, unrevoked, and unexpired.
pub struct TokenService<R: TokenRepository> {
    repository: R,
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_validation: Validation,
    refresh_validation: Validation,
}

impl<R: TokenRepository> TokenService<R> {
    /// Creates a new token service instance
    ///
    /// Keys are derived once from the injected configuration; the secret
    /// is read-only for the life of the process.
    pub fn new(repository: R, config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut access_validation = Validation::new(Algorithm::HS256);
        access_validation.set_issuer(&[&config.issuer]);
        access_validation.validate_exp = true;

        // A refresh token past its exp must surface as RefreshNotFound,
        // judged against the stored record, not as a signature failure.
        let mut refresh_validation = Validation::new(Algorithm::HS256);
        refresh_validation.set_issuer(&[&config.issuer]);
        refresh_validation.validate_exp = false;

        Self {
            repository,
            config,
            encoding_key,
            decoding_key,
            access_validation,
            refresh_validation,
        }
    }

    /// Issues a fresh access+refresh pair and persists the first refresh
    /// token record (login path)
    pub async fn issue_pair(
        &self,
        principal_id: Uuid,
        role: Role,
        meta: SessionMeta,
    ) -> Result<TokenPair, DomainError> {
        let access_claims = Claims::new_access_token(
            principal_id,
            role,
            &self.config.issuer,
            self.config.access_token_expiry_minutes,
        );
        let refresh_claims = Claims::new_refresh_token(
            principal_id,
            role,
            &self.config.issuer,
            self.config.refresh_token_expiry_days,
        );

        let access_token = self.encode_jwt(&access_claims)?;
        let refresh_token = self.encode_jwt(&refresh_claims)?;

        let record = RefreshTokenRecord::new(
            principal_id,
            Self::hash_token(&refresh_token),
            self.config.refresh_token_expiry_days,
            meta,
        );
        self.repository
            .save(record)
            .await
            .map_err(|_| DomainError::Token(TokenError::GenerationFailed))?;

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_expiry_minutes,
            self.config.refresh_token_expiry_days,
        ))
    }

    /// Verifies an access token and returns the claims
    ///
    /// Stateless by design: signature, expiry, and token kind, no store
    /// lookup. Revocation therefore propagates to access tokens only after
    /// their TTL lapses. A refresh token never passes here: its `typ` claim
    /// is signed, so a stolen 14-day refresh token cannot be replayed as a
    /// bearer access credential.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, DomainError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.access_validation)
            .map_err(|_| DomainError::Token(TokenError::InvalidToken))?;
        if token_data.claims.typ != TokenKind::Access {
            return Err(DomainError::Token(TokenError::InvalidToken));
        }
        Ok(token_data.claims)
    }

    /// Exchanges a refresh token for a new pair, rotating the old one
    ///
    /// State machine per refresh token record:
    /// `ACTIVE -> ROTATED` here, `ACTIVE -> REVOKED` via logout, expiry
    /// derived on read. At most one rotation can ever succeed from a given
    /// token: the retire-old/insert-new step is a compare-and-set, and a
    /// lost race surfaces as `RefreshReused`, never as a second success.
    pub async fn refresh(&self, old_token: &str) -> Result<TokenPair, DomainError> {
        // 1. Signature, shape, and kind; expiry is judged against the
        //    record below
        let token_data = decode::<Claims>(old_token, &self.decoding_key, &self.refresh_validation)
            .map_err(|_| DomainError::Token(TokenError::InvalidToken))?;
        let claims = token_data.claims;
        if claims.typ != TokenKind::Refresh {
            return Err(DomainError::Token(TokenError::InvalidToken));
        }

        // 2. The store record is authoritative, not the claims
        let old_hash = Self::hash_token(old_token);
        let record = self
            .repository
            .find_by_hash(&old_hash)
            .await?
            .ok_or(DomainError::Token(TokenError::RefreshNotFound))?;

        if record.is_expired() {
            tracing::debug!(
                principal_id = %record.principal_id,
                "expired refresh token presented"
            );
            return Err(DomainError::Token(TokenError::RefreshNotFound));
        }

        if record.revoked {
            // An already-exchanged-or-logged-out token resurfaced: the
            // canonical theft indicator. Kill the whole descending lineage.
            let revoked = self.repository.revoke_successors(&old_hash).await?;
            tracing::warn!(
                principal_id = %record.principal_id,
                token_hash_prefix = &old_hash[..8],
                successors_revoked = revoked,
                "refresh token reuse detected"
            );
            return Err(DomainError::Token(TokenError::RefreshReused));
        }

        // 3. Build the successor before touching the store
        let access_claims = Claims::new_access_token(
            record.principal_id,
            claims.role,
            &self.config.issuer,
            self.config.access_token_expiry_minutes,
        );
        let refresh_claims = Claims::new_refresh_token(
            record.principal_id,
            claims.role,
            &self.config.issuer,
            self.config.refresh_token_expiry_days,
        );
        let access_token = self.encode_jwt(&access_claims)?;
        let refresh_token = self.encode_jwt(&refresh_claims)?;

        let replacement = RefreshTokenRecord::new(
            record.principal_id,
            Self::hash_token(&refresh_token),
            self.config.refresh_token_expiry_days,
            record.meta(),
        );

        // 4. Atomic retire-old/insert-new; only one concurrent caller wins
        let won = self.repository.rotate(&old_hash, replacement).await?;
        if !won {
            tracing::warn!(
                principal_id = %record.principal_id,
                token_hash_prefix = &old_hash[..8],
                "lost rotation race: token already rotated concurrently"
            );
            return Err(DomainError::Token(TokenError::RefreshReused));
        }

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_expiry_minutes,
            self.config.refresh_token_expiry_days,
        ))
    }

    /// Revokes a specific refresh token on behalf of its owner
    ///
    /// A token not found, already revoked, or owned by a different
    /// principal is reported as `false`, never an error: logout must
    /// succeed regardless.
    pub async fn revoke_refresh_token(
        &self,
        token: &str,
        owner: Uuid,
    ) -> Result<bool, DomainError> {
        let token_hash = Self::hash_token(token);

        match self.repository.find_by_hash(&token_hash).await? {
            Some(record) if record.principal_id == owner => {
                self.repository.revoke(&token_hash).await
            }
            Some(record) => {
                tracing::debug!(
                    owner = %owner,
                    record_principal = %record.principal_id,
                    "logout refresh token belongs to a different principal; ignored"
                );
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Revokes every active refresh token owned by a principal
    pub async fn revoke_all(&self, principal_id: Uuid) -> Result<usize, DomainError> {
        self.repository.revoke_all_for_principal(principal_id).await
    }

    /// Encodes claims into a JWT
    fn encode_jwt(&self, claims: &Claims) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::GenerationFailed))
    }

    /// SHA-256 digest of a token, hex encoded, for storage and lookup
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
