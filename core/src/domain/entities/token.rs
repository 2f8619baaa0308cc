//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::Role;

/// Kind of a signed token, embedded in its claims
///
/// Access and refresh tokens share the signing key, so the kind must be
/// part of the signed payload: a long-lived refresh token could otherwise
/// be presented as a bearer access credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims structure for JWT payload
///
/// Access and refresh tokens share this shape and the signing key; `typ`
/// discriminates them and their lifetimes differ. `jti` keeps two tokens
/// issued in the same second for the same principal distinct, which the
/// unique `token_hash` column relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal ID)
    pub sub: String,

    /// Role of the principal at issuance time
    pub role: Role,

    /// Issuer
    pub iss: String,

    /// Issued at timestamp (seconds)
    pub iat: i64,

    /// Expiration timestamp (seconds)
    pub exp: i64,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Token kind, fixed at issuance
    pub typ: TokenKind,
}

impl Claims {
    /// Creates new claims for an access token
    pub fn new_access_token(
        principal_id: Uuid,
        role: Role,
        issuer: &str,
        ttl_minutes: i64,
    ) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::minutes(ttl_minutes);

        Self {
            sub: principal_id.to_string(),
            role,
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            jti: Uuid::new_v4().to_string(),
            typ: TokenKind::Access,
        }
    }

    /// Creates new claims for a refresh token
    pub fn new_refresh_token(
        principal_id: Uuid,
        role: Role,
        issuer: &str,
        ttl_days: i64,
    ) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::days(ttl_days);

        Self {
            sub: principal_id.to_string(),
            role,
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            jti: Uuid::new_v4().to_string(),
            typ: TokenKind::Refresh,
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets the principal ID from the claims
    pub fn principal_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Client/session metadata captured at login and carried across rotations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    /// Client-provided device identifier
    pub device_id: Option<String>,

    /// User-Agent header of the login request
    pub user_agent: Option<String>,

    /// Remote address of the login request
    pub ip: Option<String>,
}

/// Refresh token record persisted in the database
///
/// One record per issued refresh token. Records are never deleted by normal
/// operation: revoked records are what makes reuse detection possible.
/// `replaced_by` is set if and only if the record was revoked by rotation;
/// logout-revocation leaves it `None`. "Expired" is derived from
/// `expires_at` on every read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Unique identifier for the record
    pub id: Uuid,

    /// Principal this token belongs to
    pub principal_id: Uuid,

    /// SHA-256 digest of the issued token (never the raw token)
    pub token_hash: String,

    /// Timestamp when the token was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been revoked (monotonic: never reverts)
    pub revoked: bool,

    /// Hash of the successor token, set by rotation only
    pub replaced_by: Option<String>,

    /// Client-provided device identifier
    pub device_id: Option<String>,

    /// User-Agent header of the issuing request
    pub user_agent: Option<String>,

    /// Remote address of the issuing request
    pub ip: Option<String>,
}

impl RefreshTokenRecord {
    /// Creates a new active refresh token record
    pub fn new(
        principal_id: Uuid,
        token_hash: String,
        ttl_days: i64,
        meta: SessionMeta,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            principal_id,
            token_hash,
            issued_at: now,
            expires_at: now + Duration::days(ttl_days),
            revoked: false,
            replaced_by: None,
            device_id: meta.device_id,
            user_agent: meta.user_agent,
            ip: meta.ip,
        }
    }

    /// Checks if the record has expired (derived state)
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Checks if the record can still be redeemed
    pub fn is_active(&self) -> bool {
        !self.is_expired() && !self.revoked
    }

    /// Revokes the record without a successor (logout path)
    pub fn revoke(&mut self) {
        self.revoked = true;
    }

    /// Revokes the record in favor of a successor (rotation path)
    pub fn mark_rotated(&mut self, successor_hash: String) {
        self.revoked = true;
        self.replaced_by = Some(successor_hash);
    }

    /// Session metadata carried by this record
    pub fn meta(&self) -> SessionMeta {
        SessionMeta {
            device_id: self.device_id.clone(),
            user_agent: self.user_agent.clone(),
            ip: self.ip.clone(),
        }
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_ttl_minutes: i64,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in: access_ttl_minutes * 60,
            refresh_expires_in: refresh_ttl_days * 24 * 60 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_claims() {
        let principal_id = Uuid::new_v4();
        let claims = Claims::new_access_token(principal_id, Role::User, "plaza", 15);

        assert_eq!(claims.sub, principal_id.to_string());
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.iss, "plaza");
        assert_eq!(claims.typ, TokenKind::Access);
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_refresh_token_claims() {
        let principal_id = Uuid::new_v4();
        let claims = Claims::new_refresh_token(principal_id, Role::Admin, "plaza", 14);

        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.typ, TokenKind::Refresh);
        assert_eq!(claims.exp - claims.iat, 14 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_kind_wire_form() {
        assert_eq!(serde_json::to_string(&TokenKind::Access).unwrap(), "\"access\"");
        assert_eq!(serde_json::to_string(&TokenKind::Refresh).unwrap(), "\"refresh\"");
    }

    #[test]
    fn test_claims_principal_id_parsing() {
        let principal_id = Uuid::new_v4();
        let claims = Claims::new_access_token(principal_id, Role::User, "plaza", 15);

        assert_eq!(claims.principal_id().unwrap(), principal_id);
    }

    #[test]
    fn test_claims_jti_unique() {
        let principal_id = Uuid::new_v4();
        let a = Claims::new_refresh_token(principal_id, Role::User, "plaza", 14);
        let b = Claims::new_refresh_token(principal_id, Role::User, "plaza", 14);

        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_claims_expiration() {
        let principal_id = Uuid::new_v4();
        let mut claims = Claims::new_access_token(principal_id, Role::User, "plaza", 15);

        claims.exp = Utc::now().timestamp() - 1;
        assert!(claims.is_expired());
    }

    #[test]
    fn test_record_creation() {
        let principal_id = Uuid::new_v4();
        let record = RefreshTokenRecord::new(
            principal_id,
            "hashed_token_value".to_string(),
            14,
            SessionMeta::default(),
        );

        assert_eq!(record.principal_id, principal_id);
        assert_eq!(record.token_hash, "hashed_token_value");
        assert!(!record.revoked);
        assert!(record.replaced_by.is_none());
        assert!(record.is_active());
    }

    #[test]
    fn test_record_logout_revocation() {
        let mut record = RefreshTokenRecord::new(
            Uuid::new_v4(),
            "hash".to_string(),
            14,
            SessionMeta::default(),
        );

        record.revoke();

        assert!(record.revoked);
        assert!(!record.is_active());
        // Logout-revocation leaves no successor
        assert!(record.replaced_by.is_none());
    }

    #[test]
    fn test_record_rotation_revocation() {
        let mut record = RefreshTokenRecord::new(
            Uuid::new_v4(),
            "hash".to_string(),
            14,
            SessionMeta::default(),
        );

        record.mark_rotated("successor_hash".to_string());

        assert!(record.revoked);
        assert_eq!(record.replaced_by.as_deref(), Some("successor_hash"));
    }

    #[test]
    fn test_record_expiration_is_derived() {
        let mut record = RefreshTokenRecord::new(
            Uuid::new_v4(),
            "hash".to_string(),
            14,
            SessionMeta::default(),
        );

        record.expires_at = Utc::now() - Duration::days(1);

        assert!(record.is_expired());
        assert!(!record.is_active());
        // Expiry never flips the stored revocation flag
        assert!(!record.revoked);
    }

    #[test]
    fn test_record_carries_session_meta() {
        let meta = SessionMeta {
            device_id: Some("device-1".to_string()),
            user_agent: Some("plaza-ios/2.3".to_string()),
            ip: Some("203.0.113.7".to_string()),
        };
        let record =
            RefreshTokenRecord::new(Uuid::new_v4(), "hash".to_string(), 14, meta.clone());

        assert_eq!(record.meta(), meta);
    }

    #[test]
    fn test_token_pair_expiry_seconds() {
        let pair = TokenPair::new("access".to_string(), "refresh".to_string(), 15, 14);

        assert_eq!(pair.access_expires_in, 900);
        assert_eq!(pair.refresh_expires_in, 14 * 86400);
    }

    #[test]
    fn test_token_pair_serialization() {
        let pair = TokenPair::new("access".to_string(), "refresh".to_string(), 15, 14);

        let json = serde_json::to_string(&pair).unwrap();
        let deserialized: TokenPair = serde_json::from_str(&json).unwrap();

        assert_eq!(pair, deserialized);
    }
}
