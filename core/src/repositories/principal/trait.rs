//! Principal repository trait: the credential-store boundary.
//!
//! The credential store is consulted, not owned, by the authentication
//! core. Beyond a last-login timestamp touch, principals are read-only
//! for this subsystem.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::principal::Principal;
use crate::errors::DomainError;

/// Repository trait for Principal lookup
#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Find a principal by login identifier
    ///
    /// # Returns
    /// * `Ok(Some(Principal))` - Principal found
    /// * `Ok(None)` - No principal with that email
    /// * `Err(DomainError)` - Store error occurred
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError>;

    /// Find a principal by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, DomainError>;

    /// Record the principal's last successful login
    async fn touch_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError>;
}
