//! Token repository trait defining the interface for refresh token
//! persistence.
//!
//! # Security Considerations
//! - Only SHA-256 digests of tokens are ever stored
//! - Revocation is monotonic: implementations must never flip `revoked`
//!   back to `false`
//! - Records are never deleted by normal operation; revoked records are
//!   the raw material for reuse detection

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainError;

/// Repository trait for RefreshTokenRecord persistence operations
///
/// All writers follow a conditional-update discipline: revocations are
/// compare-and-set on `revoked = false`, never blind overwrites. This is
/// what guarantees the single-winner property for concurrent rotations of
/// the same token.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Persist a new refresh token record
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The saved record
    /// * `Err(DomainError)` - Save failed (e.g., duplicate token hash)
    async fn save(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError>;

    /// Find a refresh token record by its hashed value
    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DomainError>;

    /// Find all active (non-revoked, non-expired) records for a principal
    async fn find_active_by_principal(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError>;

    /// Atomically retire `old_hash` in favor of `replacement`
    ///
    /// Both writes happen in one transaction: the old record is revoked
    /// with `replaced_by = replacement.token_hash`, conditioned on it not
    /// being revoked already (compare-and-set), and the replacement is
    /// inserted. No reader may observe one write without the other.
    ///
    /// # Returns
    /// * `Ok(true)` - Rotation succeeded; this caller won
    /// * `Ok(false)` - The old record was already revoked (CAS lost) or
    ///   does not exist; nothing was written
    /// * `Err(DomainError)` - Store error; the transaction rolled back
    async fn rotate(
        &self,
        old_hash: &str,
        replacement: RefreshTokenRecord,
    ) -> Result<bool, DomainError>;

    /// Revoke a record without a successor (logout path)
    ///
    /// Compare-and-set on `revoked = false`; `replaced_by` stays `None`,
    /// which distinguishes logout-revocation from rotation-revocation.
    ///
    /// # Returns
    /// * `Ok(true)` - Record was revoked by this call
    /// * `Ok(false)` - Record not found or already revoked
    async fn revoke(&self, token_hash: &str) -> Result<bool, DomainError>;

    /// Revoke all active records owned by a principal
    ///
    /// Must not affect any other principal's records.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records revoked
    async fn revoke_all_for_principal(&self, principal_id: Uuid) -> Result<usize, DomainError>;

    /// Revoke every successor along the `replaced_by` chain of `token_hash`
    ///
    /// Used when a revoked token resurfaces: the whole descending lineage
    /// is presumed compromised. The starting record itself is already
    /// revoked and is left untouched.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of successors revoked
    async fn revoke_successors(&self, token_hash: &str) -> Result<usize, DomainError>;

    /// Count active records for a principal
    async fn count_active_for_principal(&self, principal_id: Uuid) -> Result<usize, DomainError> {
        let records = self.find_active_by_principal(principal_id).await?;
        Ok(records.len())
    }
}
