//! Mock implementation of TokenRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// In-memory token repository for testing
///
/// All mutation happens under one write lock, which gives the same
/// atomicity the MySQL implementation gets from transactions. Clones
/// share the underlying store, so tests can keep a handle for inspection
/// after moving a clone into the service under test.
#[derive(Clone)]
pub struct MockTokenRepository {
    records: Arc<RwLock<HashMap<String, RefreshTokenRecord>>>,
}

impl MockTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Snapshot a record by hash (test inspection helper)
    pub async fn get(&self, token_hash: &str) -> Option<RefreshTokenRecord> {
        let records = self.records.read().await;
        records.get(token_hash).cloned()
    }

    /// Total number of stored records, revoked ones included
    pub async fn len(&self) -> usize {
        let records = self.records.read().await;
        records.len()
    }
}

impl Default for MockTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn save(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        let mut records = self.records.write().await;

        if records.contains_key(&record.token_hash) {
            return Err(DomainError::Internal {
                message: "Duplicate token hash".to_string(),
            });
        }

        records.insert(record.token_hash.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(token_hash).cloned())
    }

    async fn find_active_by_principal(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.principal_id == principal_id && r.is_active())
            .cloned()
            .collect())
    }

    async fn rotate(
        &self,
        old_hash: &str,
        replacement: RefreshTokenRecord,
    ) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;

        // Compare-and-set: only an unrevoked record may be rotated
        match records.get_mut(old_hash) {
            Some(old) if !old.revoked => {
                old.mark_rotated(replacement.token_hash.clone());
            }
            _ => return Ok(false),
        }

        records.insert(replacement.token_hash.clone(), replacement);
        Ok(true)
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;

        match records.get_mut(token_hash) {
            Some(record) if !record.revoked => {
                record.revoke();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_principal(&self, principal_id: Uuid) -> Result<usize, DomainError> {
        let mut records = self.records.write().await;
        let mut count = 0;

        // Active records only; an expired record is already unredeemable
        // and the MySQL implementation does not count it either
        for record in records.values_mut() {
            if record.principal_id == principal_id && record.is_active() {
                record.revoke();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn revoke_successors(&self, token_hash: &str) -> Result<usize, DomainError> {
        let mut records = self.records.write().await;
        let mut count = 0;

        let mut next = records
            .get(token_hash)
            .and_then(|r| r.replaced_by.clone());

        while let Some(hash) = next {
            match records.get_mut(&hash) {
                Some(record) => {
                    if !record.revoked {
                        record.revoked = true;
                        count += 1;
                    }
                    next = record.replaced_by.clone();
                }
                None => break,
            }
        }

        Ok(count)
    }
}
