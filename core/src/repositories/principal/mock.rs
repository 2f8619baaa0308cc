//! Mock implementation of PrincipalRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::principal::Principal;
use crate::errors::DomainError;

use super::r#trait::PrincipalRepository;

/// Mock principal repository for testing; clones share the same store
#[derive(Clone)]
pub struct MockPrincipalRepository {
    principals: Arc<RwLock<HashMap<Uuid, Principal>>>,
}

impl MockPrincipalRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            principals: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed the repository with a principal
    pub async fn insert(&self, principal: Principal) {
        let mut principals = self.principals.write().await;
        principals.insert(principal.id, principal);
    }
}

impl Default for MockPrincipalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrincipalRepository for MockPrincipalRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError> {
        let principals = self.principals.read().await;
        Ok(principals.values().find(|p| p.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, DomainError> {
        let principals = self.principals.read().await;
        Ok(principals.get(&id).cloned())
    }

    async fn touch_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut principals = self.principals.write().await;
        if let Some(principal) = principals.get_mut(&id) {
            principal.last_login_at = Some(at);
        }
        Ok(())
    }
}
