//! MySQL implementation of the PrincipalRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use pz_core::domain::entities::principal::{Principal, Role};
use pz_core::errors::DomainError;
use pz_core::repositories::PrincipalRepository;

/// MySQL implementation of PrincipalRepository
pub struct MySqlPrincipalRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlPrincipalRepository {
    /// Create a new MySQL principal repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to Principal entity
    fn row_to_principal(row: &sqlx::mysql::MySqlRow) -> Result<Principal, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get id: {}", e) })?;
        let role: String = row
            .try_get("role")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get role: {}", e) })?;

        let role = match role.as_str() {
            "user" => Role::User,
            "admin" => Role::Admin,
            other => {
                return Err(DomainError::Internal {
                    message: format!("Unknown role in database: {}", other),
                })
            }
        };

        Ok(Principal {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid principal UUID: {}", e),
            })?,
            email: row.try_get("email").map_err(|e| DomainError::Internal {
                message: format!("Failed to get email: {}", e),
            })?,
            password_hash: row.try_get("password_hash").map_err(|e| DomainError::Internal {
                message: format!("Failed to get password_hash: {}", e),
            })?,
            role,
            is_suspended: row.try_get("is_suspended").map_err(|e| DomainError::Internal {
                message: format!("Failed to get is_suspended: {}", e),
            })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            last_login_at: row
                .try_get::<Option<DateTime<Utc>>, _>("last_login_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get last_login_at: {}", e),
                })?,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, email, password_hash, role, is_suspended, created_at, last_login_at";

#[async_trait]
impl PrincipalRepository for MySqlPrincipalRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError> {
        let query = format!(
            "SELECT {} FROM principals WHERE email = ? LIMIT 1",
            SELECT_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find principal by email: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_principal(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, DomainError> {
        let query = format!("SELECT {} FROM principals WHERE id = ? LIMIT 1", SELECT_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find principal by id: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_principal(&row)?)),
            None => Ok(None),
        }
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        sqlx::query("UPDATE principals SET last_login_at = ? WHERE id = ?")
            .bind(at)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to update last login: {}", e),
            })?;

        Ok(())
    }
}
