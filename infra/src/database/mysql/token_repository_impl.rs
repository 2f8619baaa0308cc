//! MySQL implementation of the TokenRepository trait.
//!
//! Refresh token records are append-mostly: inserts at login and rotation,
//! conditional revocation updates, and never a DELETE. Rotation runs both
//! of its writes inside one transaction so no reader can observe the old
//! record retired without its successor existing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use pz_core::domain::entities::token::RefreshTokenRecord;
use pz_core::errors::DomainError;
use pz_core::repositories::TokenRepository;

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshTokenRecord entity
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<RefreshTokenRecord, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get id: {}", e) })?;
        let principal_id: String = row.try_get("principal_id").map_err(|e| {
            DomainError::Internal { message: format!("Failed to get principal_id: {}", e) }
        })?;

        Ok(RefreshTokenRecord {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid record UUID: {}", e),
            })?,
            principal_id: Uuid::parse_str(&principal_id).map_err(|e| DomainError::Internal {
                message: format!("Invalid principal UUID: {}", e),
            })?,
            token_hash: row.try_get("token_hash").map_err(|e| DomainError::Internal {
                message: format!("Failed to get token_hash: {}", e),
            })?,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get issued_at: {}", e),
                })?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get expires_at: {}", e),
                })?,
            revoked: row.try_get("revoked").map_err(|e| DomainError::Internal {
                message: format!("Failed to get revoked: {}", e),
            })?,
            replaced_by: row.try_get("replaced_by").map_err(|e| DomainError::Internal {
                message: format!("Failed to get replaced_by: {}", e),
            })?,
            device_id: row.try_get("device_id").map_err(|e| DomainError::Internal {
                message: format!("Failed to get device_id: {}", e),
            })?,
            user_agent: row.try_get("user_agent").map_err(|e| DomainError::Internal {
                message: format!("Failed to get user_agent: {}", e),
            })?,
            ip: row.try_get("ip").map_err(|e| DomainError::Internal {
                message: format!("Failed to get ip: {}", e),
            })?,
        })
    }
}

const SELECT_COLUMNS: &str = "id, principal_id, token_hash, issued_at, expires_at, \
                              revoked, replaced_by, device_id, user_agent, ip";

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, principal_id, token_hash, issued_at, expires_at,
                revoked, replaced_by, device_id, user_agent, ip
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(record.id.to_string())
            .bind(record.principal_id.to_string())
            .bind(&record.token_hash)
            .bind(record.issued_at)
            .bind(record.expires_at)
            .bind(record.revoked)
            .bind(&record.replaced_by)
            .bind(&record.device_id)
            .bind(&record.user_agent)
            .bind(&record.ip)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to save refresh token record: {}", e),
            })?;

        Ok(record)
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE token_hash = ? LIMIT 1",
            SELECT_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find refresh token record: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_active_by_principal(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let query = format!(
            r#"
            SELECT {}
            FROM refresh_tokens
            WHERE principal_id = ?
                AND revoked = FALSE
                AND expires_at > ?
            ORDER BY issued_at DESC
            "#,
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(principal_id.to_string())
            .bind(Utc::now())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find principal records: {}", e),
            })?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(Self::row_to_record(&row)?);
        }

        Ok(records)
    }

    async fn rotate(
        &self,
        old_hash: &str,
        replacement: RefreshTokenRecord,
    ) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| DomainError::Internal {
            message: format!("Failed to begin rotation transaction: {}", e),
        })?;

        // Compare-and-set: only one concurrent rotation of the same token
        // can see revoked = FALSE
        let update = r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, replaced_by = ?
            WHERE token_hash = ? AND revoked = FALSE
        "#;
        let updated = sqlx::query(update)
            .bind(&replacement.token_hash)
            .bind(old_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to retire old refresh token: {}", e),
            })?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(|e| DomainError::Internal {
                message: format!("Failed to roll back rotation: {}", e),
            })?;
            return Ok(false);
        }

        let insert = r#"
            INSERT INTO refresh_tokens (
                id, principal_id, token_hash, issued_at, expires_at,
                revoked, replaced_by, device_id, user_agent, ip
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;
        sqlx::query(insert)
            .bind(replacement.id.to_string())
            .bind(replacement.principal_id.to_string())
            .bind(&replacement.token_hash)
            .bind(replacement.issued_at)
            .bind(replacement.expires_at)
            .bind(replacement.revoked)
            .bind(&replacement.replaced_by)
            .bind(&replacement.device_id)
            .bind(&replacement.user_agent)
            .bind(&replacement.ip)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to insert replacement record: {}", e),
            })?;

        tx.commit().await.map_err(|e| DomainError::Internal {
            message: format!("Failed to commit rotation: {}", e),
        })?;

        Ok(true)
    }

    async fn revoke(&self, token_hash: &str) -> Result<bool, DomainError> {
        // replaced_by stays NULL: logout-revocation, not rotation
        let query = r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token_hash = ? AND revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to revoke refresh token: {}", e),
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_principal(&self, principal_id: Uuid) -> Result<usize, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE principal_id = ?
                AND revoked = FALSE
                AND expires_at > ?
        "#;

        let result = sqlx::query(query)
            .bind(principal_id.to_string())
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to revoke principal records: {}", e),
            })?;

        Ok(result.rows_affected() as usize)
    }

    async fn revoke_successors(&self, token_hash: &str) -> Result<usize, DomainError> {
        let mut count = 0;
        let mut current = token_hash.to_string();

        // Chains are short (one link per rotation of one session), so a
        // walk of single-row queries is fine here
        loop {
            let row = sqlx::query("SELECT replaced_by FROM refresh_tokens WHERE token_hash = ?")
                .bind(&current)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to walk token lineage: {}", e),
                })?;

            let successor: Option<String> = match row {
                Some(row) => row.try_get("replaced_by").map_err(|e| DomainError::Internal {
                    message: format!("Failed to get replaced_by: {}", e),
                })?,
                None => None,
            };

            let Some(successor) = successor else {
                break;
            };

            if self.revoke(&successor).await? {
                count += 1;
            }
            current = successor;
        }

        Ok(count)
    }
}
