//! Revoked token storage for PostgreSQL.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use time::OffsetDateTime;

use clipfeed_auth::AuthResult;
use clipfeed_auth::storage::RevokedTokenStorage;

use crate::{PgPool, StorageError};

/// Revoked jti storage backed by the `oauth_revoked_tokens` table.
pub struct PostgresRevokedTokenStorage {
    pool: PgPool,
}

impl PostgresRevokedTokenStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevokedTokenStorage for PostgresRevokedTokenStorage {
    async fn revoke(&self, jti: &str, expires_at: OffsetDateTime) -> AuthResult<()> {
        // Idempotent: re-revoking an already-revoked jti succeeds.
        query(
            r#"
            INSERT INTO oauth_revoked_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> AuthResult<bool> {
        let exists: bool = query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM oauth_revoked_tokens WHERE jti = $1)
            "#,
        )
        .bind(jti)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(exists)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let result = query(
            r#"
            DELETE FROM oauth_revoked_tokens WHERE expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(result.rows_affected())
    }
}
