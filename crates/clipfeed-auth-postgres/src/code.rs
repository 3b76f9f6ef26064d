//! Authorization code storage for PostgreSQL.

use async_trait::async_trait;
use serde_json::Value;
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;

use clipfeed_auth::storage::AuthorizationCodeStorage;
use clipfeed_auth::types::AuthorizationCode;
use clipfeed_auth::{AuthError, AuthResult};

use crate::{PgPool, StorageError};

/// Authorization code storage backed by the `oauth_authorization_codes`
/// table.
pub struct PostgresAuthorizationCodeStorage {
    pool: PgPool,
}

impl PostgresAuthorizationCodeStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorizationCodeStorage for PostgresAuthorizationCodeStorage {
    async fn store(&self, code: &AuthorizationCode) -> AuthResult<bool> {
        let resource = serde_json::to_value(code).map_err(StorageError::from)?;
        // Insert-if-absent: a code value collision leaves the existing row
        // untouched and reports it, so the caller can regenerate.
        let result = query(
            r#"
            INSERT INTO oauth_authorization_codes (code, resource, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(&code.code)
        .bind(&resource)
        .bind(code.expires_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(result.rows_affected() == 1)
    }

    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        // Single-statement delete-and-return: Postgres row locking makes
        // exactly one concurrent caller see the row.
        let resource: Option<Value> = query_scalar(
            r#"
            DELETE FROM oauth_authorization_codes WHERE code = $1 RETURNING resource
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::from)?;

        let record: Option<AuthorizationCode> = resource
            .map(|r| {
                serde_json::from_value(r)
                    .map_err(|e| AuthError::storage(format!("corrupt code record: {e}")))
            })
            .transpose()?;

        // An expired row is already deleted at this point; report it absent.
        Ok(record.filter(|r| !r.is_expired()))
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let result = query(
            r#"
            DELETE FROM oauth_authorization_codes WHERE expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(result.rows_affected())
    }
}
