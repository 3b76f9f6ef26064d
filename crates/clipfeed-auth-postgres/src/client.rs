//! Registered client storage for PostgreSQL.

use async_trait::async_trait;
use serde_json::Value;
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;

use clipfeed_auth::storage::ClientStorage;
use clipfeed_auth::types::RegisteredClient;
use clipfeed_auth::{AuthError, AuthResult};

use crate::{PgPool, StorageError};

/// Client storage backed by the `oauth_clients` table.
pub struct PostgresClientStorage {
    pool: PgPool,
}

impl PostgresClientStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStorage for PostgresClientStorage {
    async fn store(&self, client: &RegisteredClient) -> AuthResult<()> {
        let resource = serde_json::to_value(client).map_err(StorageError::from)?;
        query(
            r#"
            INSERT INTO oauth_clients (client_id, resource)
            VALUES ($1, $2)
            ON CONFLICT (client_id) DO UPDATE SET resource = EXCLUDED.resource
            "#,
        )
        .bind(&client.client_id)
        .bind(&resource)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }

    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<RegisteredClient>> {
        let resource: Option<Value> = query_scalar(
            r#"
            SELECT resource FROM oauth_clients WHERE client_id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::from)?;

        resource
            .map(|r| {
                serde_json::from_value(r)
                    .map_err(|e| AuthError::storage(format!("corrupt client record: {e}")))
            })
            .transpose()
    }
}
