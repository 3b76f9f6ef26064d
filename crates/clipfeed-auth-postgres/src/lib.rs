//! PostgreSQL storage backend for clipfeed-auth.
//!
//! Provides persistent storage for:
//!
//! - Registered OAuth clients
//! - Pending authorization codes (single-use, consumed atomically)
//! - Revoked token jtis (RFC 7009)
//!
//! Records are stored as JSONB documents keyed by their natural id, with
//! expiry columns lifted out for indexed cleanup. [`run_migrations`] creates
//! the tables on startup; the statements are idempotent.
//!
//! # Example
//!
//! ```ignore
//! use clipfeed_auth_postgres::{PostgresAuthStorage, connect};
//!
//! let pool = connect("postgres://localhost/clipfeed").await?;
//! clipfeed_auth_postgres::run_migrations(&pool).await?;
//! let storage = PostgresAuthStorage::new(pool);
//! ```

pub mod client;
pub mod code;
pub mod revoked_token;

use std::str::FromStr;

use sqlx_core::pool::Pool;
use sqlx_core::query::query;
use sqlx_postgres::{PgConnectOptions, PgPoolOptions, Postgres};

pub use client::PostgresClientStorage;
pub use code::PostgresAuthorizationCodeStorage;
pub use revoked_token::PostgresRevokedTokenStorage;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for clipfeed_auth::AuthError {
    fn from(e: StorageError) -> Self {
        clipfeed_auth::AuthError::storage(e.to_string())
    }
}

// =============================================================================
// Pool Setup
// =============================================================================

/// Connects to PostgreSQL with a bounded pool.
pub async fn connect(database_url: &str, max_connections: u32) -> StorageResult<PgPool> {
    let options = PgConnectOptions::from_str(database_url)?;
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Creates the auth tables if they do not exist.
pub async fn run_migrations(pool: &PgPool) -> StorageResult<()> {
    query(
        r#"
        CREATE TABLE IF NOT EXISTS oauth_clients (
            client_id TEXT PRIMARY KEY,
            resource JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    query(
        r#"
        CREATE TABLE IF NOT EXISTS oauth_authorization_codes (
            code TEXT PRIMARY KEY,
            resource JSONB NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    query(
        r#"
        CREATE INDEX IF NOT EXISTS oauth_authorization_codes_expires_at_idx
        ON oauth_authorization_codes (expires_at)
        "#,
    )
    .execute(pool)
    .await?;

    query(
        r#"
        CREATE TABLE IF NOT EXISTS oauth_revoked_tokens (
            jti TEXT PRIMARY KEY,
            expires_at TIMESTAMPTZ NOT NULL,
            revoked_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;
    query(
        r#"
        CREATE INDEX IF NOT EXISTS oauth_revoked_tokens_expires_at_idx
        ON oauth_revoked_tokens (expires_at)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("auth storage migrations applied");
    Ok(())
}

// =============================================================================
// Combined Storage
// =============================================================================

/// Convenience bundle of all three Postgres storage backends sharing one
/// pool.
#[derive(Clone)]
pub struct PostgresAuthStorage {
    pool: PgPool,
}

impl PostgresAuthStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn clients(&self) -> PostgresClientStorage {
        PostgresClientStorage::new(self.pool.clone())
    }

    pub fn codes(&self) -> PostgresAuthorizationCodeStorage {
        PostgresAuthorizationCodeStorage::new(self.pool.clone())
    }

    pub fn revoked_tokens(&self) -> PostgresRevokedTokenStorage {
        PostgresRevokedTokenStorage::new(self.pool.clone())
    }
}
