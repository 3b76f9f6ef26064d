//! Revoked token (jti tombstone) storage.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;

/// Persistence for revoked token identifiers.
///
/// Tokens are stateless JWTs, so revocation is a tombstone set keyed by
/// `jti`. Entries carry the token's own expiry so the set can be swept once
/// the token would have died anyway.
#[async_trait]
pub trait RevokedTokenStorage: Send + Sync {
    /// Records `jti` as revoked until `expires_at`. Revoking an
    /// already-revoked jti is a no-op, not an error.
    async fn revoke(&self, jti: &str, expires_at: OffsetDateTime) -> AuthResult<()>;

    /// Whether `jti` is in the tombstone set.
    async fn is_revoked(&self, jti: &str) -> AuthResult<bool>;

    /// Removes tombstones for tokens that have expired on their own,
    /// returning how many were swept.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
