//! Authorization code storage.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AuthorizationCode;

/// Persistence for pending authorization codes.
#[async_trait]
pub trait AuthorizationCodeStorage: Send + Sync {
    /// Stores a freshly issued code, if no record with the same code value
    /// exists yet.
    ///
    /// Returns `false` on a collision, leaving the existing record in place;
    /// the caller regenerates and retries.
    async fn store(&self, code: &AuthorizationCode) -> AuthResult<bool>;

    /// Atomically removes and returns the record for `code`.
    ///
    /// This is the single-use guarantee: when several redemption attempts
    /// race on the same code, exactly one caller gets `Some` and every other
    /// caller gets `None`. Backends implement this as one atomic
    /// remove-and-return, never a read followed by a delete.
    ///
    /// An expired record is deleted and reported absent, so a late
    /// redemption both burns the code and fails.
    async fn consume(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Removes expired codes, returning how many were swept.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
