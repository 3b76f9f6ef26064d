//! Pending authorization code records.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A pending authorization code awaiting redemption at the token endpoint.
///
/// Codes are single-use: consuming one removes it from storage atomically,
/// so concurrent redemption attempts resolve to exactly one winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    /// The opaque code value handed to the client (32 random bytes,
    /// base64url without padding).
    pub code: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Redirect URI the authorization request used; the token request must
    /// present the same value.
    pub redirect_uri: String,

    /// PKCE code challenge (S256 of the verifier).
    pub code_challenge: String,

    /// Challenge method. Only `S256` is ever stored.
    pub code_challenge_method: String,

    /// Authenticated user the code binds to.
    pub user_id: String,

    /// User's email, carried into the access token claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Scope granted by the authorization.
    pub scope: String,

    /// Expiry instant. Expired codes are rejected on consumption and swept
    /// by the background cleanup task.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Issuance timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AuthorizationCode {
    /// Whether the code's expiry instant has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= OffsetDateTime::now_utc()
    }
}
