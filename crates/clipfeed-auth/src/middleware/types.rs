//! Authenticated request context.

use serde_json::{Map, Value};

/// Identity attached to a request after authentication succeeds.
///
/// Both token kinds resolve to this one shape, so protected handlers never
/// care which credential the caller presented. `scope` is `Some` for server
/// access tokens and `None` for platform identity tokens, which carry full
/// first-party access.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    /// Platform user id.
    pub user_id: String,
    /// Email, if known.
    pub email: Option<String>,
    /// Whether the platform has verified the email.
    pub email_verified: bool,
    /// Display name, if known (identity tokens only).
    pub display_name: Option<String>,
    /// Avatar URL, if known (identity tokens only).
    pub photo_url: Option<String>,
    /// Space-separated granted scopes; `None` means unscoped first-party
    /// access.
    pub scope: Option<String>,
    /// Remaining claims from the verified credential (`jti`, `iat`, ...),
    /// for handlers that need more than the named fields.
    pub claims: Map<String, Value>,
}

impl AuthContext {
    /// Whether the context grants `scope`.
    ///
    /// Unscoped (first-party) contexts grant everything.
    pub fn has_scope(&self, scope: &str) -> bool {
        match &self.scope {
            None => true,
            Some(granted) => granted.split_whitespace().any(|s| s == scope),
        }
    }
}
