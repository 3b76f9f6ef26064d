//! Platform identity provider contract.
//!
//! The authorization flow never collects credentials itself. The sign-in
//! page authenticates the user against the Clipfeed identity platform and
//! posts back an identity token; the server verifies that token through an
//! [`IdentityVerifier`] before issuing an authorization code. The same
//! verifier backs the identity-token path of the request authenticator.

use async_trait::async_trait;

use crate::AuthResult;

/// Claims extracted from a verified platform identity token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Stable platform user id.
    pub uid: String,
    /// Email, if the account has one.
    pub email: Option<String>,
    /// Whether the email has been verified by the platform.
    pub email_verified: bool,
    /// Display name, if set.
    pub display_name: Option<String>,
    /// Avatar URL, if set.
    pub photo_url: Option<String>,
}

/// Verifies platform identity tokens.
///
/// Implementations check signature, expiry, issuer, and audience against
/// the identity platform's published keys. A failed verification returns
/// [`AuthError::Unauthorized`](crate::AuthError::Unauthorized); callers do
/// not distinguish failure causes.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify_identity_token(&self, token: &str) -> AuthResult<IdentityClaims>;
}
