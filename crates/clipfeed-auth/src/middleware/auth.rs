//! Bearer token authentication: verifier strategies and the Axum extractor.
//!
//! Protected endpoints accept two credential kinds: access tokens minted by
//! this server and platform identity tokens from the first-party apps. The
//! [`RequestAuthenticator`] tries its verifiers in order and the caller never
//! learns which stage failed.
//!
//! # Example
//!
//! ```ignore
//! use clipfeed_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn protected_handler(BearerAuth(auth): BearerAuth) -> String {
//!     format!("hello, {}", auth.user_id)
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use crate::identity::IdentityVerifier;
use crate::storage::RevokedTokenStorage;
use crate::token::codec::TokenCodec;
use crate::token::secret::SecretProvider;
use crate::{AuthError, AuthResult};

use super::types::AuthContext;

// =============================================================================
// Verifier Strategies
// =============================================================================

/// One way of turning a bearer credential into an [`AuthContext`].
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> AuthResult<AuthContext>;
}

/// Verifies access tokens minted by this server: signature, expiry, issuer,
/// the `access_token` discriminator, and the revocation set.
pub struct AccessTokenVerifier {
    codec: TokenCodec,
    secrets: Arc<dyn SecretProvider>,
    revoked: Arc<dyn RevokedTokenStorage>,
}

impl AccessTokenVerifier {
    pub fn new(
        codec: TokenCodec,
        secrets: Arc<dyn SecretProvider>,
        revoked: Arc<dyn RevokedTokenStorage>,
    ) -> Self {
        Self {
            codec,
            secrets,
            revoked,
        }
    }
}

#[async_trait]
impl TokenVerifier for AccessTokenVerifier {
    async fn verify(&self, token: &str) -> AuthResult<AuthContext> {
        let secret = self.secrets.current_signing_secret().await?;
        let claims = self.codec.verify_access_token(&secret, token)?;

        if self.revoked.is_revoked(&claims.jti).await? {
            debug!(jti = %claims.jti, "rejected revoked access token");
            return Err(AuthError::invalid_token("token has been revoked"));
        }

        let mut extra = serde_json::Map::new();
        extra.insert("jti".to_string(), claims.jti.into());
        extra.insert("iat".to_string(), claims.iat.into());
        extra.insert("exp".to_string(), claims.exp.into());

        Ok(AuthContext {
            user_id: claims.sub,
            email: claims.email,
            email_verified: false,
            display_name: None,
            photo_url: None,
            scope: Some(claims.scope),
            claims: extra,
        })
    }
}

/// Verifies platform identity tokens through the injected
/// [`IdentityVerifier`]. Produces an unscoped context.
pub struct IdentityTokenVerifier {
    identity: Arc<dyn IdentityVerifier>,
}

impl IdentityTokenVerifier {
    pub fn new(identity: Arc<dyn IdentityVerifier>) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl TokenVerifier for IdentityTokenVerifier {
    async fn verify(&self, token: &str) -> AuthResult<AuthContext> {
        let claims = self.identity.verify_identity_token(token).await?;
        Ok(AuthContext {
            user_id: claims.uid,
            email: claims.email,
            email_verified: claims.email_verified,
            display_name: claims.display_name,
            photo_url: claims.photo_url,
            scope: None,
            claims: serde_json::Map::new(),
        })
    }
}

// =============================================================================
// Request Authenticator
// =============================================================================

/// Ordered chain of token verifiers.
///
/// Verifiers run in registration order and the first success wins. Every
/// failure collapses to the same uniform `Unauthorized`, so a probing caller
/// cannot tell a bad signature from a revoked token from the wrong token
/// kind.
pub struct RequestAuthenticator {
    verifiers: Vec<Box<dyn TokenVerifier>>,
}

impl RequestAuthenticator {
    pub fn new(verifiers: Vec<Box<dyn TokenVerifier>>) -> Self {
        Self { verifiers }
    }

    /// Authenticates a bearer token against the chain.
    pub async fn authenticate(&self, token: &str) -> AuthResult<AuthContext> {
        for verifier in &self.verifiers {
            match verifier.verify(token).await {
                Ok(context) => return Ok(context),
                Err(e) => {
                    debug!(error = %e, "token verifier rejected credential");
                }
            }
        }
        Err(AuthError::unauthorized("invalid or expired token"))
    }
}

// =============================================================================
// Axum Extractor
// =============================================================================

/// Shared state for the [`BearerAuth`] extractor.
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<RequestAuthenticator>,
}

impl AuthState {
    pub fn new(authenticator: Arc<RequestAuthenticator>) -> Self {
        Self { authenticator }
    }
}

/// Axum extractor that authenticates the `Authorization: Bearer` header.
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::unauthorized("missing bearer token"))?;

        let context = auth_state.authenticator.authenticate(token).await?;
        Ok(Self(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityClaims;
    use crate::storage::MemoryAuthStorage;
    use crate::token::secret::StaticSecretProvider;
    use time::OffsetDateTime;

    const SECRET: &[u8] = b"middleware-test-secret";

    fn codec() -> TokenCodec {
        TokenCodec::new("clipfeed-auth-server", 3600, 2_592_000)
    }

    /// Accepts exactly one hard-coded identity token.
    struct FakeIdentityVerifier;

    #[async_trait]
    impl IdentityVerifier for FakeIdentityVerifier {
        async fn verify_identity_token(&self, token: &str) -> AuthResult<IdentityClaims> {
            if token == "valid-identity-token" {
                Ok(IdentityClaims {
                    uid: "platform-user".to_string(),
                    email: Some("p@example.com".to_string()),
                    email_verified: true,
                    display_name: Some("Platform User".to_string()),
                    photo_url: None,
                })
            } else {
                Err(AuthError::unauthorized("identity verification failed"))
            }
        }
    }

    fn authenticator(revoked: Arc<MemoryAuthStorage>) -> RequestAuthenticator {
        RequestAuthenticator::new(vec![
            Box::new(AccessTokenVerifier::new(
                codec(),
                Arc::new(StaticSecretProvider::new(SECRET.to_vec())),
                revoked,
            )),
            Box::new(IdentityTokenVerifier::new(Arc::new(FakeIdentityVerifier))),
        ])
    }

    #[tokio::test]
    async fn test_access_token_path() {
        let storage = Arc::new(MemoryAuthStorage::new());
        let auth = authenticator(storage);

        let token = codec()
            .mint_access_token(SECRET, "user-1", Some("u@example.com"), "agent:access")
            .unwrap();
        let context = auth.authenticate(&token).await.unwrap();

        assert_eq!(context.user_id, "user-1");
        assert_eq!(context.scope.as_deref(), Some("agent:access"));
        assert!(context.has_scope("agent:access"));
        assert!(context.claims.get("jti").is_some_and(|v| v.is_string()));
    }

    #[tokio::test]
    async fn test_identity_token_fallback() {
        let storage = Arc::new(MemoryAuthStorage::new());
        let auth = authenticator(storage);

        let context = auth.authenticate("valid-identity-token").await.unwrap();
        assert_eq!(context.user_id, "platform-user");
        assert!(context.email_verified);
        assert!(context.scope.is_none());
        assert!(context.has_scope("anything"));
    }

    #[tokio::test]
    async fn test_uniform_failure() {
        let storage = Arc::new(MemoryAuthStorage::new());
        let auth = authenticator(storage);

        let err = auth.authenticate("garbage").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_revoked_access_token_rejected() {
        let storage = Arc::new(MemoryAuthStorage::new());
        let auth = authenticator(Arc::clone(&storage));

        let codec = codec();
        let token = codec
            .mint_access_token(SECRET, "user-1", None, "agent:access")
            .unwrap();
        let claims = codec.verify_access_token(SECRET, &token).unwrap();
        storage
            .revoke(&claims.jti, OffsetDateTime::now_utc() + time::Duration::hours(1))
            .await
            .unwrap();

        let err = auth.authenticate(&token).await.unwrap_err();
        // The chain collapses the revocation failure to a uniform error.
        assert!(matches!(err, AuthError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_refresh_token_not_accepted_as_bearer() {
        let storage = Arc::new(MemoryAuthStorage::new());
        let auth = authenticator(storage);

        let refresh = codec().mint_refresh_token(SECRET, "user-1").unwrap();
        assert!(auth.authenticate(&refresh).await.is_err());
    }
}
