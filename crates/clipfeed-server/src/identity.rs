//! Identity token verification against the platform's JWKS endpoint.
//!
//! Identity tokens are RS256 JWTs signed by the Clipfeed identity platform.
//! Verification fetches the platform's public keys from its JWKS endpoint,
//! caches them for a bounded TTL, and checks signature, expiry, issuer, and
//! audience. Every failure collapses to a uniform `Unauthorized`; the
//! underlying cause goes to the debug log only.

use std::time::Instant;

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use clipfeed_auth::{AuthError, AuthResult, IdentityClaims, IdentityVerifier};

use crate::config::IdentityConfig;

#[derive(Debug, Deserialize)]
struct RawIdentityClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// [`IdentityVerifier`] backed by a remote JWKS endpoint.
pub struct JwksIdentityVerifier {
    config: IdentityConfig,
    http: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
}

impl JwksIdentityVerifier {
    pub fn new(config: IdentityConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            config,
            http,
            cache: RwLock::new(None),
        }
    }

    async fn find_key(&self, kid: &str) -> AuthResult<Jwk> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.fetched_at.elapsed() < self.config.jwks_cache_ttl {
                if let Some(key) = cached.keys.find(kid) {
                    return Ok(key.clone());
                }
            }
        }

        // Cache miss, stale cache, or unknown kid (key rotation): refetch.
        let keys: JwkSet = self
            .http
            .get(&self.config.jwks_uri)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                debug!(error = %e, "JWKS fetch failed");
                AuthError::unauthorized("identity verification unavailable")
            })?
            .json()
            .await
            .map_err(|e| {
                debug!(error = %e, "JWKS response was not a valid key set");
                AuthError::unauthorized("identity verification unavailable")
            })?;

        let key = keys.find(kid).cloned();
        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| AuthError::unauthorized("unknown signing key"))
    }
}

#[async_trait]
impl IdentityVerifier for JwksIdentityVerifier {
    async fn verify_identity_token(&self, token: &str) -> AuthResult<IdentityClaims> {
        let header = decode_header(token)
            .map_err(|_| AuthError::unauthorized("malformed identity token"))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::unauthorized("identity token has no key id"))?;

        let jwk = self.find_key(&kid).await?;
        let decoding_key = DecodingKey::from_jwk(&jwk)
            .map_err(|_| AuthError::unauthorized("unusable signing key"))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let data = decode::<RawIdentityClaims>(token, &decoding_key, &validation).map_err(|e| {
            debug!(error = %e, "identity token verification failed");
            AuthError::unauthorized("invalid identity token")
        })?;

        let claims = data.claims;
        Ok(IdentityClaims {
            uid: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified,
            display_name: claims.name,
            photo_url: claims.picture,
        })
    }
}
