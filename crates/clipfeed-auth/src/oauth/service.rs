//! The authorization service: registration, code issuance, grants,
//! revocation.
//!
//! This is the protocol brain behind the HTTP handlers. It owns no state of
//! its own; clients, codes, and revocations live behind the storage traits,
//! and the signing secret is fetched per-operation from the
//! [`SecretProvider`].

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{AuthConfig, OAuthConfig};
use crate::identity::IdentityClaims;
use crate::oauth::authorize::{AuthorizationRequest, ValidatedAuthorization};
use crate::oauth::pkce::{PkceChallenge, PkceVerifier};
use crate::oauth::token::{TokenRequest, TokenResponse};
use crate::storage::{AuthorizationCodeStorage, ClientStorage, RevokedTokenStorage};
use crate::token::codec::{
    TokenCodec, decode_jti_unverified, generate_authorization_code, generate_client_id,
};
use crate::token::secret::SecretProvider;
use crate::types::{AuthorizationCode, ClientMetadata, RegisteredClient};
use crate::{AuthError, AuthResult};

/// OAuth 2.1 authorization service.
pub struct AuthorizationService {
    config: AuthConfig,
    codec: TokenCodec,
    secrets: Arc<dyn SecretProvider>,
    clients: Arc<dyn ClientStorage>,
    codes: Arc<dyn AuthorizationCodeStorage>,
    revoked: Arc<dyn RevokedTokenStorage>,
}

impl AuthorizationService {
    pub fn new(
        config: AuthConfig,
        secrets: Arc<dyn SecretProvider>,
        clients: Arc<dyn ClientStorage>,
        codes: Arc<dyn AuthorizationCodeStorage>,
        revoked: Arc<dyn RevokedTokenStorage>,
    ) -> Self {
        let codec = TokenCodec::new(
            config.issuer.clone(),
            config.oauth.access_token_lifetime.as_secs() as i64,
            config.oauth.refresh_token_lifetime.as_secs() as i64,
        );
        Self {
            config,
            codec,
            secrets,
            clients,
            codes,
            revoked,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    // ========================================================================
    // Client Registration
    // ========================================================================

    /// Registers a public client (RFC 7591 subset).
    ///
    /// Every redirect URI must be an absolute URL. The client id is a
    /// server-generated UUID and the token endpoint auth method is pinned
    /// to `none`; submitted values for either are ignored.
    pub async fn register_client(&self, metadata: ClientMetadata) -> AuthResult<RegisteredClient> {
        let client_name = match metadata.client_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                return Err(AuthError::invalid_request(
                    "client_name and redirect_uris are required",
                ));
            }
        };
        if metadata.redirect_uris.is_empty() {
            return Err(AuthError::invalid_request(
                "redirect_uris must contain at least one URI",
            ));
        }
        for uri in &metadata.redirect_uris {
            let parsed = Url::parse(uri).map_err(|_| {
                AuthError::invalid_request(format!("redirect_uri is not a valid URL: {uri}"))
            })?;
            if parsed.cannot_be_a_base() {
                return Err(AuthError::invalid_request(format!(
                    "redirect_uri must be an absolute URL: {uri}"
                )));
            }
        }

        let client = RegisteredClient {
            client_id: generate_client_id(),
            redirect_uris: metadata.redirect_uris,
            client_name,
            scope: metadata.scope,
            grant_types: OAuthConfig::GRANT_TYPES.iter().map(|s| s.to_string()).collect(),
            response_types: OAuthConfig::RESPONSE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            token_endpoint_auth_method: "none".to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.clients.store(&client).await?;

        info!(client_id = %client.client_id, "registered oauth client");
        Ok(client)
    }

    // ========================================================================
    // Authorization
    // ========================================================================

    /// Loads the client and validates an authorization request against it.
    pub async fn validate_authorize_request(
        &self,
        request: &AuthorizationRequest,
    ) -> AuthResult<(RegisteredClient, ValidatedAuthorization)> {
        let client = self
            .clients
            .find_by_client_id(&request.client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("unknown client_id"))?;
        let validated = request.validate(&client, &self.config.oauth.default_scope)?;
        Ok((client, validated))
    }

    /// Whether `redirect_uri` is registered for `client_id`.
    ///
    /// The authorization endpoint uses this to decide whether a validation
    /// error may be delivered by redirect or must stay on an error page.
    pub async fn validate_redirect_target(&self, client_id: &str, redirect_uri: &str) -> bool {
        match self.clients.find_by_client_id(client_id).await {
            Ok(Some(client)) => client.is_valid_redirect_uri(redirect_uri),
            _ => false,
        }
    }

    /// Issues an authorization code for an authenticated user and returns
    /// the redirect URL carrying it.
    ///
    /// Called after the sign-in page has verified the user's identity token.
    pub async fn approve(
        &self,
        authorization: &ValidatedAuthorization,
        identity: &IdentityClaims,
    ) -> AuthResult<String> {
        let now = OffsetDateTime::now_utc();
        let mut record = AuthorizationCode {
            code: generate_authorization_code(),
            client_id: authorization.client_id.clone(),
            redirect_uri: authorization.redirect_uri.clone(),
            code_challenge: authorization.code_challenge.as_str().to_string(),
            code_challenge_method: authorization.code_challenge_method.as_str().to_string(),
            user_id: identity.uid.clone(),
            email: identity.email.clone(),
            scope: authorization.scope.clone(),
            expires_at: now + self.config.oauth.authorization_code_lifetime,
            created_at: now,
        };

        // The store refuses to overwrite an outstanding code; regenerate on
        // a collision rather than clobber someone else's pending grant.
        let mut attempts = 0;
        while !self.codes.store(&record).await? {
            attempts += 1;
            if attempts >= 3 {
                return Err(AuthError::internal(
                    "could not allocate a unique authorization code",
                ));
            }
            warn!(client_id = %authorization.client_id, "authorization code collision, regenerating");
            record.code = generate_authorization_code();
        }

        info!(
            client_id = %authorization.client_id,
            user_id = %identity.uid,
            "issued authorization code"
        );
        authorization.success_redirect(&record.code)
    }

    // ========================================================================
    // Token Endpoint
    // ========================================================================

    /// Dispatches a token request to the matching grant handler.
    pub async fn handle_token_request(&self, request: TokenRequest) -> AuthResult<TokenResponse> {
        match request.grant_type.as_str() {
            "authorization_code" => self.exchange_code(request).await,
            "refresh_token" => self.refresh(request).await,
            other => Err(AuthError::unsupported_grant_type(other)),
        }
    }

    /// Authorization code grant: consume the code, check its bindings,
    /// verify PKCE, and mint both tokens.
    ///
    /// The code is consumed before any validation. A redemption attempt
    /// with the right code but the wrong client, redirect URI, or verifier
    /// still burns the code, so a stolen code cannot be retried.
    async fn exchange_code(&self, request: TokenRequest) -> AuthResult<TokenResponse> {
        let code = request
            .code
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("code is required"))?;
        let client_id = request
            .client_id
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("client_id is required"))?;
        let redirect_uri = request
            .redirect_uri
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("redirect_uri is required"))?;
        let verifier = request
            .code_verifier
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("code_verifier is required"))?;
        let verifier = PkceVerifier::new(verifier)?;

        let record = self
            .codes
            .consume(code)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("authorization code is invalid or already used"))?;

        if record.client_id != client_id {
            warn!(client_id, "authorization code redeemed by a different client");
            return Err(AuthError::invalid_grant(
                "authorization code was issued to a different client",
            ));
        }
        if record.redirect_uri != redirect_uri {
            return Err(AuthError::invalid_grant(
                "redirect_uri does not match the authorization request",
            ));
        }
        PkceChallenge::new(record.code_challenge.as_str())?.verify(&verifier)?;

        let secret = self.secrets.current_signing_secret().await?;
        let access_token = self.codec.mint_access_token(
            &secret,
            &record.user_id,
            record.email.as_deref(),
            &record.scope,
        )?;
        let refresh_token = self.codec.mint_refresh_token(&secret, &record.user_id)?;

        info!(client_id, user_id = %record.user_id, "exchanged authorization code for tokens");
        Ok(TokenResponse::new(
            access_token,
            self.codec.access_token_lifetime_secs(),
            record.scope,
            Some(refresh_token),
        ))
    }

    /// Refresh token grant: re-issue an access token.
    ///
    /// The refresh token is not rotated and the grant re-issues the default
    /// scope; the original grant's scope lives only in the (now expired)
    /// access token.
    async fn refresh(&self, request: TokenRequest) -> AuthResult<TokenResponse> {
        let refresh_token = request
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("refresh_token is required"))?;

        let secret = self.secrets.current_signing_secret().await?;
        // Every verification failure collapses to invalid_grant so a caller
        // cannot distinguish a bad signature from an expired, wrong-type,
        // or revoked token.
        let claims = self
            .codec
            .verify_refresh_token(&secret, refresh_token)
            .map_err(|e| {
                debug!(error = %e, "refresh token rejected");
                AuthError::invalid_grant("refresh token is invalid or expired")
            })?;
        if self.revoked.is_revoked(&claims.jti).await? {
            return Err(AuthError::invalid_grant("refresh token has been revoked"));
        }

        let scope = self.config.oauth.default_scope.clone();
        let access_token = self
            .codec
            .mint_access_token(&secret, &claims.sub, None, &scope)?;

        debug!(user_id = %claims.sub, "refreshed access token");
        Ok(TokenResponse::new(
            access_token,
            self.codec.access_token_lifetime_secs(),
            scope,
            None,
        ))
    }

    // ========================================================================
    // Revocation
    // ========================================================================

    /// Revokes a token (RFC 7009 semantics).
    ///
    /// Best-effort: the jti is read without signature verification and
    /// tombstoned with the token's own expiry. Unparseable tokens are
    /// silently ignored. This method only fails on storage errors, and the
    /// HTTP handler discards even those, answering 200 regardless.
    pub async fn revoke(&self, token: &str) -> AuthResult<()> {
        let Some((jti, expires_at)) = decode_jti_unverified(token) else {
            debug!("revocation request for unparseable token ignored");
            return Ok(());
        };
        self.revoked.revoke(&jti, expires_at).await?;
        info!(%jti, "revoked token");
        Ok(())
    }

    /// Checks whether an access token's jti has been revoked.
    pub async fn is_jti_revoked(&self, jti: &str) -> AuthResult<bool> {
        self.revoked.is_revoked(jti).await
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Sweeps expired codes and stale tombstones. Returns
    /// `(codes_swept, tombstones_swept)`.
    pub async fn cleanup_expired(&self) -> AuthResult<(u64, u64)> {
        let codes = self.codes.cleanup_expired().await?;
        let tombstones = self.revoked.cleanup_expired().await?;
        if codes > 0 || tombstones > 0 {
            debug!(codes, tombstones, "swept expired authorization state");
        }
        Ok((codes, tombstones))
    }
}
