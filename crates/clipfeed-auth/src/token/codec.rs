//! Access and refresh token minting and verification.
//!
//! Tokens are HS256 JWTs signed with a secret fetched per-operation from a
//! [`SecretProvider`](crate::token::secret::SecretProvider). Access tokens
//! and refresh tokens carry a `token_type` discriminator claim so one can
//! never be accepted where the other is expected.
//!
//! ## Example
//!
//! ```ignore
//! use clipfeed_auth::token::codec::TokenCodec;
//!
//! let codec = TokenCodec::new("clipfeed-auth-server", 3600, 2_592_000);
//! let token = codec.mint_access_token(secret, "user-1", Some("u@example.com"), "agent:access")?;
//! let claims = codec.verify_access_token(secret, &token)?;
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{AuthError, AuthResult};

// ============================================================================
// Claims
// ============================================================================

/// Discriminator distinguishing access tokens from refresh tokens.
///
/// Verification checks this claim before anything else that depends on the
/// token's role, so a refresh token presented as a bearer credential (or an
/// access token presented to the refresh grant) is rejected even though both
/// carry valid signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    #[serde(rename = "access_token")]
    Access,
    #[serde(rename = "refresh_token")]
    Refresh,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issuer.
    pub iss: String,
    /// Subject: the platform user id.
    pub sub: String,
    /// User's email, if known at authorization time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Space-separated granted scopes.
    pub scope: String,
    /// Always [`TokenType::Access`].
    pub token_type: TokenType,
    /// Issued-at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
    /// Token identifier, checked against the revocation set.
    pub jti: String,
}

/// Claims carried by a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Issuer.
    pub iss: String,
    /// Subject: the platform user id.
    pub sub: String,
    /// Always [`TokenType::Refresh`].
    pub token_type: TokenType,
    /// Issued-at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
    /// Token identifier, checked against the revocation set.
    pub jti: String,
}

/// Minimal claim set used when peeking at a token without verifying it.
#[derive(Debug, Deserialize)]
struct UnverifiedClaims {
    jti: Option<String>,
    exp: Option<i64>,
}

// ============================================================================
// Codec
// ============================================================================

/// Mints and verifies HS256 tokens for one issuer.
///
/// The codec holds no secret material. Every operation takes the current
/// secret as a parameter so callers decide when to fetch it and rotation
/// needs no codec state.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    issuer: String,
    access_token_lifetime_secs: i64,
    refresh_token_lifetime_secs: i64,
}

impl TokenCodec {
    pub fn new(
        issuer: impl Into<String>,
        access_token_lifetime_secs: i64,
        refresh_token_lifetime_secs: i64,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            access_token_lifetime_secs,
            refresh_token_lifetime_secs,
        }
    }

    /// The issuer placed in and required of every token.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Access token lifetime in seconds, for the `expires_in` response field.
    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.access_token_lifetime_secs
    }

    /// Mints a signed access token for `user_id`.
    pub fn mint_access_token(
        &self,
        secret: &[u8],
        user_id: &str,
        email: Option<&str>,
        scope: &str,
    ) -> AuthResult<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = AccessTokenClaims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            scope: scope.to_string(),
            token_type: TokenType::Access,
            iat: now,
            exp: now + self.access_token_lifetime_secs,
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(secret, &claims)
    }

    /// Mints a signed refresh token for `user_id`.
    pub fn mint_refresh_token(&self, secret: &[u8], user_id: &str) -> AuthResult<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = RefreshTokenClaims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            token_type: TokenType::Refresh,
            iat: now,
            exp: now + self.refresh_token_lifetime_secs,
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(secret, &claims)
    }

    /// Verifies signature, expiry, and issuer, and requires the
    /// `access_token` discriminator.
    pub fn verify_access_token(&self, secret: &[u8], token: &str) -> AuthResult<AccessTokenClaims> {
        let claims: AccessTokenClaims = self.verify(secret, token)?;
        if claims.token_type != TokenType::Access {
            return Err(AuthError::invalid_token("not an access token"));
        }
        Ok(claims)
    }

    /// Verifies signature, expiry, and issuer, and requires the
    /// `refresh_token` discriminator.
    pub fn verify_refresh_token(
        &self,
        secret: &[u8],
        token: &str,
    ) -> AuthResult<RefreshTokenClaims> {
        let claims: RefreshTokenClaims = self.verify(secret, token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::invalid_token("not a refresh token"));
        }
        Ok(claims)
    }

    fn sign<T: Serialize>(&self, secret: &[u8], claims: &T) -> AuthResult<String> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| AuthError::internal(format!("failed to sign token: {e}")))
    }

    fn verify<T: serde::de::DeserializeOwned>(&self, secret: &[u8], token: &str) -> AuthResult<T> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_exp = true;
        validation.validate_aud = false;

        decode::<T>(token, &DecodingKey::from_secret(secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AuthError::invalid_token("token expired")
                }
                _ => AuthError::invalid_token("token verification failed"),
            })
    }
}

// ============================================================================
// Value Generation
// ============================================================================

/// Generates an authorization code: 32 random bytes, base64url without
/// padding (43 characters).
pub fn generate_authorization_code() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generates a client identifier (UUID v4).
pub fn generate_client_id() -> String {
    Uuid::new_v4().to_string()
}

/// Extracts the `jti` and `exp` claims without verifying the signature.
///
/// Used only by revocation, which tombstones whatever identifier the token
/// claims to have. Never use this result to grant access.
pub fn decode_jti_unverified(token: &str) -> Option<(String, OffsetDateTime)> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data = decode::<UnverifiedClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    let jti = data.claims.jti?;
    let exp = data.claims.exp?;
    let expires_at = OffsetDateTime::from_unix_timestamp(exp).ok()?;
    Some((jti, expires_at))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-signing-secret";

    fn codec() -> TokenCodec {
        TokenCodec::new("clipfeed-auth-server", 3600, 2_592_000)
    }

    #[test]
    fn test_access_token_round_trip() {
        let codec = codec();
        let token = codec
            .mint_access_token(SECRET, "user-1", Some("u@example.com"), "agent:access")
            .unwrap();
        let claims = codec.verify_access_token(SECRET, &token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email.as_deref(), Some("u@example.com"));
        assert_eq!(claims.scope, "agent:access");
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let codec = codec();
        let token = codec.mint_refresh_token(SECRET, "user-1").unwrap();
        let claims = codec.verify_refresh_token(SECRET, &token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.exp - claims.iat, 2_592_000);
    }

    #[test]
    fn test_cross_type_rejection() {
        let codec = codec();
        let access = codec
            .mint_access_token(SECRET, "user-1", None, "agent:access")
            .unwrap();
        let refresh = codec.mint_refresh_token(SECRET, "user-1").unwrap();

        assert!(codec.verify_access_token(SECRET, &refresh).is_err());
        assert!(codec.verify_refresh_token(SECRET, &access).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let codec = codec();
        let token = codec
            .mint_access_token(SECRET, "user-1", None, "agent:access")
            .unwrap();
        assert!(codec.verify_access_token(b"other-secret", &token).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let minting = TokenCodec::new("other-issuer", 3600, 2_592_000);
        let token = minting
            .mint_access_token(SECRET, "user-1", None, "agent:access")
            .unwrap();
        assert!(codec().verify_access_token(SECRET, &token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = TokenCodec::new("clipfeed-auth-server", -120, 2_592_000);
        let token = codec
            .mint_access_token(SECRET, "user-1", None, "agent:access")
            .unwrap();
        let err = codec.verify_access_token(SECRET, &token).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let codec = codec();
        let token = codec
            .mint_access_token(SECRET, "user-1", None, "agent:access")
            .unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            br#"{"iss":"clipfeed-auth-server","sub":"attacker","scope":"agent:access","token_type":"access_token","iat":0,"exp":99999999999,"jti":"x"}"#,
        );
        parts[1] = &forged_payload;
        let tampered = parts.join(".");
        assert!(codec.verify_access_token(SECRET, &tampered).is_err());
    }

    #[test]
    fn test_authorization_code_shape() {
        let code = generate_authorization_code();
        // 32 bytes -> 43 base64url chars, no padding.
        assert_eq!(code.len(), 43);
        assert!(!code.contains('='));
        assert!(!code.contains('+'));
        assert!(!code.contains('/'));

        let other = generate_authorization_code();
        assert_ne!(code, other);
    }

    #[test]
    fn test_client_id_is_uuid() {
        let id = generate_client_id();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_decode_jti_unverified() {
        let codec = codec();
        let token = codec
            .mint_access_token(SECRET, "user-1", None, "agent:access")
            .unwrap();
        let verified = codec.verify_access_token(SECRET, &token).unwrap();

        let (jti, expires_at) = decode_jti_unverified(&token).unwrap();
        assert_eq!(jti, verified.jti);
        assert_eq!(expires_at.unix_timestamp(), verified.exp);
    }

    #[test]
    fn test_decode_jti_unverified_garbage() {
        assert!(decode_jti_unverified("not-a-jwt").is_none());
    }
}
