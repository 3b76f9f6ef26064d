//! Authorization server configuration.
//!
//! Configuration is deserialized from the server's TOML file (with
//! environment overrides applied by the binary) and injected into the
//! [`AuthorizationService`](crate::oauth::service::AuthorizationService)
//! at startup. The signing secret itself is never part of this struct;
//! it is supplied through a [`SecretProvider`](crate::token::secret::SecretProvider).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root authorization server configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "clipfeed-auth-server"
/// base_url = "https://clipfeed.app/oauth"
///
/// [auth.oauth]
/// access_token_lifetime = "1h"
/// refresh_token_lifetime = "30d"
/// authorization_code_lifetime = "10m"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Issuer string placed in the `iss` claim of every minted token and
    /// required on every verified token.
    pub issuer: String,

    /// Public base URL of this authorization server, used to construct
    /// metadata endpoint URLs and the browser sign-in page.
    pub base_url: String,

    /// OAuth 2.1 flow configuration.
    pub oauth: OAuthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "clipfeed-auth-server".to_string(),
            base_url: "http://localhost:8080".to_string(),
            oauth: OAuthConfig::default(),
        }
    }
}

/// OAuth 2.1 configuration: token lifetimes and the supported scope set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime. Codes are single-use and short-lived.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Supported scopes, advertised in server metadata.
    pub scopes: Vec<String>,

    /// Scope granted when an authorization request does not name one.
    pub default_scope: String,
}

impl OAuthConfig {
    /// Supported grant types. Fixed: this server issues codes and refreshes
    /// tokens, nothing else.
    pub const GRANT_TYPES: [&'static str; 2] = ["authorization_code", "refresh_token"];

    /// Supported response types. Fixed: authorization code flow only.
    pub const RESPONSE_TYPES: [&'static str; 1] = ["code"];

    /// Supported token endpoint auth methods. Public clients only; PKCE
    /// stands in for a client secret.
    pub const TOKEN_ENDPOINT_AUTH_METHODS: [&'static str; 1] = ["none"];

    /// Supported PKCE challenge methods.
    pub const CODE_CHALLENGE_METHODS: [&'static str; 1] = ["S256"];
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(600), // 10 minutes
            access_token_lifetime: Duration::from_secs(3600),      // 1 hour
            refresh_token_lifetime: Duration::from_secs(30 * 24 * 3600), // 30 days
            scopes: vec!["agent:access".to_string()],
            default_scope: "agent:access".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetimes() {
        let config = OAuthConfig::default();
        assert_eq!(config.authorization_code_lifetime.as_secs(), 600);
        assert_eq!(config.access_token_lifetime.as_secs(), 3600);
        assert_eq!(config.refresh_token_lifetime.as_secs(), 2_592_000);
    }

    #[test]
    fn test_deserialize_humantime_lifetimes() {
        let toml = r#"
            issuer = "test-issuer"
            base_url = "https://auth.example.com"

            [oauth]
            access_token_lifetime = "15m"
            refresh_token_lifetime = "7d"
            authorization_code_lifetime = "5m"
        "#;

        let config: AuthConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.issuer, "test-issuer");
        assert_eq!(config.oauth.access_token_lifetime.as_secs(), 900);
        assert_eq!(config.oauth.refresh_token_lifetime.as_secs(), 7 * 86400);
        assert_eq!(config.oauth.authorization_code_lifetime.as_secs(), 300);
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: AuthConfig = toml::from_str("").unwrap();
        assert_eq!(config.issuer, "clipfeed-auth-server");
        assert_eq!(config.oauth.default_scope, "agent:access");
        assert_eq!(config.oauth.scopes, vec!["agent:access".to_string()]);
    }
}
