//! Server metadata endpoints (RFC 8414).

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::{Value, json};

use crate::config::{AuthConfig, OAuthConfig};

/// State for the metadata endpoints.
#[derive(Clone)]
pub struct MetadataState {
    pub config: AuthConfig,
}

impl MetadataState {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    fn document(&self) -> Value {
        let base = self.config.base_url.trim_end_matches('/');
        json!({
            "issuer": self.config.issuer,
            "authorization_endpoint": format!("{base}/authorize"),
            "token_endpoint": format!("{base}/token"),
            "registration_endpoint": format!("{base}/register"),
            "revocation_endpoint": format!("{base}/revoke"),
            "response_types_supported": OAuthConfig::RESPONSE_TYPES,
            "grant_types_supported": OAuthConfig::GRANT_TYPES,
            "token_endpoint_auth_methods_supported": OAuthConfig::TOKEN_ENDPOINT_AUTH_METHODS,
            "code_challenge_methods_supported": OAuthConfig::CODE_CHALLENGE_METHODS,
            "scopes_supported": self.config.oauth.scopes,
        })
    }
}

/// Handler for `GET /.well-known/oauth-authorization-server`.
pub async fn oauth_metadata_handler(State(state): State<MetadataState>) -> impl IntoResponse {
    Json(state.document())
}

/// Handler for `GET /.well-known/openid-configuration`.
///
/// Served for clients that only know how to discover OIDC issuers; the
/// document is the same authorization-server metadata.
pub async fn openid_configuration_handler(State(state): State<MetadataState>) -> impl IntoResponse {
    Json(state.document())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_document() {
        let mut config = AuthConfig::default();
        config.base_url = "https://clipfeed.app/oauth/".to_string();
        let doc = MetadataState::new(config).document();

        assert_eq!(doc["issuer"], "clipfeed-auth-server");
        assert_eq!(
            doc["authorization_endpoint"],
            "https://clipfeed.app/oauth/authorize"
        );
        assert_eq!(doc["token_endpoint"], "https://clipfeed.app/oauth/token");
        assert_eq!(doc["code_challenge_methods_supported"], json!(["S256"]));
        assert_eq!(doc["token_endpoint_auth_methods_supported"], json!(["none"]));
        assert_eq!(doc["grant_types_supported"], json!(["authorization_code", "refresh_token"]));
    }
}
