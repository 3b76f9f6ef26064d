//! Registered OAuth client records.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Client metadata submitted at registration (RFC 7591 subset).
///
/// Only public clients are supported: there is no client secret and the
/// token endpoint auth method is always `none`. PKCE takes the place of
/// client authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMetadata {
    /// Redirect URIs the client may use. At least one is required, and every
    /// authorization request must match one of these exactly.
    pub redirect_uris: Vec<String>,

    /// Human-readable client name, shown on the sign-in page. Required.
    #[serde(default)]
    pub client_name: Option<String>,

    /// Space-separated scopes the client intends to request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// A dynamically registered client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredClient {
    /// Server-assigned client identifier (UUID v4).
    pub client_id: String,

    /// Exact-match redirect URI allowlist.
    pub redirect_uris: Vec<String>,

    /// Human-readable client name.
    pub client_name: String,

    /// Scopes granted at registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Grant types the client may use at the token endpoint.
    pub grant_types: Vec<String>,

    /// Response types the client may use at the authorization endpoint.
    pub response_types: Vec<String>,

    /// Always `none` for public clients.
    pub token_endpoint_auth_method: String,

    /// Registration timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl RegisteredClient {
    /// Whether `uri` exactly matches one of the registered redirect URIs.
    ///
    /// No prefix, wildcard, or normalization logic: the comparison is a
    /// byte-for-byte string match.
    pub fn is_valid_redirect_uri(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|registered| registered == uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_client() -> RegisteredClient {
        RegisteredClient {
            client_id: "9b2f4d0e-6b0a-4f3c-8f4e-1c2d3e4f5a6b".to_string(),
            redirect_uris: vec![
                "https://agent.example.com/callback".to_string(),
                "http://localhost:3000/callback".to_string(),
            ],
            client_name: "Example Agent".to_string(),
            scope: Some("agent:access".to_string()),
            grant_types: vec![
                "authorization_code".to_string(),
                "refresh_token".to_string(),
            ],
            response_types: vec!["code".to_string()],
            token_endpoint_auth_method: "none".to_string(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_redirect_uri_exact_match() {
        let client = sample_client();
        assert!(client.is_valid_redirect_uri("https://agent.example.com/callback"));
        assert!(client.is_valid_redirect_uri("http://localhost:3000/callback"));
    }

    #[test]
    fn test_redirect_uri_rejects_variants() {
        let client = sample_client();
        // Trailing slash, different path, different scheme, prefix match: all rejected.
        assert!(!client.is_valid_redirect_uri("https://agent.example.com/callback/"));
        assert!(!client.is_valid_redirect_uri("https://agent.example.com/other"));
        assert!(!client.is_valid_redirect_uri("http://agent.example.com/callback"));
        assert!(!client.is_valid_redirect_uri("https://agent.example.com/callback?x=1"));
    }

    #[test]
    fn test_client_serializes_registration_response_shape() {
        let client = sample_client();
        let value = serde_json::to_value(&client).unwrap();
        assert_eq!(value["client_name"], "Example Agent");
        assert_eq!(value["token_endpoint_auth_method"], "none");
        assert_eq!(
            value["grant_types"],
            serde_json::json!(["authorization_code", "refresh_token"])
        );
        assert_eq!(value["response_types"], serde_json::json!(["code"]));
    }
}
