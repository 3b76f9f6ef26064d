//! Token endpoint request and response types.

use serde::{Deserialize, Serialize};

/// Form body of a `POST /token` request, covering both grants.
///
/// OAuth token requests arrive as `application/x-www-form-urlencoded`, so
/// every field beyond `grant_type` is optional here and checked per-grant by
/// the service.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub code_verifier: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Successful token endpoint response (RFC 6749 §5.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub scope: String,
    /// Present on code exchange; the refresh grant does not rotate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    pub fn new(
        access_token: String,
        expires_in: i64,
        scope: String,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            scope,
            refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_decoding_code_grant() {
        let body = "grant_type=authorization_code&code=abc&redirect_uri=https%3A%2F%2Fa.example%2Fcb&code_verifier=ver&client_id=c1";
        let req: TokenRequest = serde_urlencoded::from_str(body).unwrap();
        assert_eq!(req.grant_type, "authorization_code");
        assert_eq!(req.code.as_deref(), Some("abc"));
        assert_eq!(req.redirect_uri.as_deref(), Some("https://a.example/cb"));
        assert!(req.refresh_token.is_none());
    }

    #[test]
    fn test_form_decoding_refresh_grant() {
        let body = "grant_type=refresh_token&refresh_token=rt";
        let req: TokenRequest = serde_urlencoded::from_str(body).unwrap();
        assert_eq!(req.grant_type, "refresh_token");
        assert_eq!(req.refresh_token.as_deref(), Some("rt"));
        assert!(req.code.is_none());
    }

    #[test]
    fn test_response_omits_absent_refresh_token() {
        let response = TokenResponse::new("at".to_string(), 3600, "agent:access".to_string(), None);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_in"], 3600);
        assert!(json.get("refresh_token").is_none());
    }
}
