//! Authorization endpoint request types.

use serde::Deserialize;
use url::Url;

use crate::oauth::pkce::{PkceChallenge, PkceChallengeMethod};
use crate::types::RegisteredClient;
use crate::{AuthError, AuthResult};

/// Raw query parameters of a `GET /authorize` request.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationRequest {
    pub response_type: String,
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub code_challenge: Option<String>,
    #[serde(default)]
    pub code_challenge_method: Option<String>,
}

/// An authorization request that passed validation against its client.
///
/// Holding one of these means: the client exists, the redirect URI is on the
/// client's allowlist, the response type is `code`, and a well-formed S256
/// challenge is present. Only a validated request may proceed to the sign-in
/// page and to code issuance.
#[derive(Debug, Clone)]
pub struct ValidatedAuthorization {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub state: Option<String>,
    pub code_challenge: PkceChallenge,
    pub code_challenge_method: PkceChallengeMethod,
}

impl AuthorizationRequest {
    /// Validates this request against the registered client.
    ///
    /// Parameter errors are reported in a fixed order (redirect URI first),
    /// so a failure never reveals more than the caller already proved it
    /// knows. The redirect URI check comes before everything else: errors
    /// after it may be delivered via redirect, errors on it never are.
    pub fn validate(
        &self,
        client: &RegisteredClient,
        default_scope: &str,
    ) -> AuthResult<ValidatedAuthorization> {
        if !client.is_valid_redirect_uri(&self.redirect_uri) {
            return Err(AuthError::unauthorized_client(
                "redirect_uri is not registered for this client",
            ));
        }

        if self.response_type != "code" {
            return Err(AuthError::unsupported_response_type(&self.response_type));
        }

        let challenge = self
            .code_challenge
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("code_challenge is required"))?;
        let method = self
            .code_challenge_method
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("code_challenge_method is required"))?;

        let code_challenge_method = PkceChallengeMethod::parse(method)?;
        let code_challenge = PkceChallenge::new(challenge)?;

        let scope = self
            .scope
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_scope.to_string());

        Ok(ValidatedAuthorization {
            client_id: client.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scope,
            state: self.state.clone(),
            code_challenge,
            code_challenge_method,
        })
    }
}

impl ValidatedAuthorization {
    /// Builds the success redirect URL: `redirect_uri?code=...&state=...`.
    pub fn success_redirect(&self, code: &str) -> AuthResult<String> {
        let mut url = Url::parse(&self.redirect_uri)
            .map_err(|_| AuthError::invalid_request("redirect_uri is not a valid URL"))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("code", code);
            if let Some(state) = &self.state {
                pairs.append_pair("state", state);
            }
        }
        Ok(url.into())
    }
}

/// Builds an error redirect URL per RFC 6749 §4.1.2.1.
///
/// Only called once the redirect URI has been validated against the client;
/// unvalidated URIs get an error page instead, never a redirect.
pub fn error_redirect(
    redirect_uri: &str,
    error_code: &str,
    description: &str,
    state: Option<&str>,
) -> AuthResult<String> {
    let mut url = Url::parse(redirect_uri)
        .map_err(|_| AuthError::invalid_request("redirect_uri is not a valid URL"))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("error", error_code);
        pairs.append_pair("error_description", description);
        if let Some(state) = state {
            pairs.append_pair("state", state);
        }
    }
    Ok(url.into())
}
