//! PKCE (Proof Key for Code Exchange), RFC 7636.
//!
//! Only the S256 method is supported. OAuth 2.1 deprecates "plain" and this
//! server rejects it outright, at the authorization endpoint and again at
//! code redemption.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use crate::{AuthError, AuthResult};

/// PKCE challenge method. S256 is the only variant; "plain" never parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PkceChallengeMethod {
    #[default]
    S256,
}

impl PkceChallengeMethod {
    /// Parses a `code_challenge_method` parameter.
    ///
    /// # Errors
    ///
    /// Returns `unauthorized_client` for anything other than `"S256"`, with
    /// a pointed message for `"plain"`.
    pub fn parse(method: &str) -> AuthResult<Self> {
        match method {
            "S256" => Ok(Self::S256),
            "plain" => Err(AuthError::unauthorized_client(
                "code_challenge_method \"plain\" is not supported, use S256",
            )),
            other => Err(AuthError::unauthorized_client(format!(
                "unsupported code_challenge_method: {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S256 => "S256",
        }
    }
}

impl std::fmt::Display for PkceChallengeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validated PKCE code verifier.
///
/// RFC 7636 §4.1: 43-128 characters from the unreserved set
/// `[A-Za-z0-9-._~]`.
#[derive(Debug, Clone)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Validates a `code_verifier` parameter from a token request.
    pub fn new(verifier: impl Into<String>) -> AuthResult<Self> {
        let verifier = verifier.into();
        let len = verifier.len();
        if !(43..=128).contains(&len) {
            return Err(AuthError::invalid_request(format!(
                "code_verifier must be 43-128 characters, got {len}"
            )));
        }
        if !verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
        {
            return Err(AuthError::invalid_request(
                "code_verifier contains characters outside [A-Za-z0-9-._~]",
            ));
        }
        Ok(Self(verifier))
    }

    /// Generates a random verifier (32 bytes, base64url). Used by tests and
    /// example clients; the server itself only ever receives verifiers.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// PKCE code challenge: `BASE64URL(SHA256(ASCII(code_verifier)))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Accepts a `code_challenge` parameter, checking it is well-formed
    /// base64url of a SHA-256 digest (43 characters).
    pub fn new(challenge: impl Into<String>) -> AuthResult<Self> {
        let challenge = challenge.into();
        match URL_SAFE_NO_PAD.decode(&challenge) {
            Ok(decoded) if decoded.len() == 32 => Ok(Self(challenge)),
            _ => Err(AuthError::invalid_request(
                "code_challenge must be base64url-encoded SHA-256 output",
            )),
        }
    }

    /// Derives the S256 challenge for a verifier.
    pub fn from_verifier(verifier: &PkceVerifier) -> Self {
        let digest = Sha256::digest(verifier.as_str().as_bytes());
        Self(URL_SAFE_NO_PAD.encode(digest))
    }

    /// Checks the verifier against this challenge.
    ///
    /// # Errors
    ///
    /// Returns `invalid_grant` on mismatch.
    pub fn verify(&self, verifier: &PkceVerifier) -> AuthResult<()> {
        if Self::from_verifier(verifier).0 == self.0 {
            Ok(())
        } else {
            Err(AuthError::invalid_grant(
                "code_verifier does not match code_challenge",
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!(
            PkceChallengeMethod::parse("S256").unwrap(),
            PkceChallengeMethod::S256
        );
        assert!(PkceChallengeMethod::parse("unknown").is_err());
    }

    #[test]
    fn test_plain_method_rejected() {
        let err = PkceChallengeMethod::parse("plain").unwrap_err();
        assert_eq!(err.oauth_error_code(), "unauthorized_client");
        assert!(err.to_string().contains("plain"));
    }

    #[test]
    fn test_verifier_length_bounds() {
        assert!(PkceVerifier::new("a".repeat(42)).is_err());
        assert!(PkceVerifier::new("a".repeat(43)).is_ok());
        assert!(PkceVerifier::new("a".repeat(128)).is_ok());
        assert!(PkceVerifier::new("a".repeat(129)).is_err());
    }

    #[test]
    fn test_verifier_character_set() {
        let valid = "abcDEF012-._~".chars().cycle().take(64).collect::<String>();
        assert!(PkceVerifier::new(valid).is_ok());
        assert!(PkceVerifier::new("!".repeat(64)).is_err());
    }

    #[test]
    fn test_generated_verifier_is_valid() {
        let verifier = PkceVerifier::generate();
        assert!(PkceVerifier::new(verifier.as_str()).is_ok());
        assert_ne!(verifier.as_str(), PkceVerifier::generate().as_str());
    }

    #[test]
    fn test_challenge_shape_enforced() {
        // Well-formed 43-char base64url of 32 bytes.
        assert!(PkceChallenge::new("E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM").is_ok());
        // Valid base64url but not a SHA-256 digest.
        assert!(PkceChallenge::new("c2hvcnQ").is_err());
        assert!(PkceChallenge::new("not base64url!!!").is_err());
    }

    #[test]
    fn test_verify_round_trip() {
        let verifier = PkceVerifier::generate();
        let challenge = PkceChallenge::from_verifier(&verifier);
        assert!(challenge.verify(&verifier).is_ok());
    }

    #[test]
    fn test_verify_mismatch_is_invalid_grant() {
        let challenge = PkceChallenge::from_verifier(&PkceVerifier::generate());
        let err = challenge.verify(&PkceVerifier::generate()).unwrap_err();
        assert_eq!(err.oauth_error_code(), "invalid_grant");
    }

    #[test]
    fn test_rfc7636_appendix_b_vector() {
        let verifier = PkceVerifier::new("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk").unwrap();
        let challenge = PkceChallenge::from_verifier(&verifier);
        assert_eq!(
            challenge.as_str(),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }
}
