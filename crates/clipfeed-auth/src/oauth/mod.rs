//! OAuth 2.1 protocol types and the grant-handling service.

pub mod authorize;
pub mod pkce;
pub mod service;
pub mod token;

pub use authorize::{AuthorizationRequest, ValidatedAuthorization};
pub use pkce::{PkceChallenge, PkceChallengeMethod, PkceVerifier};
pub use service::AuthorizationService;
pub use token::{TokenRequest, TokenResponse};
