//! # clipfeed-auth
//!
//! OAuth 2.1 authorization server for the Clipfeed agent API.
//!
//! Clipfeed's feed, video, and profile endpoints are normally called by the
//! first-party mobile and web clients with a platform identity token. This
//! crate lets third-party agent clients obtain short-lived, scoped access to
//! the same API surface without ever handling the user's primary credentials:
//! the client registers, walks the user through a browser-based authorization
//! step, and exchanges the resulting one-time code for signed tokens.
//!
//! This crate provides:
//! - Dynamic client registration (RFC 7591 subset, public clients only)
//! - The authorization code grant with mandatory PKCE (S256 only)
//! - Access/refresh token issuance and verification (HS256 JWTs)
//! - Token revocation (RFC 7009 semantics) with a jti tombstone set
//! - A dual-mode request authenticator that accepts either a token minted
//!   here or a platform identity token
//!
//! ## Modules
//!
//! - [`config`] - Authorization server configuration
//! - [`token`] - Token codec: signing, verification, code generation
//! - [`oauth`] - Protocol types and the grant-handling service
//! - [`identity`] - Platform identity provider contract
//! - [`storage`] - Storage traits for clients, codes, and revocations
//! - [`middleware`] - Request authentication for protected endpoints
//! - [`http`] - Axum handlers for the OAuth endpoints
//!
//! ## Dependency injection
//!
//! Nothing in this crate reaches for global state. Storage backends, the
//! signing-secret provider, and the identity-token verifier are constructed
//! once at process startup and passed in explicitly.

pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod middleware;
pub mod oauth;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuthConfig, OAuthConfig};
pub use error::AuthError;
pub use http::{
    AuthorizeState, MetadataState, RegisterState, RevokeState, TokenState, authorize_callback,
    authorize_get, oauth_metadata_handler, openid_configuration_handler, register_handler,
    revoke_handler, token_handler,
};
pub use identity::{IdentityClaims, IdentityVerifier};
pub use middleware::{
    AccessTokenVerifier, AuthContext, AuthState, BearerAuth, IdentityTokenVerifier,
    RequestAuthenticator, TokenVerifier,
};
pub use oauth::service::AuthorizationService;
pub use storage::{
    AuthorizationCodeStorage, ClientStorage, MemoryAuthStorage, RevokedTokenStorage,
};
pub use token::codec::{AccessTokenClaims, RefreshTokenClaims, TokenCodec, TokenType};
pub use token::secret::{EnvSecretProvider, SecretProvider, StaticSecretProvider};
pub use types::{AuthorizationCode, ClientMetadata, RegisteredClient};

/// Type alias for authorization results.
pub type AuthResult<T> = Result<T, AuthError>;
