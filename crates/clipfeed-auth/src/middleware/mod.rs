//! Request authentication for protected API endpoints.

mod auth;
mod error;
mod types;

pub use auth::{
    AccessTokenVerifier, AuthState, BearerAuth, IdentityTokenVerifier, RequestAuthenticator,
    TokenVerifier,
};
pub use types::AuthContext;
