//! Axum handlers for the OAuth endpoints.
//!
//! Each endpoint gets its own state struct so a server can mount exactly the
//! routes it needs; all of them wrap the shared [`AuthorizationService`].
//!
//! [`AuthorizationService`]: crate::oauth::service::AuthorizationService

mod authorize;
mod discovery;
mod pages;
mod register;
mod revoke;
mod token;

pub use authorize::{AuthorizeCallbackRequest, AuthorizeState, authorize_callback, authorize_get};
pub use discovery::{MetadataState, oauth_metadata_handler, openid_configuration_handler};
pub use register::{RegisterState, register_handler};
pub use revoke::{RevocationRequest, RevokeState, revoke_handler};
pub use token::{TokenState, token_handler};
