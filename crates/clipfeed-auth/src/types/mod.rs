//! Core data types for the authorization server.

mod client;
mod code;

pub use client::{ClientMetadata, RegisteredClient};
pub use code::AuthorizationCode;
