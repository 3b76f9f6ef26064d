//! Storage traits for clients, authorization codes, and revoked tokens.
//!
//! The service depends only on these traits. The in-memory backend here
//! serves tests and single-node setups; the Postgres backend lives in the
//! `clipfeed-auth-postgres` crate.

mod client;
mod code;
mod memory;
mod revoked_token;

pub use client::ClientStorage;
pub use code::AuthorizationCodeStorage;
pub use memory::MemoryAuthStorage;
pub use revoked_token::RevokedTokenStorage;
