//! Token minting, verification, and random value generation.

pub mod codec;
pub mod secret;

pub use codec::{
    AccessTokenClaims, RefreshTokenClaims, TokenCodec, TokenType, decode_jti_unverified,
    generate_authorization_code, generate_client_id,
};
pub use secret::{EnvSecretProvider, SecretProvider, StaticSecretProvider};
