//! Signing secret acquisition.
//!
//! The HS256 signing secret is never baked into configuration or code.
//! Callers that mint or verify tokens fetch the current secret through a
//! [`SecretProvider`] on each use, so rotating the secret at the source
//! takes effect without a restart.

use async_trait::async_trait;

use crate::{AuthError, AuthResult};

/// Source of the current HS256 signing secret.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Returns the secret bytes used to sign and verify tokens.
    ///
    /// Implementations must return an error rather than an empty secret:
    /// an empty key would make every signature trivially forgeable.
    async fn current_signing_secret(&self) -> AuthResult<Vec<u8>>;
}

/// Fixed in-memory secret, for tests and single-node deployments where the
/// secret is injected at construction time.
pub struct StaticSecretProvider {
    secret: Vec<u8>,
}

impl StaticSecretProvider {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    async fn current_signing_secret(&self) -> AuthResult<Vec<u8>> {
        if self.secret.is_empty() {
            return Err(AuthError::configuration("signing secret is empty"));
        }
        Ok(self.secret.clone())
    }
}

/// Reads the secret from an environment variable on every call, so a
/// process-level secret refresh is picked up without restarting.
pub struct EnvSecretProvider {
    var_name: String,
}

impl EnvSecretProvider {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn current_signing_secret(&self) -> AuthResult<Vec<u8>> {
        let value = std::env::var(&self.var_name).map_err(|_| {
            AuthError::configuration(format!(
                "signing secret environment variable {} is not set",
                self.var_name
            ))
        })?;
        if value.is_empty() {
            return Err(AuthError::configuration(format!(
                "signing secret environment variable {} is empty",
                self.var_name
            )));
        }
        Ok(value.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_returns_secret() {
        let provider = StaticSecretProvider::new(b"test-secret".to_vec());
        let secret = provider.current_signing_secret().await.unwrap();
        assert_eq!(secret, b"test-secret");
    }

    #[tokio::test]
    async fn test_static_provider_rejects_empty_secret() {
        let provider = StaticSecretProvider::new(Vec::new());
        let err = provider.current_signing_secret().await.unwrap_err();
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn test_env_provider_missing_variable() {
        let provider = EnvSecretProvider::new("CLIPFEED_TEST_SECRET_DOES_NOT_EXIST");
        assert!(provider.current_signing_secret().await.is_err());
    }
}
