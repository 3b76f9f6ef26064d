//! Server configuration loading.
//!
//! Configuration comes from `clipfeed.toml` (path overridable via
//! `CLIPFEED_CONFIG`), with `CLIPFEED__`-prefixed environment variables
//! layered on top, e.g. `CLIPFEED__SERVER__PORT=9090`. The signing secret is
//! deliberately not part of this file; it is read from
//! `CLIPFEED_SIGNING_SECRET` at runtime.

use clipfeed_auth::AuthConfig;
use serde::Deserialize;
use std::time::Duration;

/// Environment variable holding the HS256 signing secret.
pub const SIGNING_SECRET_ENV: &str = "CLIPFEED_SIGNING_SECRET";

/// Root server configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Interval between sweeps of expired codes and stale revocation
    /// tombstones.
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cleanup_interval: Duration::from_secs(300),
        }
    }
}

/// PostgreSQL configuration. When `url` is empty the server runs on the
/// in-memory backend, which is only suitable for development.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
        }
    }
}

/// Identity platform verification settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// JWKS endpoint publishing the identity platform's signing keys.
    pub jwks_uri: String,
    /// Required `iss` claim of identity tokens.
    pub issuer: String,
    /// Required `aud` claim of identity tokens.
    pub audience: String,
    /// How long fetched keys are cached.
    #[serde(with = "humantime_serde")]
    pub jwks_cache_ttl: Duration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            jwks_uri: "https://identity.clipfeed.app/.well-known/jwks.json".to_string(),
            issuer: "https://identity.clipfeed.app".to_string(),
            audience: "clipfeed".to_string(),
            jwks_cache_ttl: Duration::from_secs(3600),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Loads configuration from the given TOML file (if it exists) and the
/// environment.
pub fn load_config(path: &str) -> anyhow::Result<ServerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("CLIPFEED")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    Ok(settings.try_deserialize()?)
}
