//! Clipfeed authorization server binary.
//!
//! Wires configuration, storage, the identity verifier, and the HTTP routes
//! together and runs the server until SIGINT/SIGTERM.

mod cleanup;
mod config;
mod identity;
mod observability;
mod routes;

use std::env;
use std::sync::Arc;

use clipfeed_auth::oauth::service::AuthorizationService;
use clipfeed_auth::storage::{
    AuthorizationCodeStorage, ClientStorage, MemoryAuthStorage, RevokedTokenStorage,
};
use clipfeed_auth::token::secret::EnvSecretProvider;
use clipfeed_auth_postgres::PostgresAuthStorage;

use crate::config::{SIGNING_SECRET_ENV, ServerConfig, load_config};
use crate::identity::JwksIdentityVerifier;

#[tokio::main]
async fn main() {
    // .env is optional; only complain about real failures.
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: failed to load .env file: {e}");
        }
    }

    observability::init_tracing();

    let config_path = env::var("CLIPFEED_CONFIG").unwrap_or_else(|_| "clipfeed.toml".to_string());
    let cfg = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    if !observability::apply_logging_level(&cfg.logging.level) {
        tracing::debug!("RUST_LOG is set, keeping it over the configured log level");
    }
    tracing::info!(path = %config_path, "configuration loaded");

    if env::var(SIGNING_SECRET_ENV).map(|v| v.is_empty()).unwrap_or(true) {
        eprintln!("{SIGNING_SECRET_ENV} must be set to a non-empty signing secret");
        std::process::exit(2);
    }

    if let Err(e) = run(cfg).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}

async fn run(cfg: ServerConfig) -> anyhow::Result<()> {
    let secrets = Arc::new(EnvSecretProvider::new(SIGNING_SECRET_ENV));

    let (clients, codes, revoked): (
        Arc<dyn ClientStorage>,
        Arc<dyn AuthorizationCodeStorage>,
        Arc<dyn RevokedTokenStorage>,
    ) = if cfg.database.url.is_empty() {
        tracing::warn!("no database.url configured, using in-memory storage");
        let memory = Arc::new(MemoryAuthStorage::new());
        (memory.clone(), memory.clone(), memory)
    } else {
        let pool =
            clipfeed_auth_postgres::connect(&cfg.database.url, cfg.database.max_connections)
                .await?;
        clipfeed_auth_postgres::run_migrations(&pool).await?;
        tracing::info!("connected to PostgreSQL");
        let storage = PostgresAuthStorage::new(pool);
        (
            Arc::new(storage.clients()),
            Arc::new(storage.codes()),
            Arc::new(storage.revoked_tokens()),
        )
    };

    let service = Arc::new(AuthorizationService::new(
        cfg.auth.clone(),
        secrets,
        clients,
        codes,
        revoked,
    ));
    let identity = Arc::new(JwksIdentityVerifier::new(cfg.identity.clone()));

    let cleanup_task = cleanup::spawn_cleanup_task(Arc::clone(&service), cfg.server.cleanup_interval);

    let app = routes::build_router(service, identity);
    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, issuer = %cfg.auth.issuer, "authorization server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup_task.abort();
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut signal) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            signal.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
