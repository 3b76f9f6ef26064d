//! HTTP route table.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use clipfeed_auth::http::{
    AuthorizeState, MetadataState, RegisterState, RevokeState, TokenState, authorize_callback,
    authorize_get, oauth_metadata_handler, openid_configuration_handler, register_handler,
    revoke_handler, token_handler,
};
use clipfeed_auth::oauth::service::AuthorizationService;
use clipfeed_auth::IdentityVerifier;

/// Builds the full router: OAuth endpoints, metadata, and health check.
pub fn build_router(
    service: Arc<AuthorizationService>,
    identity: Arc<dyn IdentityVerifier>,
) -> Router {
    let metadata = MetadataState::new(service.config().clone());

    Router::new()
        .route(
            "/register",
            post(register_handler).with_state(RegisterState::new(Arc::clone(&service))),
        )
        .route(
            "/authorize",
            get(authorize_get).with_state(AuthorizeState::new(
                Arc::clone(&service),
                Arc::clone(&identity),
            )),
        )
        .route(
            "/authorize/callback",
            post(authorize_callback).with_state(AuthorizeState::new(
                Arc::clone(&service),
                Arc::clone(&identity),
            )),
        )
        .route(
            "/token",
            post(token_handler).with_state(TokenState::new(Arc::clone(&service))),
        )
        .route(
            "/revoke",
            post(revoke_handler).with_state(RevokeState::new(Arc::clone(&service))),
        )
        .route(
            "/.well-known/oauth-authorization-server",
            get(oauth_metadata_handler).with_state(metadata.clone()),
        )
        .route(
            "/.well-known/openid-configuration",
            get(openid_configuration_handler).with_state(metadata),
        )
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        // Agent clients run the flow from browser contexts on other origins.
        .layer(CorsLayer::permissive())
}

async fn healthz() -> &'static str {
    "ok"
}
