//! Token revocation endpoint (RFC 7009 semantics).

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::oauth::service::AuthorizationService;

/// State for the revocation endpoint.
#[derive(Clone)]
pub struct RevokeState {
    pub service: Arc<AuthorizationService>,
}

impl RevokeState {
    pub fn new(service: Arc<AuthorizationService>) -> Self {
        Self { service }
    }
}

/// Body of a `POST /revoke` request.
#[derive(Debug, Deserialize)]
pub struct RevocationRequest {
    pub token: String,
}

/// Handler for `POST /revoke`.
///
/// Always answers `200 {}`, per RFC 7009: revocation must not leak whether
/// the presented token was valid, already revoked, or garbage. Storage
/// failures are logged and swallowed for the same reason.
pub async fn revoke_handler(
    State(state): State<RevokeState>,
    Json(request): Json<RevocationRequest>,
) -> impl IntoResponse {
    if let Err(e) = state.service.revoke(&request.token).await {
        warn!(error = %e, "revocation failed, answering 200 regardless");
    }
    Json(json!({}))
}
