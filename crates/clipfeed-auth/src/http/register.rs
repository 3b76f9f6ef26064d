//! Dynamic client registration endpoint (RFC 7591 subset).

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::AuthError;
use crate::oauth::service::AuthorizationService;
use crate::types::ClientMetadata;

/// State for the registration endpoint.
#[derive(Clone)]
pub struct RegisterState {
    pub service: Arc<AuthorizationService>,
}

impl RegisterState {
    pub fn new(service: Arc<AuthorizationService>) -> Self {
        Self { service }
    }
}

/// Handler for `POST /register`.
///
/// Accepts client metadata as JSON and answers `201 Created` with the full
/// client record, including the server-assigned `client_id`. Registration is
/// open: no initial access token is required.
pub async fn register_handler(
    State(state): State<RegisterState>,
    Json(metadata): Json<ClientMetadata>,
) -> Result<impl IntoResponse, AuthError> {
    let client = state.service.register_client(metadata).await?;
    Ok((StatusCode::CREATED, Json(client)))
}
