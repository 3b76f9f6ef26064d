//! Token endpoint handler.
//!
//! ```text
//! POST /token
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=authorization_code
//! &code=4Wxy...
//! &redirect_uri=https://agent.example.com/callback
//! &code_verifier=dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk
//! &client_id=9b2f4d0e-...
//! ```

use std::sync::Arc;

use axum::{Form, Json, extract::State, http::header, response::IntoResponse};

use crate::AuthError;
use crate::oauth::service::AuthorizationService;
use crate::oauth::token::TokenRequest;

/// State for the token endpoint.
#[derive(Clone)]
pub struct TokenState {
    pub service: Arc<AuthorizationService>,
}

impl TokenState {
    pub fn new(service: Arc<AuthorizationService>) -> Self {
        Self { service }
    }
}

/// Handler for `POST /token`.
///
/// Dispatches to the `authorization_code` or `refresh_token` grant. Token
/// responses must not be cached (RFC 6749 §5.1), hence the explicit
/// `Cache-Control` and `Pragma` headers.
pub async fn token_handler(
    State(state): State<TokenState>,
    Form(request): Form<TokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = state.service.handle_token_request(request).await?;
    Ok((
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(response),
    ))
}
