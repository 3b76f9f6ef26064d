//! Authorization endpoint handlers.
//!
//! `GET /authorize` validates the request and renders the sign-in page.
//! The page authenticates the user against the identity platform in the
//! browser, then posts the identity token plus the original parameters to
//! `POST /authorize/callback`, which issues the code and hands back the
//! redirect URL for the page script to follow.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AuthError;
use crate::identity::IdentityVerifier;
use crate::oauth::authorize::{AuthorizationRequest, error_redirect};
use crate::oauth::service::AuthorizationService;

use super::pages::{render_error_page, render_sign_in_page};

/// State for the authorization endpoints.
#[derive(Clone)]
pub struct AuthorizeState {
    pub service: Arc<AuthorizationService>,
    pub identity: Arc<dyn IdentityVerifier>,
}

impl AuthorizeState {
    pub fn new(service: Arc<AuthorizationService>, identity: Arc<dyn IdentityVerifier>) -> Self {
        Self { service, identity }
    }
}

/// Handler for `GET /authorize`.
///
/// On success renders the sign-in page. Validation failures fall into two
/// classes: if the client or redirect URI cannot be trusted, the error is
/// shown on an error page and never delivered to the redirect URI; once the
/// redirect URI has been validated, remaining parameter errors are delivered
/// to it per RFC 6749 §4.1.2.1.
pub async fn authorize_get(
    State(state): State<AuthorizeState>,
    Query(request): Query<AuthorizationRequest>,
) -> Response {
    let error = match state.service.validate_authorize_request(&request).await {
        Ok((client, validated)) => {
            return Html(render_sign_in_page(&client.client_name, &validated)).into_response();
        }
        Err(e) => {
            debug!(client_id = %request.client_id, error = %e, "authorization request rejected");
            e
        }
    };
    render_authorize_error(&state, &request, error).await
}

async fn render_authorize_error(
    state: &AuthorizeState,
    request: &AuthorizationRequest,
    error: AuthError,
) -> Response {
    let redirectable = matches!(
        error,
        AuthError::UnsupportedResponseType { .. }
            | AuthError::InvalidRequest { .. }
            | AuthError::UnauthorizedClient { .. }
    );

    // Redirect only when the redirect URI itself checked out against the
    // registered client. Unknown clients and unregistered URIs always get
    // the error page.
    if redirectable {
        let registered = state
            .service
            .validate_redirect_target(&request.client_id, &request.redirect_uri)
            .await;
        if registered {
            if let Ok(url) = error_redirect(
                &request.redirect_uri,
                error.oauth_error_code(),
                &error.to_string(),
                request.state.as_deref(),
            ) {
                return axum::response::Redirect::to(&url).into_response();
            }
        }
    }

    (
        StatusCode::BAD_REQUEST,
        Html(render_error_page(error.oauth_error_code(), &error.to_string())),
    )
        .into_response()
}

/// Body of a `POST /authorize/callback` request: the identity token obtained
/// in the browser plus the original authorization parameters.
#[derive(Debug, Deserialize)]
pub struct AuthorizeCallbackRequest {
    pub identity_token: String,
    #[serde(flatten)]
    pub authorization: AuthorizationRequest,
}

#[derive(Debug, Serialize)]
struct AuthorizeCallbackResponse {
    redirect_url: String,
}

/// Handler for `POST /authorize/callback`.
///
/// Verifies the identity token, re-validates the authorization parameters
/// (the page could have tampered with them), issues the code, and answers
/// with the redirect URL as JSON for the page script to follow.
pub async fn authorize_callback(
    State(state): State<AuthorizeState>,
    Json(request): Json<AuthorizeCallbackRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let identity = state
        .identity
        .verify_identity_token(&request.identity_token)
        .await?;

    let (_, validated) = state
        .service
        .validate_authorize_request(&request.authorization)
        .await?;
    let redirect_url = state.service.approve(&validated, &identity).await?;

    Ok(Json(AuthorizeCallbackResponse { redirect_url }))
}
