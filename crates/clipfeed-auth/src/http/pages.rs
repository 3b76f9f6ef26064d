//! Minimal server-rendered pages for the authorization flow.
//!
//! The sign-in page is a static shell: it loads the Clipfeed identity
//! widget, collects an identity token in the browser, and posts it to
//! `/authorize/callback` along with the original authorization parameters.

use crate::oauth::authorize::ValidatedAuthorization;

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Renders the sign-in page for a validated authorization request.
///
/// The authorization parameters are embedded as data attributes so the page
/// script can replay them to the callback endpoint; every value is
/// HTML-escaped on the way in.
pub fn render_sign_in_page(client_name: &str, authorization: &ValidatedAuthorization) -> String {
    let state = authorization.state.as_deref().unwrap_or("");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Sign in - Clipfeed</title>
</head>
<body>
  <main id="authorize"
        data-client-id="{client_id}"
        data-redirect-uri="{redirect_uri}"
        data-scope="{scope}"
        data-state="{state}"
        data-code-challenge="{code_challenge}"
        data-code-challenge-method="{method}">
    <h1>Sign in to Clipfeed</h1>
    <p><strong>{client_name}</strong> is requesting access to your Clipfeed account.</p>
    <p>Requested permissions: <code>{scope}</code></p>
    <div id="sign-in-widget"></div>
  </main>
  <script src="/assets/authorize.js" defer></script>
</body>
</html>
"#,
        client_id = escape_html(&authorization.client_id),
        redirect_uri = escape_html(&authorization.redirect_uri),
        scope = escape_html(&authorization.scope),
        state = escape_html(state),
        code_challenge = escape_html(authorization.code_challenge.as_str()),
        method = authorization.code_challenge_method.as_str(),
        client_name = escape_html(client_name),
    )
}

/// Renders an error page for failures that must not be delivered by
/// redirect, such as an unregistered redirect URI.
pub fn render_error_page(error_code: &str, description: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Authorization error - Clipfeed</title>
</head>
<body>
  <main>
    <h1>Authorization error</h1>
    <p><code>{error_code}</code>: {description}</p>
  </main>
</body>
</html>
"#,
        error_code = escape_html(error_code),
        description = escape_html(description),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::pkce::{PkceChallenge, PkceChallengeMethod, PkceVerifier};

    fn authorization() -> ValidatedAuthorization {
        ValidatedAuthorization {
            client_id: "client-1".to_string(),
            redirect_uri: "https://agent.example.com/callback".to_string(),
            scope: "agent:access".to_string(),
            state: Some("st<script>".to_string()),
            code_challenge: PkceChallenge::from_verifier(&PkceVerifier::generate()),
            code_challenge_method: PkceChallengeMethod::S256,
        }
    }

    #[test]
    fn test_sign_in_page_embeds_parameters() {
        let page = render_sign_in_page("Example Agent", &authorization());
        assert!(page.contains("data-client-id=\"client-1\""));
        assert!(page.contains("data-code-challenge-method=\"S256\""));
        assert!(page.contains("Example Agent"));
    }

    #[test]
    fn test_sign_in_page_escapes_values() {
        let page = render_sign_in_page("<img onerror=x>", &authorization());
        assert!(!page.contains("<img onerror"));
        assert!(!page.contains("st<script>"));
        assert!(page.contains("st&lt;script&gt;"));
    }

    #[test]
    fn test_error_page_escapes_description() {
        let page = render_error_page("invalid_request", "<script>alert(1)</script>");
        assert!(!page.contains("<script>alert"));
    }
}
