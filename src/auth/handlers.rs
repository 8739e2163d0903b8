//! Login handlers
//!
//! - `login_page_handler`: renders the provider tabs (select provider)
//! - `login_submit_handler`: validates the form and redirects to the provider
//! - `google_callback_handler`: receives the Google Identity Services credential

use askama::Template;
use axum::{
    extract::{Query, State},
    http::{header::InvalidHeaderValue, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;

use super::claims::{extract_untrusted_claims, log_untrusted_claims, IdTokenClaims, Untrusted};
use super::cookies::{ClientStateStore, CLIENT_ID, G_CSRF_TOKEN, TENANT_ID};
use super::extractors::ConsoleError;
use super::flow::{submit_login, FieldErrors, LoginForm, Submission};
use super::jwt::IdTokenVerifier;
use super::provider::Provider;
use crate::web::templates::{LoginTemplate, TabView};
use crate::AppState;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub provider: Option<Provider>,
    pub error: Option<String>,
}

/// Fields posted by the GIS widget in redirect mode
#[derive(Debug, Default, Deserialize)]
pub struct GoogleCredentialForm {
    pub credential: Option<String>,
    pub g_csrf_token: Option<String>,
    pub select_by: Option<String>,
}

/// What came out of a GIS credential post-back
#[derive(Debug)]
pub enum GoogleSignIn {
    /// Claims were decoded but no signature check ran
    Unverified(Untrusted<IdTokenClaims>),
    /// Signature, issuer, audience and expiry checked
    Verified(IdTokenClaims),
    /// A verifier ran and refused the token
    Rejected(String),
    /// The credential could not even be decoded
    Malformed(String),
}

const GOOGLE_FAILURE_REDIRECT: &str = "/login?provider=gcp&error=google";

// =============================================================================
// Internal Helpers
// =============================================================================

/// Create a HeaderValue from a string, mapping failures to an internal error
fn header_value(s: &str) -> Result<HeaderValue, ConsoleError> {
    HeaderValue::from_str(s).map_err(|e: InvalidHeaderValue| {
        tracing::error!(
            error = %e,
            value_len = s.len(),
            "Failed to create header value"
        );
        ConsoleError::Internal("Internal error setting response headers".to_string())
    })
}

struct LoginView<'a> {
    provider: Provider,
    tenant_id: &'a str,
    client_id: &'a str,
    errors: FieldErrors,
    notice: Option<&'static str>,
}

fn render_login(state: &AppState, view: LoginView<'_>) -> Result<String, ConsoleError> {
    let template = LoginTemplate {
        tabs: Provider::ALL
            .iter()
            .map(|p| TabView {
                key: p.key(),
                label: p.label(),
                active: *p == view.provider,
            })
            .collect(),
        provider: view.provider.key(),
        collects_credentials: view.provider.collects_credentials(),
        tenant_id: view.tenant_id.to_string(),
        client_id: view.client_id.to_string(),
        tenant_error: view.errors.tenant_id,
        client_error: view.errors.client_id,
        notice: view.notice,
        google_client_id: state.config.gapi_client_id.clone(),
        google_login_uri: state.config.google_login_uri(),
    };
    template.render().map_err(|e| {
        tracing::error!(error = %e, "Failed to render login template");
        ConsoleError::Internal("Template error".to_string())
    })
}

/// Decode, log and optionally verify a GIS credential
///
/// Extraction never calls `verifier`; verification only runs when one is given.
pub async fn process_google_credential<V: IdTokenVerifier>(
    credential: &str,
    verifier: Option<&V>,
) -> GoogleSignIn {
    let claims = match extract_untrusted_claims(credential) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(error = %e, "Google credential could not be decoded");
            return GoogleSignIn::Malformed(e.to_string());
        }
    };
    log_untrusted_claims(&claims);

    let Some(verifier) = verifier else {
        tracing::warn!(
            event = "google_claims_unverified",
            "Google credential signature NOT verified; claims are informational only"
        );
        return GoogleSignIn::Unverified(claims);
    };

    match verifier.verify(credential).await {
        Ok(verified) => GoogleSignIn::Verified(verified),
        Err(e) => GoogleSignIn::Rejected(e.to_string()),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Login page - renders the selected provider tab
///
/// Selecting a tab is a plain GET: nothing is written and nothing redirects.
pub async fn login_page_handler(
    State(state): State<Arc<AppState>>,
    store: ClientStateStore,
    Query(query): Query<LoginQuery>,
) -> Result<Response, ConsoleError> {
    let provider = query.provider.unwrap_or_default();
    tracing::debug!(provider = %provider, "Login page requested");

    let notice = query
        .error
        .as_deref()
        .filter(|e| *e == "google")
        .map(|_| "Google sign-in failed, please try again");

    let html = render_login(
        &state,
        LoginView {
            provider,
            tenant_id: store.get(TENANT_ID).unwrap_or_default(),
            client_id: store.get(CLIENT_ID).unwrap_or_default(),
            errors: FieldErrors::default(),
            notice,
        },
    )?;
    Ok(Html(html).into_response())
}

/// Login submission - redirects to the provider or re-renders with field errors
pub async fn login_submit_handler(
    State(state): State<Arc<AppState>>,
    mut store: ClientStateStore,
    Form(form): Form<LoginForm>,
) -> Result<Response, ConsoleError> {
    let submission = submit_login(&form, &state.config.providers, &mut store).map_err(|e| {
        tracing::error!(error = %e, provider = %form.provider, "Failed to build authorize URL");
        ConsoleError::Internal("Invalid provider endpoint".to_string())
    })?;

    match submission {
        Submission::Rejected(errors) => {
            let html = render_login(
                &state,
                LoginView {
                    provider: form.provider,
                    tenant_id: &form.tenant_id,
                    client_id: &form.client_id,
                    errors,
                    notice: None,
                },
            )?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
        }
        Submission::Redirected { location, .. } => {
            let mut response = Redirect::to(location.as_str()).into_response();
            for cookie in store.set_cookie_headers() {
                response
                    .headers_mut()
                    .append(axum::http::header::SET_COOKIE, header_value(&cookie)?);
            }
            Ok(response)
        }
    }
}

/// Google Identity Services callback (redirect ux mode)
///
/// No session is established here: the claims are logged and the browser is
/// sent back to the shell.
pub async fn google_callback_handler(
    State(state): State<Arc<AppState>>,
    store: ClientStateStore,
    Form(form): Form<GoogleCredentialForm>,
) -> Result<Response, ConsoleError> {
    tracing::info!(select_by = ?form.select_by, "Google sign-in callback received");

    // Double-submit check: GIS sets the cookie and posts the same token
    match (store.get(G_CSRF_TOKEN), form.g_csrf_token.as_deref()) {
        (Some(cookie), Some(body)) if cookie == body => {}
        (cookie, body) => {
            tracing::warn!(
                event = "google_login_failed",
                has_cookie = cookie.is_some(),
                has_body_token = body.is_some(),
                "GIS CSRF validation failed"
            );
            return Err(ConsoleError::BadRequest(
                "Failed to verify double submit cookie".to_string(),
            ));
        }
    }

    let Some(credential) = form.credential.as_deref().filter(|c| !c.is_empty()) else {
        tracing::warn!(event = "google_login_failed", "Google login failed: no credential");
        return Ok(Redirect::to(GOOGLE_FAILURE_REDIRECT).into_response());
    };

    match process_google_credential(credential, state.id_token_verifier.as_deref()).await {
        GoogleSignIn::Unverified(_) => {
            tracing::info!(event = "google_login_untrusted", "Google login successful (unverified)");
            Ok(Redirect::to("/").into_response())
        }
        GoogleSignIn::Verified(claims) => {
            tracing::info!(
                event = "google_login_verified",
                sub = ?claims.sub,
                "Google login successful"
            );
            Ok(Redirect::to("/").into_response())
        }
        GoogleSignIn::Rejected(reason) | GoogleSignIn::Malformed(reason) => {
            tracing::warn!(event = "google_login_failed", reason = %reason, "Google login failed");
            Ok(Redirect::to(GOOGLE_FAILURE_REDIRECT).into_response())
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::synthetic_credential;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Verifier that records every call
    #[derive(Default)]
    struct CountingVerifier {
        calls: AtomicUsize,
        accept: bool,
    }

    impl IdTokenVerifier for CountingVerifier {
        async fn verify(&self, credential: &str) -> anyhow::Result<IdTokenClaims> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.accept {
                Ok(extract_untrusted_claims(credential)?.into_unverified())
            } else {
                anyhow::bail!("signature mismatch")
            }
        }
    }

    fn credential() -> String {
        synthetic_credential(&json!({
            "iss": "https://accounts.google.com",
            "sub": "1234",
            "email": "ada@example.com",
            "exp": 1_900_000_000_i64
        }))
    }

    #[tokio::test]
    async fn test_unverified_path_never_calls_verifier() {
        let verifier = CountingVerifier::default();

        // Extraction alone, the way the handler runs without verification
        let claims = extract_untrusted_claims(&credential()).unwrap();
        assert_eq!(claims.unverified().email.as_deref(), Some("ada@example.com"));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);

        let outcome = process_google_credential::<CountingVerifier>(&credential(), None).await;
        let GoogleSignIn::Unverified(claims) = outcome else {
            panic!("expected unverified outcome");
        };
        let c = claims.unverified();
        assert_eq!(c.iss.as_deref(), Some("https://accounts.google.com"));
        assert_eq!(c.sub.as_deref(), Some("1234"));
        assert_eq!(c.exp, Some(1_900_000_000));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_configured_verifier_runs_once() {
        let verifier = CountingVerifier {
            accept: true,
            ..CountingVerifier::default()
        };
        let outcome = process_google_credential(&credential(), Some(&verifier)).await;
        assert!(matches!(outcome, GoogleSignIn::Verified(_)));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejecting_verifier() {
        let verifier = CountingVerifier::default();
        let outcome = process_google_credential(&credential(), Some(&verifier)).await;
        assert!(matches!(outcome, GoogleSignIn::Rejected(_)));
    }

    #[tokio::test]
    async fn test_malformed_credential_skips_verifier() {
        let verifier = CountingVerifier {
            accept: true,
            ..CountingVerifier::default()
        };
        let outcome = process_google_credential("nope", Some(&verifier)).await;
        assert!(matches!(outcome, GoogleSignIn::Malformed(_)));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    }
}
