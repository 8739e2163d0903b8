use super::templates::ShellTemplate;
use crate::AppState;
use askama::Template;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;

/// Liveness probe - always returns OK if the process is running
pub async fn healthz_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe - checks if the service is ready to handle requests
///
/// Returns 503 Service Unavailable only when Google ID token verification is
/// enabled and the JWKS cache is still empty.
pub async fn readyz_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.id_token_verifier {
        Some(verifier) if !verifier.is_jwks_cached().await => {
            tracing::warn!("Readiness check failed: JWKS not cached");
            (StatusCode::SERVICE_UNAVAILABLE, "not ready: JWKS not cached")
        }
        _ => (StatusCode::OK, "ready"),
    }
}

/// Shell at the layout's default location
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Response {
    let pathname = state.layout.location.pathname.clone();
    render_shell(&state, &pathname)
}

/// Shell page for any registered path; 404 for unknown paths
pub async fn shell_handler(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    render_shell(&state, uri.path())
}

fn render_shell(state: &AppState, path: &str) -> Response {
    let resolved = state.layout.resolve(path);

    let template = match &resolved {
        Some(found) => ShellTemplate {
            menu: state.layout.menu_entries(&found.full_path),
            apps: state.layout.app_list.clone(),
            title: found
                .route
                .name
                .clone()
                .unwrap_or_else(|| "Console".to_string()),
            path: found.full_path.clone(),
            breadcrumb: found.breadcrumb.iter().map(|s| s.to_string()).collect(),
            component: found.route.component.clone(),
            access: found.route.access.clone(),
            found: true,
        },
        None => ShellTemplate {
            menu: state.layout.menu_entries(path),
            apps: state.layout.app_list.clone(),
            title: "Page not found".to_string(),
            path: path.to_string(),
            breadcrumb: Vec::new(),
            component: None,
            access: None,
            found: false,
        },
    };

    tracing::debug!(path = %path, found = resolved.is_some(), "Rendering shell page");

    let status = if resolved.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response(),
    }
}
