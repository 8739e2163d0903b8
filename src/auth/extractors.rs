use crate::auth::cookies::{ClientStateStore, CookieScope};
use crate::AppState;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;

/// Handler-level failures rendered as JSON
#[derive(Debug)]
pub enum ConsoleError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        match self {
            ConsoleError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Bad request",
                    "message": msg,
                    "code": "BAD_REQUEST"
                })),
            )
                .into_response(),

            ConsoleError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "message": msg
                })),
            )
                .into_response(),
        }
    }
}

/// Cookie store for the current request, scoped by the console configuration
///
/// Usage:
/// ```rust,ignore
/// async fn handler(mut store: ClientStateStore) {
///     let tenant = store.get(TENANT_ID);
/// }
/// ```
impl FromRequestParts<Arc<AppState>> for ClientStateStore {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let store =
            ClientStateStore::from_headers(&parts.headers, CookieScope::from_config(&state.config));
        tracing::debug!(
            has_tenant = store.get(crate::auth::cookies::TENANT_ID).is_some(),
            has_client = store.get(crate::auth::cookies::CLIENT_ID).is_some(),
            "Client state loaded from cookies"
        );
        Ok(store)
    }
}
