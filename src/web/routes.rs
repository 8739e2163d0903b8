use super::handlers::{healthz_handler, index_handler, readyz_handler, shell_handler};
use crate::{
    auth::{google_callback_handler, login_page_handler, login_submit_handler},
    AppState,
};
use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .route("/login", get(login_page_handler).post(login_submit_handler))
        .route("/auth/google/callback", post(google_callback_handler))
        .nest_service("/static", ServeDir::new("static"))
        // Every other GET resolves against the shell layout
        .fallback(get(shell_handler))
        .with_state(state)
}
