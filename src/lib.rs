//! Console service library
//!
//! Provides the admin shell and the OAuth login page for the console.

#![deny(dead_code)]

pub mod auth;
pub mod config;
pub mod menu;
pub mod web;

use auth::jwt::GoogleIdTokenVerifier;
use config::Config;
use menu::Layout;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Validated shell layout
    pub layout: Arc<Layout>,
    /// Present only when GOOGLE_VERIFY_ID_TOKEN is enabled
    pub id_token_verifier: Option<Arc<GoogleIdTokenVerifier>>,
}

#[cfg(test)]
impl AppState {
    pub(crate) fn for_tests() -> Self {
        Self {
            config: Arc::new(Config::default()),
            layout: Arc::new(Layout::builtin()),
            id_token_verifier: None,
        }
    }
}
