//! Authentication module
//!
//! This module drives the console's login page. It never establishes a
//! session: it collects provider settings, hands the browser to the identity
//! provider, and logs what Google Identity Services posts back.
//!
//! ## Structure
//!
//! - `provider`: the selectable identity providers
//! - `state_token`: per-redirect state tokens
//! - `redirect`: pure authorize-URL builders
//! - `cookies`: the client state store backed by browser cookies
//! - `extractors`: axum extractor for the store, handler error type
//! - `flow`: form validation and the submit step
//! - `claims`: untrusted ID token claim extraction
//! - `jwt`: optional Google ID token verification (JWKS)
//! - `handlers`: HTTP handlers
//!
//! ## Login Flow
//!
//! 1. User opens `/login?provider=azure|gcp` → tab rendered, form pre-filled from cookies
//! 2. User submits → Azure: cookies written, 303 to the Azure AD authorize endpoint
//!    → GCP: 303 to the Google OAuth 2.0 endpoint
//! 3. Provider sends the token fragment to the fixed redirect URI (outside this service)
//! 4. GIS widget posts a credential to `/auth/google/callback` → claims logged → `/`

pub mod claims;
pub mod cookies;
pub mod extractors;
pub mod flow;
pub mod handlers;
pub mod jwt;
pub mod provider;
pub mod redirect;
pub mod state_token;

// Re-export handlers for convenient routing
pub use handlers::{
    google_callback_handler, login_page_handler, login_submit_handler, process_google_credential,
    GoogleSignIn,
};

pub use claims::{extract_untrusted_claims, CredentialError, IdTokenClaims, Untrusted};
pub use cookies::{ClientStateStore, CookieScope};
pub use flow::{submit_login, FieldErrors, LoginForm, Submission};
pub use provider::Provider;
pub use redirect::build_redirect_url;
pub use state_token::generate_state_token;
