//! Login flow controller
//!
//! `Idle → ProviderSelected → Submitting → Redirected`. A submission either
//! ends in a redirect (control leaves the console) or is rejected with field
//! messages, which puts the page back in `ProviderSelected`.

use serde::Deserialize;
use url::Url;

use super::cookies::{ClientStateStore, CLIENT_ID, TENANT_ID};
use super::provider::Provider;
use super::redirect::{generate_nonce, AzureAuthorizeRequest, GcpAuthorizeRequest};
use super::state_token::generate_state_token;
use crate::config::ProviderSettings;

pub const TENANT_REQUIRED: &str = "Please input tenant id";
pub const CLIENT_REQUIRED: &str = "Please input client id";

/// Login form as posted by the browser
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub client_id: String,
}

/// Inline validation messages, one per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub tenant_id: Option<&'static str>,
    pub client_id: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.tenant_id.is_none() && self.client_id.is_none()
    }
}

/// Azure identifiers that passed the required-field check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureCredentials {
    pub tenant_id: String,
    pub client_id: String,
}

impl LoginForm {
    /// Required-field check for the Azure tab; whitespace-only counts as missing
    pub fn azure_credentials(&self) -> Result<AzureCredentials, FieldErrors> {
        let tenant_id = self.tenant_id.trim();
        let client_id = self.client_id.trim();
        let errors = FieldErrors {
            tenant_id: tenant_id.is_empty().then_some(TENANT_REQUIRED),
            client_id: client_id.is_empty().then_some(CLIENT_REQUIRED),
        };
        if errors.is_empty() {
            Ok(AzureCredentials {
                tenant_id: tenant_id.to_string(),
                client_id: client_id.to_string(),
            })
        } else {
            Err(errors)
        }
    }
}

/// Result of submitting the login form
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The browser must navigate to `location`
    Redirected { provider: Provider, location: Url },
    /// Validation failed; nothing was written and no redirect happens
    Rejected(FieldErrors),
}

/// Run a login submission against `store`
///
/// Cookie writes land in `store` and only for a valid Azure submission.
pub fn submit_login(
    form: &LoginForm,
    settings: &ProviderSettings,
    store: &mut ClientStateStore,
) -> Result<Submission, url::ParseError> {
    tracing::info!(provider = %form.provider, "Login submitted");

    match form.provider {
        Provider::Azure => {
            let credentials = match form.azure_credentials() {
                Ok(credentials) => credentials,
                Err(errors) => {
                    tracing::info!(
                        event = "login_rejected",
                        provider = %form.provider,
                        missing_tenant = errors.tenant_id.is_some(),
                        missing_client = errors.client_id.is_some(),
                        "Required fields missing"
                    );
                    return Ok(Submission::Rejected(errors));
                }
            };

            store.set(TENANT_ID, &credentials.tenant_id);
            store.set(CLIENT_ID, &credentials.client_id);

            let state = generate_state_token(Provider::Azure);
            let nonce = generate_nonce();
            let location = AzureAuthorizeRequest {
                tenant_id: &credentials.tenant_id,
                client_id: &credentials.client_id,
                redirect_uri: &settings.azure_redirect_uri,
                state: &state,
                nonce: &nonce,
            }
            .to_url()?;

            tracing::info!(
                event = "azure_authorize_redirect",
                tenant_id = %credentials.tenant_id,
                client_id = %credentials.client_id,
                state = %state,
                "Redirecting to Azure AD authorize endpoint"
            );

            Ok(Submission::Redirected {
                provider: Provider::Azure,
                location,
            })
        }
        Provider::Gcp => {
            let state = generate_state_token(Provider::Gcp);
            let location = GcpAuthorizeRequest {
                client_id: &settings.gcp_client_id,
                redirect_uri: &settings.gcp_redirect_uri,
                state: &state,
            }
            .to_url()?;

            tracing::info!(
                event = "gcp_authorize_redirect",
                state = %state,
                "Redirecting to Google OAuth 2.0 endpoint"
            );

            Ok(Submission::Redirected {
                provider: Provider::Gcp,
                location,
            })
        }
    }
}
