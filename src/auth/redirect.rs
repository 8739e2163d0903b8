//! Authorization redirect URL builders
//!
//! Everything here is pure: the handlers turn the resulting [`Url`] into a
//! `303 See Other`, which is the only navigation side effect.

use oauth2::CsrfToken;
use url::Url;

pub const AZURE_AUTHORITY: &str = "https://login.microsoftonline.com";
pub const AZURE_SCOPE: &str = "https://management.azure.com/user_impersonation";

pub const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GCP_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Append `params` to `endpoint` as form-urlencoded query pairs, in order
pub fn build_redirect_url<'a, I>(mut endpoint: Url, params: I) -> Url
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    endpoint.query_pairs_mut().extend_pairs(params);
    endpoint
}

/// Microsoft identity platform v2 authorize endpoint for `tenant_id`
///
/// The tenant is pushed as a single escaped path segment, so a value such as
/// `a/b` cannot change the endpoint path.
pub fn azure_authorize_endpoint(tenant_id: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(AZURE_AUTHORITY)?;
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .clear()
            .push(tenant_id)
            .extend(["oauth2", "v2.0", "authorize"]);
    }
    Ok(url)
}

/// Fresh nonce for a single authorization request
pub fn generate_nonce() -> String {
    CsrfToken::new_random().secret().clone()
}

/// Implicit-grant request against Azure AD
#[derive(Debug, Clone)]
pub struct AzureAuthorizeRequest<'a> {
    pub tenant_id: &'a str,
    pub client_id: &'a str,
    pub redirect_uri: &'a str,
    pub state: &'a str,
    pub nonce: &'a str,
}

impl AzureAuthorizeRequest<'_> {
    pub fn to_url(&self) -> Result<Url, url::ParseError> {
        let endpoint = azure_authorize_endpoint(self.tenant_id)?;
        Ok(build_redirect_url(
            endpoint,
            [
                ("client_id", self.client_id),
                ("response_type", "token"),
                ("response_mode", "fragment"),
                ("state", self.state),
                ("scope", AZURE_SCOPE),
                ("redirect_uri", self.redirect_uri),
                ("nonce", self.nonce),
            ],
        ))
    }
}

/// Implicit-grant request against Google OAuth 2.0
#[derive(Debug, Clone)]
pub struct GcpAuthorizeRequest<'a> {
    pub client_id: &'a str,
    pub redirect_uri: &'a str,
    pub state: &'a str,
}

impl GcpAuthorizeRequest<'_> {
    pub fn to_url(&self) -> Result<Url, url::ParseError> {
        let endpoint = Url::parse(GOOGLE_AUTH_ENDPOINT)?;
        Ok(build_redirect_url(
            endpoint,
            [
                ("client_id", self.client_id),
                ("redirect_uri", self.redirect_uri),
                ("response_type", "token"),
                ("scope", GCP_SCOPE),
                ("include_granted_scopes", "true"),
                ("state", self.state),
            ],
        ))
    }
}
