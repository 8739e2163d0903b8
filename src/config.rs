use std::env;

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

/// Source for the shell layout (route tree, default location, app list)
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutSource {
    /// Layout compiled into the binary
    Builtin,
    /// Layout provided as JSON string via CONSOLE_LAYOUT_JSON env var
    Json(String),
    /// Layout loaded from file path via CONSOLE_LAYOUT_PATH env var
    File(String),
}

/// Fixed application settings for the two redirect-based providers
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Where Azure AD sends the browser back with the token fragment
    pub azure_redirect_uri: String,
    /// Google OAuth client registered for the Cloud Platform scope
    pub gcp_client_id: String,
    pub gcp_redirect_uri: String,
}

pub const DEFAULT_REDIRECT_URI: &str = "https://www.51yomo.net/tidbonaks/dashboard";
pub const DEFAULT_GCP_CLIENT_ID: &str =
    "219264688762-h33r9i2oepc4ql2pc1123osvk5e8m7h3.apps.googleusercontent.com";

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            azure_redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            gcp_client_id: DEFAULT_GCP_CLIENT_ID.to_string(),
            gcp_redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Environment configuration
    pub environment: Environment,

    // Server configuration
    pub server_host: String,
    pub server_port: u16,

    // Console public URL (GIS posts the credential back here)
    pub public_url: String,

    // Cookie configuration (None = host-only cookie, Some = domain cookie)
    pub cookie_domain: Option<String>,

    pub providers: ProviderSettings,

    // Google Identity Services widget; None hides the widget
    pub gapi_client_id: Option<String>,
    pub verify_google_id_token: bool,

    // HTTP client timeout configuration (in seconds)
    pub http_connect_timeout_secs: u64,
    pub http_request_timeout_secs: u64,

    // JWKS cache configuration (in seconds)
    pub jwks_cache_ttl_secs: u64,

    pub layout: LayoutSource,
}

impl Config {
    /// Load configuration from environment variables using std::env::var
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("ENVIRONMENT")
            .unwrap_or_else(|| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let server_port = lookup("SERVER_PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        let public_url = lookup("CONSOLE_PUBLIC_URL")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", server_port))
            .trim_end_matches('/')
            .to_string();

        let cookie_domain = lookup("COOKIE_DOMAIN").filter(|s| !s.is_empty());

        let defaults = ProviderSettings::default();
        let providers = ProviderSettings {
            azure_redirect_uri: lookup("AZURE_REDIRECT_URI")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.azure_redirect_uri),
            gcp_client_id: lookup("GCP_CLIENT_ID")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.gcp_client_id),
            gcp_redirect_uri: lookup("GCP_REDIRECT_URI")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.gcp_redirect_uri),
        };

        let gapi_client_id = lookup("GAPI_CLIENT_ID").filter(|s| !s.is_empty());

        let verify_google_id_token = matches!(
            lookup("GOOGLE_VERIFY_ID_TOKEN")
                .unwrap_or_default()
                .to_lowercase()
                .as_str(),
            "1" | "true" | "yes"
        );

        if verify_google_id_token && gapi_client_id.is_none() {
            return Err(anyhow::anyhow!(
                "GOOGLE_VERIFY_ID_TOKEN requires GAPI_CLIENT_ID to be set (expected audience)"
            ));
        }

        let http_connect_timeout_secs = lookup("HTTP_CONNECT_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        let http_request_timeout_secs = lookup("HTTP_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let jwks_cache_ttl_secs = lookup("JWKS_CACHE_TTL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(3600);

        // Inline JSON wins over a file path; neither means the built-in layout
        let layout = if let Some(json) = lookup("CONSOLE_LAYOUT_JSON") {
            LayoutSource::Json(json)
        } else if let Some(path) = lookup("CONSOLE_LAYOUT_PATH") {
            LayoutSource::File(path)
        } else {
            LayoutSource::Builtin
        };

        Ok(Config {
            environment,
            server_host,
            server_port,
            public_url,
            cookie_domain,
            providers,
            gapi_client_id,
            verify_google_id_token,
            http_connect_timeout_secs,
            http_request_timeout_secs,
            jwks_cache_ttl_secs,
            layout,
        })
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// URL the GIS widget posts the credential to
    pub fn google_login_uri(&self) -> String {
        format!("{}/auth/google/callback", self.public_url)
    }

    /// Get bind address for server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            public_url: "http://localhost:3000".to_string(),
            cookie_domain: None,
            providers: ProviderSettings::default(),
            gapi_client_id: None,
            verify_google_id_token: false,
            http_connect_timeout_secs: 10,
            http_request_timeout_secs: 30,
            jwks_cache_ttl_secs: 3600,
            layout: LayoutSource::Builtin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.public_url, "http://localhost:3000");
        assert_eq!(config.providers.azure_redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.providers.gcp_client_id, DEFAULT_GCP_CLIENT_ID);
        assert!(config.gapi_client_id.is_none());
        assert!(!config.verify_google_id_token);
        assert_eq!(config.layout, LayoutSource::Builtin);
    }

    #[test]
    fn test_production_and_overrides() {
        let config = load(&[
            ("ENVIRONMENT", "prod"),
            ("SERVER_PORT", "8080"),
            ("CONSOLE_PUBLIC_URL", "https://console.example.com/"),
            ("COOKIE_DOMAIN", ""),
            ("GCP_CLIENT_ID", "gcp-app"),
        ])
        .unwrap();
        assert!(config.is_production());
        assert_eq!(config.server_port, 8080);
        assert_eq!(
            config.google_login_uri(),
            "https://console.example.com/auth/google/callback"
        );
        assert!(config.cookie_domain.is_none());
        assert_eq!(config.providers.gcp_client_id, "gcp-app");
    }

    #[test]
    fn test_invalid_port_falls_back_to_default() {
        let config = load(&[("SERVER_PORT", "not-a-port")]).unwrap();
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_verification_requires_client_id() {
        assert!(load(&[("GOOGLE_VERIFY_ID_TOKEN", "true")]).is_err());

        let config = load(&[
            ("GOOGLE_VERIFY_ID_TOKEN", "true"),
            ("GAPI_CLIENT_ID", "web-client"),
        ])
        .unwrap();
        assert!(config.verify_google_id_token);
    }

    #[test]
    fn test_layout_json_takes_precedence_over_path() {
        let config = load(&[
            ("CONSOLE_LAYOUT_JSON", "{}"),
            ("CONSOLE_LAYOUT_PATH", "/etc/console/layout.json"),
        ])
        .unwrap();
        assert_eq!(config.layout, LayoutSource::Json("{}".to_string()));

        let config = load(&[("CONSOLE_LAYOUT_PATH", "/etc/console/layout.json")]).unwrap();
        assert_eq!(
            config.layout,
            LayoutSource::File("/etc/console/layout.json".to_string())
        );
    }
}
