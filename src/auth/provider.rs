use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity provider selected on the login page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Azure,
    Gcp,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Azure, Provider::Gcp];

    /// Value used in query strings and the hidden form field
    pub fn key(self) -> &'static str {
        match self {
            Provider::Azure => "azure",
            Provider::Gcp => "gcp",
        }
    }

    /// Tab label
    pub fn label(self) -> &'static str {
        match self {
            Provider::Azure => "Azure",
            Provider::Gcp => "GCP",
        }
    }

    /// Literal prefix of the redirect state token
    pub fn state_prefix(self) -> &'static str {
        match self {
            Provider::Azure => "az cloud:",
            Provider::Gcp => "gcp cloud:",
        }
    }

    /// Whether the login form collects tenant/client identifiers
    pub fn collects_credentials(self) -> bool {
        matches!(self, Provider::Azure)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_azure() {
        assert_eq!(Provider::default(), Provider::Azure);
    }

    #[test]
    fn test_serde_uses_lowercase_keys() {
        for provider in Provider::ALL {
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, format!("\"{}\"", provider.key()));
        }
        assert!(serde_json::from_str::<Provider>("\"aws\"").is_err());
    }

    #[test]
    fn test_only_azure_collects_credentials() {
        assert!(Provider::Azure.collects_credentials());
        assert!(!Provider::Gcp.collects_credentials());
    }
}
