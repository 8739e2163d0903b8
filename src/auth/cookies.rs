//! Client-side state kept in browser cookies
//!
//! The login flow never touches request headers directly: it reads and writes
//! through a [`ClientStateStore`], which is built per request and turns its
//! writes into `Set-Cookie` headers scoped by a [`CookieScope`].

use std::collections::HashMap;

use axum::http::HeaderMap;

use crate::config::Config;

pub const TENANT_ID: &str = "TENANT_ID";
pub const CLIENT_ID: &str = "CLIENT_ID";
/// Reserved for the token the redirect endpoint stores; never written here
pub const AUTH_ACCESS_TOKEN: &str = "AUTH_ACCESS_TOKEN";
/// Double-submit token set by Google Identity Services
pub const G_CSRF_TOKEN: &str = "g_csrf_token";

/// Path, domain and transport constraints shared by every cookie the console writes
///
/// No `Max-Age` is emitted: values live for the browser session.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieScope {
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
}

impl Default for CookieScope {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            domain: None,
            secure: false,
        }
    }
}

impl CookieScope {
    pub fn from_config(config: &Config) -> Self {
        Self {
            path: "/".to_string(),
            domain: config.cookie_domain.clone(),
            secure: config.is_production(),
        }
    }

    /// Not `HttpOnly`: the provider's redirect page reads these from `document.cookie`
    fn attributes(&self) -> String {
        let mut attrs = format!("; Path={}; SameSite=Lax", self.path);
        if let Some(domain) = &self.domain {
            attrs.push_str(&format!("; Domain={}", domain));
        }
        if self.secure {
            attrs.push_str("; Secure");
        }
        attrs
    }
}

/// Key-value view over the request cookies plus pending writes
#[derive(Debug, Clone, Default)]
pub struct ClientStateStore {
    values: HashMap<String, String>,
    pending: Vec<(String, String)>,
    scope: CookieScope,
}

impl ClientStateStore {
    pub fn new(scope: CookieScope) -> Self {
        Self {
            values: HashMap::new(),
            pending: Vec::new(),
            scope,
        }
    }

    /// Parse every `Cookie` header; the first occurrence of a name wins
    pub fn from_headers(headers: &HeaderMap, scope: CookieScope) -> Self {
        let mut store = Self::new(scope);
        for header_value in headers.get_all("cookie") {
            let Ok(cookie_str) = header_value.to_str() else {
                continue;
            };
            for pair in cookie_str.split(';').map(str::trim) {
                let Some((name, raw)) = pair.split_once('=') else {
                    continue;
                };
                let value = urlencoding::decode(raw)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| raw.to_string());
                store.values.entry(name.to_string()).or_insert(value);
            }
        }
        store
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Record a value; visible to later reads and emitted as a `Set-Cookie`
    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.pending.retain(|(k, _)| k != key);
        self.pending.push((key.to_string(), value.to_string()));
    }

    #[cfg(test)]
    pub(crate) fn scope(&self) -> &CookieScope {
        &self.scope
    }

    #[cfg(test)]
    pub(crate) fn has_pending_writes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// `Set-Cookie` header values for every write, in write order
    pub fn set_cookie_headers(&self) -> Vec<String> {
        let attrs = self.scope.attributes();
        self.pending
            .iter()
            .map(|(key, value)| format!("{}={}{}", key, urlencoding::encode(value), attrs))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_reads_values_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("foo=bar; TENANT_ID=T1; CLIENT_ID=C%201"),
        );
        let store = ClientStateStore::from_headers(&headers, CookieScope::default());
        assert_eq!(store.get(TENANT_ID), Some("T1"));
        assert_eq!(store.get(CLIENT_ID), Some("C 1"));
        assert_eq!(store.get(AUTH_ACCESS_TOKEN), None);
        assert!(!store.has_pending_writes());
    }

    #[test]
    fn test_multiple_cookie_headers_first_match_wins() {
        let mut headers = HeaderMap::new();
        headers.append("cookie", HeaderValue::from_static("TENANT_ID=first"));
        headers.append("cookie", HeaderValue::from_static("TENANT_ID=second; CLIENT_ID=c"));
        let store = ClientStateStore::from_headers(&headers, CookieScope::default());
        assert_eq!(store.get(TENANT_ID), Some("first"));
        assert_eq!(store.get(CLIENT_ID), Some("c"));
    }

    #[test]
    fn test_no_cookie_header() {
        let store = ClientStateStore::from_headers(&HeaderMap::new(), CookieScope::default());
        assert_eq!(store.get(TENANT_ID), None);
    }

    #[test]
    fn test_writes_become_root_scoped_set_cookie_headers() {
        let mut store = ClientStateStore::new(CookieScope::default());
        store.set(TENANT_ID, "T1");
        store.set(CLIENT_ID, "C1");
        store.set(TENANT_ID, "T2");

        assert_eq!(store.get(TENANT_ID), Some("T2"));
        assert_eq!(
            store.set_cookie_headers(),
            vec![
                "CLIENT_ID=C1; Path=/; SameSite=Lax".to_string(),
                "TENANT_ID=T2; Path=/; SameSite=Lax".to_string(),
            ]
        );
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let mut store = ClientStateStore::new(CookieScope::default());
        store.set(TENANT_ID, "a;b c");
        assert!(store.set_cookie_headers()[0].starts_with("TENANT_ID=a%3Bb%20c;"));
    }

    #[test]
    fn test_cookies_stay_readable_by_page_scripts() {
        let mut store = ClientStateStore::new(CookieScope::default());
        store.set(TENANT_ID, "T1");
        store.set(AUTH_ACCESS_TOKEN, "tok");
        for header in store.set_cookie_headers() {
            assert!(!header.contains("HttpOnly"), "{header}");
            assert!(header.contains("SameSite=Lax"));
        }
    }

    #[test]
    fn test_production_scope_adds_domain_and_secure() {
        let config = Config {
            environment: crate::config::Environment::Production,
            cookie_domain: Some("example.com".to_string()),
            ..Config::default()
        };
        let mut store = ClientStateStore::new(CookieScope::from_config(&config));
        store.set(CLIENT_ID, "C1");
        assert_eq!(
            store.set_cookie_headers()[0],
            "CLIENT_ID=C1; Path=/; SameSite=Lax; Domain=example.com; Secure"
        );
    }
}
