use anyhow::{Context, Result};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::claims::IdTokenClaims;

pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Checks an identity-token credential and returns its claims only if it is authentic
pub trait IdTokenVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> impl Future<Output = Result<IdTokenClaims>> + Send;
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

struct JwksCache {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

pub struct GoogleIdTokenVerifier {
    jwks_url: String,
    /// Expected audience (the GIS web client id)
    expected_audience: String,
    client: reqwest::Client,
    jwks_cache: RwLock<Option<JwksCache>>,
    cache_ttl: Duration,
}

impl GoogleIdTokenVerifier {
    /// Create a Google ID token verifier (RS256 with JWKS)
    ///
    /// # Arguments
    /// * `jwks_url` - Google's key set, normally [`GOOGLE_JWKS_URL`]
    /// * `expected_audience` - GIS client id the widget was configured with
    /// * `connect_timeout_secs` - HTTP connect timeout
    /// * `request_timeout_secs` - HTTP request timeout
    /// * `jwks_cache_ttl_secs` - JWKS cache TTL
    pub fn new(
        jwks_url: String,
        expected_audience: String,
        connect_timeout_secs: u64,
        request_timeout_secs: u64,
        jwks_cache_ttl_secs: u64,
    ) -> Result<Self> {
        tracing::info!(
            jwks_url = %jwks_url,
            expected_audience = %expected_audience,
            jwks_cache_ttl_secs = jwks_cache_ttl_secs,
            "Google ID token verifier initialized"
        );

        let client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .context("Failed to build HTTP client for JWKS")?;

        Ok(Self {
            jwks_url,
            expected_audience,
            client,
            jwks_cache: RwLock::new(None),
            cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
        })
    }

    /// Check if JWKS is cached (for readiness)
    pub async fn is_jwks_cached(&self) -> bool {
        self.jwks_cache.read().await.is_some()
    }

    /// Prefetch JWKS at startup so readiness passes immediately
    pub async fn prefetch_jwks(&self) -> Result<()> {
        tracing::info!("Prefetching Google JWKS at startup for readiness");
        self.refresh_jwks().await
    }

    async fn verify_signed(&self, token: &str) -> Result<IdTokenClaims> {
        tracing::debug!(token_len = token.len(), "Verifying Google ID token");

        let header = decode_header(token).context("Invalid token header")?;
        let kid = header.kid.clone().context("Token missing kid")?;

        let decoding_key = match self.get_cached_key(&kid).await? {
            Some(key) => key,
            None => {
                // Google rotates keys; an unknown kid forces one refresh
                tracing::warn!(kid = %kid, "Key ID not found in cache, forcing JWKS refresh");
                self.refresh_jwks().await?;
                let cache = self.jwks_cache.read().await;
                match cache.as_ref().and_then(|c| c.keys.get(&kid).cloned()) {
                    Some(key) => key,
                    None => {
                        let available_kids: Vec<_> = cache
                            .as_ref()
                            .map(|c| c.keys.keys().collect())
                            .unwrap_or_default();
                        tracing::error!(
                            kid = %kid,
                            available_kids = ?available_kids,
                            "Unknown key ID - kid not found in JWKS even after refresh"
                        );
                        anyhow::bail!("Unknown key ID: {}", kid);
                    }
                }
            }
        };

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_audience(&[&self.expected_audience]);

        match decode::<IdTokenClaims>(token, &decoding_key, &validation) {
            Ok(data) => {
                tracing::info!(
                    sub = ?data.claims.sub,
                    email = ?data.claims.email,
                    "Google ID token verified"
                );
                Ok(data.claims)
            }
            Err(e) => {
                let token_hash = format!("{:x}", md5::compute(token));
                tracing::warn!(
                    error = ?e,
                    kid = %kid,
                    alg = ?header.alg,
                    token_hash = %token_hash,
                    token_len = token.len(),
                    "Google ID token verification failed"
                );
                anyhow::bail!("Token validation failed: {}", e);
            }
        }
    }

    /// Get cached key if the cache is fresh, refreshing an expired or empty cache
    async fn get_cached_key(&self, kid: &str) -> Result<Option<DecodingKey>> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some(jwks_cache) = cache.as_ref() {
                if jwks_cache.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(jwks_cache.keys.get(kid).cloned());
                }
                tracing::info!(
                    elapsed_secs = jwks_cache.fetched_at.elapsed().as_secs(),
                    ttl_secs = self.cache_ttl.as_secs(),
                    "JWKS cache expired, will refresh"
                );
            }
        }

        self.refresh_jwks().await?;
        let cache = self.jwks_cache.read().await;
        Ok(cache.as_ref().and_then(|c| c.keys.get(kid).cloned()))
    }

    async fn refresh_jwks(&self) -> Result<()> {
        tracing::info!(url = %self.jwks_url, "Fetching Google JWKS");

        let response: JwksResponse = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .context("Failed to fetch JWKS")?
            .error_for_status()
            .context("JWKS endpoint returned an error status")?
            .json()
            .await
            .context("Failed to parse JWKS")?;

        let keys = decoding_keys(response)?;
        tracing::info!(key_count = keys.len(), "JWKS fetched successfully");

        let mut cache = self.jwks_cache.write().await;
        *cache = Some(JwksCache {
            keys,
            fetched_at: Instant::now(),
        });

        Ok(())
    }
}

impl IdTokenVerifier for GoogleIdTokenVerifier {
    async fn verify(&self, credential: &str) -> Result<IdTokenClaims> {
        self.verify_signed(credential).await
    }
}

fn decoding_keys(response: JwksResponse) -> Result<HashMap<String, DecodingKey>> {
    let mut keys = HashMap::new();
    for jwk in response.keys {
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .context("Failed to create decoding key")?;
        tracing::debug!(kid = %jwk.kid, "Added key to cache");
        keys.insert(jwk.kid, key);
    }
    Ok(keys)
}
