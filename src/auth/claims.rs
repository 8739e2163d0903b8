//! Untrusted identity-token claim extraction
//!
//! **No signature, issuer, audience or expiry check happens here.** The
//! payload segment is decoded as-is so its claims can be logged. Anything
//! that needs to trust these values must go through
//! [`super::jwt::GoogleIdTokenVerifier`] instead, which checks the RS256
//! signature against Google's published keys.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

/// Standard OpenID Connect claims carried by a Google ID token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub azp: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub nbf: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub jti: Option<String>,
}

/// Claims read from a token whose signature was never checked
#[derive(Debug, Clone, PartialEq)]
pub struct Untrusted<T>(T);

impl<T> Untrusted<T> {
    /// Borrow the unverified value; the name is the warning
    pub fn unverified(&self) -> &T {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn into_unverified(self) -> T {
        self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential is not a JWS compact token (found {0} segment(s))")]
    Malformed(usize),
    #[error("credential payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("credential payload is not a JSON claims object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode the payload segment of `credential` without verifying it
pub fn extract_untrusted_claims(
    credential: &str,
) -> Result<Untrusted<IdTokenClaims>, CredentialError> {
    let segments: Vec<&str> = credential.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(CredentialError::Malformed(segments.len()));
    }

    // Some encoders keep the padding; the JWS form drops it
    let payload = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
    let claims: IdTokenClaims = serde_json::from_slice(&payload)?;
    Ok(Untrusted(claims))
}

/// Log every extracted claim, labelled as untrusted
pub fn log_untrusted_claims(claims: &Untrusted<IdTokenClaims>) {
    let c = claims.unverified();
    tracing::info!(
        event = "google_claims_untrusted",
        trust = "untrusted",
        iss = ?c.iss,
        azp = ?c.azp,
        aud = ?c.aud,
        sub = ?c.sub,
        email = ?c.email,
        email_verified = ?c.email_verified,
        nbf = ?c.nbf,
        name = ?c.name,
        picture = ?c.picture,
        given_name = ?c.given_name,
        family_name = ?c.family_name,
        iat = ?c.iat,
        exp = ?c.exp,
        jti = ?c.jti,
        "Decoded Google credential claims without signature verification"
    );
}

#[cfg(test)]
pub(crate) fn synthetic_credential(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"test","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    // Signature bytes are garbage on purpose
    format!("{}.{}.bm90LWEtc2lnbmF0dXJl", header, payload)
}
