//! Redirect state tokens
//!
//! A state token is `<provider prefix><base36 unix millis><base36 random>`.
//! It is sent once per redirect and echoed back by the provider to the
//! redirect endpoint, which owns its validation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::provider::Provider;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Render an unsigned integer in lowercase base 36
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(13);
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    // digits are all ASCII
    digits.into_iter().map(char::from).collect()
}

/// Generate a state token for `provider` at the current time
pub fn generate_state_token(provider: Provider) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(saturating_millis)
        .unwrap_or(0);
    state_token_at(provider, millis, fastrand::u64(..))
}

/// Milliseconds in `elapsed`, clamped to `u64::MAX`
fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Deterministic form of [`generate_state_token`]
pub fn state_token_at(provider: Provider, unix_millis: u64, random: u64) -> String {
    format!(
        "{}{}{}",
        provider.state_prefix(),
        to_base36(unix_millis),
        to_base36(random)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
        assert_eq!(to_base36(u64::MAX), "3w5e11264sgsf");
    }

    #[test]
    fn test_millis_saturate_instead_of_wrapping() {
        assert_eq!(saturating_millis(Duration::from_millis(1_700_000_000_000)), 1_700_000_000_000);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_state_token_layout() {
        let token = state_token_at(Provider::Azure, 36, 35);
        assert_eq!(token, "az cloud:10z");
        let token = state_token_at(Provider::Gcp, 0, 0);
        assert_eq!(token, "gcp cloud:00");
    }

    #[test]
    fn test_generated_tokens_carry_provider_prefix() {
        assert!(generate_state_token(Provider::Azure).starts_with("az cloud:"));
        assert!(generate_state_token(Provider::Gcp).starts_with("gcp cloud:"));
    }

    #[test]
    fn test_tokens_unique_within_same_millisecond() {
        // Same timestamp for every token: only the random suffix differs
        let tokens: HashSet<String> = (0..1000)
            .map(|_| state_token_at(Provider::Gcp, 1_700_000_000_000, fastrand::u64(..)))
            .collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_generated_tokens_unique() {
        let tokens: HashSet<String> = (0..1000)
            .map(|_| generate_state_token(Provider::Azure))
            .collect();
        assert_eq!(tokens.len(), 1000);
    }
}
