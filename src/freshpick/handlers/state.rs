//! Account configuration and shared handler state.

use crate::token::ActivationCodec;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

/// Remember-me cookie lifetime fixed at seven days.
pub(crate) const REMEMBER_COOKIE_MAX_AGE_SECONDS: i64 = 7 * 24 * 3600;

#[derive(Clone, Debug)]
pub struct AccountConfig {
    base_url: String,
    session_ttl_seconds: i64,
}

impl AccountConfig {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Only mark cookies secure when the storefront is served over HTTPS.
    pub(crate) fn cookie_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Process-wide state shared by the account handlers.
pub struct AccountState {
    config: AccountConfig,
    codec: ActivationCodec,
}

impl AccountState {
    #[must_use]
    pub fn new(config: AccountConfig, codec: ActivationCodec) -> Self {
        Self { config, codec }
    }

    #[must_use]
    pub fn config(&self) -> &AccountConfig {
        &self.config
    }

    #[must_use]
    pub fn codec(&self) -> &ActivationCodec {
        &self.codec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn account_config_defaults_and_overrides() {
        let config = AccountConfig::new("https://freshpick.store".to_string());

        assert_eq!(config.base_url(), "https://freshpick.store");
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert!(config.cookie_secure());

        let config = config.with_session_ttl_seconds(120);
        assert_eq!(config.session_ttl_seconds(), 120);
    }

    #[test]
    fn cookie_secure_requires_https() {
        let config = AccountConfig::new("http://localhost:8080".to_string());
        assert!(!config.cookie_secure());
    }

    #[test]
    fn account_state_exposes_parts() {
        let config = AccountConfig::new("https://freshpick.store".to_string());
        let codec = crate::token::ActivationCodec::new(&SecretString::from("secret"));
        let state = AccountState::new(config, codec);
        assert_eq!(state.config().base_url(), "https://freshpick.store");
    }
}
