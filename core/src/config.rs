//! Client configuration.
//!
//! Everything here is fixed once a `Transport` is built; changing the token
//! means building a new client.

use std::time::Duration;

use thiserror::Error;

pub const URL_ENV: &str = "BOARDS_URL";
pub const TOKEN_ENV: &str = "BOARDS_TOKEN";
pub const TIMEOUT_ENV: &str = "BOARDS_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Connection settings for a boards server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Option<Duration>,
    /// Sent with every request, after the identification header.
    pub default_headers: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            token: None,
            timeout: None,
            default_headers: Vec::new(),
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string()).filter(|t| !t.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Read `BOARDS_URL`, `BOARDS_TOKEN` and `BOARDS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(URL_ENV).ok_or(ConfigError::MissingVar(URL_ENV))?;
        let mut config = Self::new(&base_url);

        if let Some(token) = lookup(TOKEN_ENV) {
            config = config.with_token(&token);
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout {
                    var: TIMEOUT_ENV,
                    value: raw.clone(),
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (URL_ENV, "http://boards.local"),
            (TOKEN_ENV, "abc"),
            (TIMEOUT_ENV, "30"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://boards.local");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn url_is_required() {
        let err = ClientConfig::from_lookup(lookup(&[(TOKEN_ENV, "abc")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(URL_ENV));
    }

    #[test]
    fn rejects_zero_or_garbage_timeout() {
        for bad in ["0", "soon", "-5"] {
            let vars = [(URL_ENV, "http://x"), (TIMEOUT_ENV, bad)];
            let err = ClientConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTimeout { .. }), "{bad}");
        }
    }

    #[test]
    fn empty_token_means_anonymous() {
        let config = ClientConfig::new("http://x").with_token("");
        assert!(config.token.is_none());
    }
}
