//! Client configuration: API base URLs and credentials.

use std::env;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{BalikobotError, Result};

pub const DEFAULT_API_URL: &str = "https://api.balikobot.cz";
pub const DEFAULT_API_V2_URL: &str = "https://apiv2.balikobot.cz";

/// API user and key issued by Balikobot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_user: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(api_user: &str, api_key: &str) -> Self {
        Self {
            api_user: api_user.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Value of the `authorization` header (HTTP Basic).
    pub fn authorization(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.api_user, self.api_key));
        format!("Basic {token}")
    }
}

/// Where the client sends requests and how it authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub api_v2_url: String,
    pub credentials: Option<Credentials>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_v2_url: DEFAULT_API_V2_URL.to_string(),
            credentials: None,
        }
    }
}

impl Config {
    /// Send both API generations to one host. Handy for test servers.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            api_url: base_url.to_string(),
            api_v2_url: base_url.to_string(),
            credentials: None,
        }
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Load configuration from environment variables
    ///
    /// # Environment Variables
    /// - `BALIKOBOT_API_USER`: Required - API user
    /// - `BALIKOBOT_API_KEY`: Required - API key
    /// - `BALIKOBOT_API_URL`: Optional - V1 base URL (default: `https://api.balikobot.cz`)
    /// - `BALIKOBOT_API_V2_URL`: Optional - V2 base URL (default: `https://apiv2.balikobot.cz`)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            let value = lookup(key).ok_or_else(|| BalikobotError::Config(format!("{key} not set")))?;
            if value.trim().is_empty() {
                return Err(BalikobotError::Config(format!("{key} cannot be empty")));
            }
            Ok(value)
        };

        let api_user = required("BALIKOBOT_API_USER")?;
        let api_key = required("BALIKOBOT_API_KEY")?;

        let api_url = lookup("BALIKOBOT_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_v2_url = lookup("BALIKOBOT_API_V2_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_V2_URL.to_string());

        Ok(Config {
            api_url,
            api_v2_url,
            credentials: Some(Credentials { api_user, api_key }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_point_to_production() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://api.balikobot.cz");
        assert_eq!(config.api_v2_url, "https://apiv2.balikobot.cz");
        assert!(config.credentials.is_none());
    }

    #[test]
    fn loads_credentials_and_urls() {
        let config = Config::from_lookup(lookup(&[
            ("BALIKOBOT_API_USER", "user"),
            ("BALIKOBOT_API_KEY", "key"),
            ("BALIKOBOT_API_V2_URL", "http://localhost:3000"),
        ]))
        .unwrap();
        assert_eq!(config.credentials, Some(Credentials::new("user", "key")));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.api_v2_url, "http://localhost:3000");
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[("BALIKOBOT_API_USER", "user")])).unwrap_err();
        assert_eq!(err.to_string(), "configuration error: BALIKOBOT_API_KEY not set");
    }

    #[test]
    fn blank_user_is_an_error() {
        let err = Config::from_lookup(lookup(&[
            ("BALIKOBOT_API_USER", "  "),
            ("BALIKOBOT_API_KEY", "key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, BalikobotError::Config(_)));
    }

    #[test]
    fn authorization_is_basic() {
        let credentials = Credentials::new("user", "key");
        assert_eq!(credentials.authorization(), "Basic dXNlcjprZXk=");
    }
}
