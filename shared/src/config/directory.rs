//! Remote credential directory configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// HTTP client settings for the user/credential service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
    /// Base URL of the user service, without trailing slash
    pub base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:9201"),
            request_timeout_secs: 5,
        }
    }
}

impl DirectoryConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("CREDENTIAL_DIRECTORY_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            request_timeout_secs: env_or(
                "CREDENTIAL_DIRECTORY_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
        }
    }

    /// Create a configuration pointing at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }
}
