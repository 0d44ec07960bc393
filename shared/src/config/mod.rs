//! Configuration module split by concern
//!
//! - `cache` - Code store selection and Redis connection settings
//! - `directory` - Remote credential directory client settings
//! - `environment` - Environment detection and logging configuration
//! - `verification` - Code length, per-channel TTLs, attempt and remote-call limits

pub mod cache;
pub mod directory;
pub mod environment;
pub mod verification;

use serde::{Deserialize, Serialize};

pub use cache::{CacheConfig, CodeStoreKind};
pub use directory::DirectoryConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use verification::VerificationConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Code store configuration
    pub cache: CacheConfig,

    /// Verification behaviour
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Credential directory client
    pub directory: DirectoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            cache: CacheConfig::default(),
            verification: VerificationConfig::default(),
            directory: DirectoryConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Missing or unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }
        logging.format = env_or("LOG_FORMAT", logging.format);

        Self {
            environment,
            cache: CacheConfig::from_env(),
            verification: VerificationConfig::from_env(),
            directory: DirectoryConfig::from_env(),
            logging,
        }
    }
}

/// Read an environment variable and parse it, falling back to `default`
pub(crate) fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
