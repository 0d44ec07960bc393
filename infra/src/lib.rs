//! # Infrastructure Layer
//!
//! Concrete collaborators for the verification engine:
//! - **Cache**: Redis and in-memory code stores
//! - **Transport**: logging SMS and email transports for development
//! - **Directory**: HTTP client for the remote credential/user service
//! - **Telemetry**: tracing subscriber setup
//!
//! [`initialize`] wires them into a [`StrategyRegistry`] and the two
//! orchestrators.
//!
//! ## Features
//!
//! - `redis-cache`: Enable the Redis code store (default)

use std::sync::Arc;

use vc_core::errors::CollaboratorError;
use vc_core::services::verification::{
    CertificateService, CodeService, CodeStore, StrategyDependencies, StrategyRegistry,
    VerificationServiceConfig,
};
use vc_shared::config::{AppConfig, CodeStoreKind};

/// Code store backends
pub mod cache;

/// Remote credential directory client
pub mod directory;

/// Tracing subscriber initialisation
pub mod telemetry;

/// Message transports
pub mod transport;

pub use cache::MemoryCodeStore;
#[cfg(feature = "redis-cache")]
pub use cache::{RedisClient, RedisCodeStore};
pub use directory::HttpCredentialDirectory;
pub use telemetry::init_tracing;
pub use transport::{LogEmailTransport, LogSmsTransport};

/// Fully wired verification services
#[derive(Clone)]
pub struct InfrastructureServices {
    pub store: Arc<dyn CodeStore>,
    pub registry: Arc<StrategyRegistry>,
    pub code_service: Arc<CodeService>,
    pub certificate_service: Arc<CertificateService>,
}

/// Build every collaborator from `config` and wire the verification services
///
/// This function sets up:
/// - The code store selected by `CODE_STORE` (Redis or in-memory)
/// - The logging SMS and email transports
/// - The HTTP credential directory client
/// - The strategy registry shared by both orchestrators
pub async fn initialize(config: AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(
        environment = %config.environment,
        store = ?config.cache.store,
        "Initializing infrastructure services..."
    );

    let store = build_store(&config).await?;
    let console_output = config.environment.echoes_codes();
    let directory = Arc::new(HttpCredentialDirectory::new(&config.directory)?);
    let service_config = VerificationServiceConfig::from(&config.verification);

    let registry = Arc::new(StrategyRegistry::new(
        StrategyDependencies {
            store: store.clone(),
            directory,
            sms: Arc::new(LogSmsTransport::with_options(console_output, false)),
            mailer: Arc::new(LogEmailTransport::with_options(console_output, false)),
        },
        &service_config,
    ));

    let services = InfrastructureServices {
        store,
        code_service: Arc::new(CodeService::new(registry.clone(), service_config.clone())),
        certificate_service: Arc::new(CertificateService::new(registry.clone(), service_config)),
        registry,
    };

    tracing::info!("Infrastructure services initialized successfully");
    Ok(services)
}

/// Load `.env`, read configuration from the environment and initialise tracing
pub async fn bootstrap() -> Result<InfrastructureServices, InfrastructureError> {
    let config = load_config();
    init_tracing(&config.logging)?;
    initialize(config).await
}

/// Load configuration from environment, reading `.env` first when present
pub fn load_config() -> AppConfig {
    dotenvy::dotenv().ok();
    AppConfig::from_env()
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn CodeStore>, InfrastructureError> {
    match config.cache.store {
        CodeStoreKind::Memory => {
            if config.environment.is_production() {
                tracing::warn!(
                    event = "memory_store_in_production",
                    "In-memory code store is process-local; codes are not shared between replicas"
                );
            }
            Ok(Arc::new(MemoryCodeStore::with_prefix(config.cache.key_prefix.clone())))
        }
        #[cfg(feature = "redis-cache")]
        CodeStoreKind::Redis => {
            let client = RedisClient::new(config.cache.clone()).await?;
            Ok(Arc::new(RedisCodeStore::new(client)))
        }
        #[cfg(not(feature = "redis-cache"))]
        CodeStoreKind::Redis => Err(InfrastructureError::Config(
            "Redis code store requested but the redis-cache feature is disabled".to_string(),
        )),
    }
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for CollaboratorError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Http(ref source)
                if source.status().map_or(false, |status| status.is_client_error()) =>
            {
                CollaboratorError::Rejected(err.to_string())
            }
            InfrastructureError::Config(_) => CollaboratorError::Rejected(err.to_string()),
            InfrastructureError::Cache(_)
            | InfrastructureError::Http(_)
            | InfrastructureError::General(_) => CollaboratorError::Unavailable(err.to_string()),
        }
    }
}
