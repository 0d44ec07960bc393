//! Business services containing the verification use cases.

pub mod verification;

// Re-export commonly used types
pub use verification::{
    CertificateService, ChannelTransport, CodeService, CodeStore, CredentialDirectory,
    StrategyDependencies, StrategyRegistry, VerificationServiceConfig,
};
