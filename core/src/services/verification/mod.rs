//! Multi-channel verification code workflow
//!
//! This module provides:
//! - Collaborator contracts (`CodeStore`, `ChannelTransport`, `CredentialDirectory`)
//! - Per-channel strategies sharing one capability set
//! - A registry mapping channel codes to strategies
//! - `CodeService` for issuance and `CertificateService` for verification
//! - Request deadlines and bounded retries for every remote call

mod certificate_service;
mod code_service;
mod config;
mod deadline;
mod registry;
mod strategy;
mod traits;

#[cfg(test)]
mod tests;

pub use certificate_service::CertificateService;
pub use code_service::CodeService;
pub use config::VerificationServiceConfig;
pub use deadline::{Deadline, RetryPolicy};
pub use registry::{StrategyDependencies, StrategyRegistry};
pub use strategy::{ChannelStrategy, CodeSlots, EmailStrategy, PhoneStrategy, StrategyContext};
pub use traits::{ChannelTransport, CodeStore, CredentialDirectory};
