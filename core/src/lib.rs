//! # Verification Core
//!
//! Issues one-time codes over email and phone, verifies them, and resolves
//! the verified destination to an existing or newly created credential.
//! This crate holds the domain entities, the error taxonomy, the collaborator
//! traits and the strategy-dispatch services; concrete stores, transports
//! and the directory client live in the infrastructure crate.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
