//! Shared configuration and utilities for the verification code workspace
//!
//! This crate provides functionality used by both the core and the
//! infrastructure layers:
//! - Configuration types loaded from the environment
//! - Destination validation (phone numbers, email addresses)
//! - Masking helpers for logging destinations safely

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CodeStoreKind, DirectoryConfig, Environment, LogFormat,
    LoggingConfig, VerificationConfig,
};
pub use utils::{email, phone};
