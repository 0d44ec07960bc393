//! Code store backends
//!
//! Both stores implement [`vc_core::services::verification::CodeStore`]:
//! Redis for deployments with more than one replica, an in-memory map for
//! development and tests.

pub mod memory_code_store;
#[cfg(feature = "redis-cache")]
pub mod redis_client;
#[cfg(feature = "redis-cache")]
pub mod redis_code_store;

pub use memory_code_store::MemoryCodeStore;
#[cfg(feature = "redis-cache")]
pub use redis_client::RedisClient;
#[cfg(feature = "redis-cache")]
pub use redis_code_store::RedisCodeStore;

// Re-export commonly used types
pub use vc_shared::config::cache::CacheConfig;

/// Whole seconds covering `ttl`, at least one
pub(crate) fn ttl_seconds(ttl: std::time::Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}
