//! Redis-backed code store

use async_trait::async_trait;
use std::time::Duration;

use vc_core::errors::CollaboratorError;
use vc_core::services::verification::CodeStore;

use super::{ttl_seconds, RedisClient};

/// [`CodeStore`] over a shared Redis instance
///
/// Expiry is enforced by Redis itself, so every replica sees the same codes
/// and counters.
#[derive(Clone)]
pub struct RedisCodeStore {
    client: RedisClient,
}

impl RedisCodeStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }
}

#[async_trait]
impl CodeStore for RedisCodeStore {
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CollaboratorError> {
        Ok(self.client.set_with_expiry(key, value, ttl_seconds(ttl)).await?)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CollaboratorError> {
        Ok(self.client.get(key).await?)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool, CollaboratorError> {
        Ok(self.client.compare_and_delete(key, expected).await?)
    }

    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CollaboratorError> {
        let count = self.client.increment(key, ttl_seconds(ttl)).await?;
        u64::try_from(count)
            .map_err(|_| CollaboratorError::Rejected(format!("counter {} holds a negative value", key)))
    }

    async fn delete(&self, key: &str) -> Result<bool, CollaboratorError> {
        Ok(self.client.delete(key).await?)
    }
}
