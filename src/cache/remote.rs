use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use super::error::CacheError;

/// A shared key/value store holding the remote tier.
#[async_trait]
pub trait RemoteCache: Send + Sync {
    /// Round-trip check used to decide whether the tier is usable again.
    async fn ping(&self) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
