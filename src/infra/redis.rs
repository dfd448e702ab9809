//! Redis-backed remote tier of the listing cache.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tokio::sync::Mutex;

use crate::cache::{CacheError, RemoteCache};

/// Holds a lazily established connection manager. The first operation
/// connects; the manager reconnects on its own afterwards.
pub struct RedisCache {
    client: Client,
    connection: Mutex<Option<ConnectionManager>>,
}

impl RedisCache {
    /// Parse `url` without connecting.
    pub fn open(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(CacheError::unavailable)?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let mut slot = self.connection.lock().await;
        if let Some(connection) = slot.as_ref() {
            return Ok(connection.clone());
        }
        // Outer operation timeouts bound the wait; one retry keeps a dead
        // server from stalling the probe.
        let config = ConnectionManagerConfig::new().set_number_of_retries(1);
        let connection = self
            .client
            .get_connection_manager_with_config(config)
            .await
            .map_err(CacheError::unavailable)?;
        *slot = Some(connection.clone());
        Ok(connection)
    }
}

#[async_trait]
impl RemoteCache for RedisCache {
    async fn ping(&self) -> Result<(), CacheError> {
        let mut connection = self.connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(CacheError::operation)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut connection = self.connection().await?;
        let value: Option<Vec<u8>> = connection.get(key).await.map_err(CacheError::operation)?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection().await?;
        let seconds = ttl.as_secs().max(1);
        let _: () = connection
            .set_ex(key, value.as_ref(), seconds)
            .await
            .map_err(CacheError::operation)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut connection = self.connection().await?;
        let _: () = connection.del(key).await.map_err(CacheError::operation)?;
        Ok(())
    }
}
