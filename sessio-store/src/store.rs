//! Backing-store contract and the Redis implementation.

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use bb8_redis::RedisConnectionManager;
use std::time::Duration;
use tracing::{debug, info};

use crate::{ConnConfig, Result, StoreError};

/// Bounded pool of multiplexed Redis connections.
pub type RedisPool = Pool<RedisConnectionManager>;

/// Keyed byte-string storage with per-key expiry.
///
/// This is the whole surface a session manager needs from its store:
/// `GET`, `SETEX`, `EXISTS` and `DEL`. Implementations must be shareable
/// across request tasks.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Fetch the payload stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Whether `key` currently holds a live value.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn del(&self, key: &str) -> Result<()>;
}

/// Redis-backed store using a bounded bb8 pool.
///
/// Acquiring a connection beyond the pool size waits for one to be
/// released, up to the configured connection timeout.
///
/// # Examples
///
/// ```no_run
/// use sessio_store::{BackingStore, ConnConfig, RedisStore};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = RedisStore::connect(ConnConfig::parse("127.0.0.1:6379,10")?).await?;
/// store.set_ex("greeting", b"hello", Duration::from_secs(60)).await?;
/// assert!(store.exists("greeting").await?);
/// # Ok(())
/// # }
/// ```
pub struct RedisStore {
    pool: RedisPool,
}

impl RedisStore {
    /// Build the pool described by `config` and verify it answers.
    ///
    /// The pool holds at most `pool_size` connections, opened against the
    /// configured address, password and database. Construction fails
    /// unless one connection can be checked out within
    /// `connection_timeout` and answers `PING`.
    pub async fn connect(config: ConnConfig) -> Result<Self> {
        let url = config.connection_url()?;
        let manager =
            RedisConnectionManager::new(url).map_err(|e| StoreError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        {
            let mut conn = pool.get().await?;
            let pong: String = redis::cmd("PING")
                .query_async(&mut *conn)
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            debug!(reply = %pong, "store answered PING");
        }

        info!(
            address = %config.address,
            pool_size = config.pool_size,
            database = config.database,
            "session store connected"
        );

        Ok(Self { pool })
    }

    async fn conn(&self) -> Result<PooledConnection<'_, RedisConnectionManager>> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl BackingStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut *conn).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(ttl.as_secs())
            .arg(value)
            .query_async(&mut *conn)
            .await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        let exists: bool = redis::cmd("EXISTS").arg(key).query_async(&mut *conn).await?;
        Ok(exists)
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: u64 = redis::cmd("DEL").arg(key).query_async(&mut *conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_basic_operations() {
        let config = ConnConfig::parse("127.0.0.1:6379,2").unwrap();
        let store = RedisStore::connect(config).await.unwrap();

        store
            .set_ex("sessio_test_key", b"value", Duration::from_secs(30))
            .await
            .unwrap();
        assert!(store.exists("sessio_test_key").await.unwrap());
        assert_eq!(
            store.get("sessio_test_key").await.unwrap(),
            Some(b"value".to_vec())
        );

        store.del("sessio_test_key").await.unwrap();
        assert!(!store.exists("sessio_test_key").await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_server_fails() {
        let config = ConnConfig::parse("127.0.0.1:1")
            .unwrap()
            .with_connection_timeout(Duration::from_millis(200));
        assert!(RedisStore::connect(config).await.is_err());
    }
}
