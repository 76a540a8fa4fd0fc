//! # Sessio Store
//!
//! The backing-store side of sessio sessions: a small async contract
//! (`GET`, `SETEX`, `EXISTS`, `DEL`) and two implementations.
//!
//! ## Features
//!
//! - **Connection Pooling**: Bounded bb8 pool of multiplexed Redis connections
//! - **Descriptor Parsing**: `address[,poolSize[,password[,dbIndex]]]` strings
//! - **In-Memory Store**: TTL-aware [`MemoryStore`] for tests and local runs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sessio_store::{BackingStore, ConnConfig, RedisStore};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let conn = ConnConfig::parse("127.0.0.1:6379,10,,1")?;
//!     let store = RedisStore::connect(conn).await?;
//!
//!     store.set_ex("sid_abc", br#"{"user":1}"#, Duration::from_secs(3600)).await?;
//!     let payload = store.get("sid_abc").await?;
//!
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod memory;
mod store;

pub use config::{ConnConfig, DEFAULT_POOL_SIZE};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use store::{BackingStore, RedisPool, RedisStore};

// Re-export redis crate for convenience
pub use redis;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::config::ConnConfig;
    pub use crate::error::{Result, StoreError};
    pub use crate::memory::MemoryStore;
    pub use crate::store::{BackingStore, RedisStore};
}
