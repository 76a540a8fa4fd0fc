// Sessio - cookie-keyed HTTP sessions backed by a TTL key-value store
//
// Re-exports the session lifecycle crate and the backing-store crate so
// applications depend on a single package.

// Re-export session functionality
pub use sessio_session::*;

// Re-export the backing store
pub use sessio_store;
pub use sessio_store::{BackingStore, ConnConfig, MemoryStore, RedisStore, StoreError};

// Re-export for handler code
pub use serde_json;
pub use tokio;

/// Prelude for common imports.
pub mod prelude {
    pub use sessio_session::prelude::*;
    pub use sessio_store::prelude::{BackingStore, ConnConfig, MemoryStore, RedisStore, StoreError};
}
