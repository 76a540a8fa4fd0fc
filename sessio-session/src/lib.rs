//! Cookie-keyed sessions for sessio.
//!
//! A session is an opaque identifier, carried in a cookie or a same-named
//! form field, that keys a JSON mapping held in a TTL key-value store.
//! [`SessionManager`] resolves each request to a [`SessionRecord`]; the
//! handler reads and mutates the record and then persists it, or lets
//! [`SessionManager::scoped`] do so on its behalf.
//!
//! # Examples
//!
//! ```no_run
//! use sessio_session::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SessionError> {
//!     let config = SessionConfig::new("sess")
//!         .with_sid_prefix("s_")
//!         .with_set_cookie(true)
//!         .with_max_lifetime(3600)
//!         .with_conn_config("127.0.0.1:6379,10");
//!
//!     let manager = SessionManager::new(config).await?;
//!
//!     let mut request = HttpRequest::new("GET", "/");
//!     let mut response = HttpResponse::ok();
//!
//!     // Load or create the session
//!     let session = manager.start_session(&mut request, &mut response).await?;
//!     session.set("username", "alice");
//!     session.persist().await?;
//!
//!     // Logout
//!     manager.destroy_session(&mut request, &mut response).await;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cookie;
pub mod error;
pub mod manager;
pub mod record;
pub mod transport;

pub use config::{DEFAULT_SESSION_ID_LENGTH, MAX_COOKIE_LIFETIME, MAX_SESSION_ID_LENGTH, SessionConfig};
pub use cookie::{Cookie, parse_cookie_header};
pub use error::{SessionError, SessionResult};
pub use manager::{P3P_HEADER, P3P_POLICY, SessionManager};
pub use record::{RecordOrigin, SessionRecord};
pub use transport::{HttpRequest, HttpResponse, SessionRequest, SessionResponse};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::SessionConfig;
    pub use crate::cookie::Cookie;
    pub use crate::error::{SessionError, SessionResult};
    pub use crate::manager::SessionManager;
    pub use crate::record::{RecordOrigin, SessionRecord};
    pub use crate::transport::{HttpRequest, HttpResponse, SessionRequest, SessionResponse};
}
