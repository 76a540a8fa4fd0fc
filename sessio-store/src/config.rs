//! Connection descriptor for the backing store.
//!
//! Descriptors are comma-delimited and positional:
//!
//! ```text
//! address[,poolSize[,password[,dbIndex]]]
//! ```
//!
//! Trailing fields are optional. An unparsable or non-positive pool size
//! falls back to [`DEFAULT_POOL_SIZE`], an unparsable database index falls
//! back to `0`, and an empty password means no `AUTH`.

use std::time::Duration;
use url::Url;

use crate::{Result, StoreError};

/// Pool size used when the descriptor omits it or gives a bad value.
pub const DEFAULT_POOL_SIZE: u32 = 1;

/// Parsed connection descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnConfig {
    /// `host:port`, or a full `redis://` / `rediss://` URL.
    pub address: String,
    /// Upper bound on pooled connections.
    pub pool_size: u32,
    /// Password sent with `AUTH`.
    pub password: Option<String>,
    /// Logical database selected on connect.
    pub database: i64,
    /// How long acquiring a pooled connection may wait.
    pub connection_timeout: Duration,
}

fn default_connection_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for ConnConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:6379".to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            password: None,
            database: 0,
            connection_timeout: default_connection_timeout(),
        }
    }
}

impl ConnConfig {
    /// Parse a `address[,poolSize[,password[,dbIndex]]]` descriptor.
    ///
    /// # Examples
    ///
    /// ```
    /// use sessio_store::ConnConfig;
    ///
    /// let conn = ConnConfig::parse("127.0.0.1:6379,8,secret,2").unwrap();
    /// assert_eq!(conn.pool_size, 8);
    /// assert_eq!(conn.password.as_deref(), Some("secret"));
    /// assert_eq!(conn.database, 2);
    /// ```
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut fields = descriptor.split(',');

        let address = fields.next().unwrap_or_default().trim();
        if address.is_empty() {
            return Err(StoreError::Config(
                "connection descriptor has no address".to_string(),
            ));
        }

        let pool_size = fields
            .next()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(DEFAULT_POOL_SIZE);

        let password = fields
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let database = fields
            .next()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);

        Ok(Self {
            address: address.to_string(),
            pool_size,
            password,
            database,
            ..Default::default()
        })
    }

    /// Set the pool acquisition timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Get the full Redis URL with auth and database.
    pub fn connection_url(&self) -> Result<String> {
        let base = if self.address.starts_with("redis://") || self.address.starts_with("rediss://")
        {
            self.address.clone()
        } else {
            format!("redis://{}", self.address)
        };

        let mut url = Url::parse(&base)
            .map_err(|e| StoreError::Config(format!("invalid address '{}': {}", self.address, e)))?;

        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| StoreError::Config("address cannot carry a password".to_string()))?;
        }

        url.set_path(&format!("/{}", self.database));

        Ok(url.to_string())
    }
}

impl std::str::FromStr for ConnConfig {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
