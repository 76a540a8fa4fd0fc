//! Session configuration.

use crate::error::{SessionError, SessionResult};
use serde::{Deserialize, Serialize};
use sessio_store::ConnConfig;
use std::time::Duration;

/// Random-byte length used when `session_id_length` is not positive.
pub const DEFAULT_SESSION_ID_LENGTH: i64 = 16;

/// Largest accepted `session_id_length`.
pub const MAX_SESSION_ID_LENGTH: i64 = 1024;

/// Largest accepted `cookie_lifetime` magnitude, in seconds (about 400 years).
pub const MAX_COOKIE_LIFETIME: i64 = 400 * 366 * 86_400;

/// Session configuration.
///
/// Field names on the wire match the established JSON configuration
/// format (`cookieName`, `maxLifetime`, `ConnConfig`, ...), so existing
/// configuration files deserialize unchanged. Missing fields take the
/// values from [`SessionConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Prefix prepended to every generated session ID
    #[serde(rename = "sidPrefix")]
    pub sid_prefix: String,
    /// Cookie (and form field) carrying the session ID
    #[serde(rename = "cookieName")]
    pub cookie_name: String,
    /// Whether the manager writes `Set-Cookie` and `P3P` on responses
    #[serde(rename = "enableSetCookie")]
    pub enable_set_cookie: bool,
    /// Fallback record lifetime in seconds
    #[serde(rename = "gclifetime")]
    pub gc_lifetime: i64,
    /// Record lifetime in seconds; falls back to `gc_lifetime` when not positive
    #[serde(rename = "maxLifetime")]
    pub max_lifetime: i64,
    /// Cookie `Secure` attribute
    pub secure: bool,
    /// Cookie `HttpOnly` attribute
    #[serde(rename = "httpOnly")]
    pub http_only: bool,
    /// Cookie `Expires` / `Max-Age` in seconds
    #[serde(rename = "cookieLifeTime")]
    pub cookie_lifetime: i64,
    /// Backend descriptor: `address[,poolSize[,password[,dbIndex]]]`
    #[serde(rename = "ConnConfig")]
    pub conn_config: String,
    /// Cookie `Domain` attribute
    pub domain: String,
    /// Number of random bytes in generated session IDs
    #[serde(rename = "sessionIDLength")]
    pub session_id_length: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sid_prefix: String::new(),
            cookie_name: String::new(),
            enable_set_cookie: false,
            gc_lifetime: 3600, // 1 hour
            max_lifetime: 0,
            secure: false,
            http_only: false,
            cookie_lifetime: 3600,
            conn_config: "127.0.0.1:6379".to_string(),
            domain: String::new(),
            session_id_length: DEFAULT_SESSION_ID_LENGTH,
        }
    }
}

impl SessionConfig {
    /// Create a configuration for the given cookie name.
    ///
    /// # Examples
    ///
    /// ```
    /// use sessio_session::SessionConfig;
    ///
    /// let config = SessionConfig::new("sess")
    ///     .with_sid_prefix("s_")
    ///     .with_session_id_length(4);
    /// assert_eq!(config.cookie_name, "sess");
    /// ```
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> SessionResult<Self> {
        serde_json::from_str(json).map_err(|e| SessionError::Config(e.to_string()))
    }

    /// Load configuration from `SESSION_*` environment variables.
    ///
    /// Unset or unparsable variables keep their default values.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("SESSION_COOKIE_NAME") {
            config.cookie_name = name;
        }

        if let Ok(prefix) = std::env::var("SESSION_SID_PREFIX") {
            config.sid_prefix = prefix;
        }

        if let Some(enabled) = env_flag("SESSION_ENABLE_SET_COOKIE") {
            config.enable_set_cookie = enabled;
        }

        if let Some(secs) = env_int("SESSION_GC_LIFETIME") {
            config.gc_lifetime = secs;
        }

        if let Some(secs) = env_int("SESSION_MAX_LIFETIME") {
            config.max_lifetime = secs;
        }

        if let Some(secs) = env_int("SESSION_COOKIE_LIFETIME") {
            config.cookie_lifetime = secs;
        }

        if let Some(secure) = env_flag("SESSION_SECURE") {
            config.secure = secure;
        }

        if let Some(http_only) = env_flag("SESSION_HTTP_ONLY") {
            config.http_only = http_only;
        }

        if let Ok(domain) = std::env::var("SESSION_DOMAIN") {
            config.domain = domain;
        }

        if let Some(len) = env_int("SESSION_ID_LENGTH") {
            config.session_id_length = len;
        }

        if let Ok(conn) = std::env::var("SESSION_CONN_CONFIG") {
            config.conn_config = conn;
        }

        config
    }

    /// Set the session ID prefix.
    pub fn with_sid_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sid_prefix = prefix.into();
        self
    }

    /// Allow or forbid writing response cookies.
    pub fn with_set_cookie(mut self, enabled: bool) -> Self {
        self.enable_set_cookie = enabled;
        self
    }

    /// Set the fallback record lifetime in seconds.
    pub fn with_gc_lifetime(mut self, secs: i64) -> Self {
        self.gc_lifetime = secs;
        self
    }

    /// Set the record lifetime in seconds.
    pub fn with_max_lifetime(mut self, secs: i64) -> Self {
        self.max_lifetime = secs;
        self
    }

    /// Set the cookie lifetime in seconds.
    pub fn with_cookie_lifetime(mut self, secs: i64) -> Self {
        self.cookie_lifetime = secs;
        self
    }

    /// Set the cookie `Secure` flag.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the cookie `HttpOnly` flag.
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set the cookie domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the number of random bytes in generated session IDs.
    pub fn with_session_id_length(mut self, len: i64) -> Self {
        self.session_id_length = len;
        self
    }

    /// Set the backend connection descriptor.
    pub fn with_conn_config(mut self, descriptor: impl Into<String>) -> Self {
        self.conn_config = descriptor.into();
        self
    }

    /// Validate and apply defaults.
    ///
    /// Fails when `cookie_name` is empty, when `session_id_length` exceeds
    /// [`MAX_SESSION_ID_LENGTH`], or when `cookie_lifetime` is beyond
    /// [`MAX_COOKIE_LIFETIME`] in either direction. A non-positive
    /// `max_lifetime` takes `gc_lifetime`, a non-positive
    /// `session_id_length` becomes [`DEFAULT_SESSION_ID_LENGTH`].
    pub fn normalized(mut self) -> SessionResult<Self> {
        if self.cookie_name.is_empty() {
            return Err(SessionError::Config("Invalid cookie name".to_string()));
        }

        if self.max_lifetime <= 0 {
            self.max_lifetime = self.gc_lifetime;
        }

        if self.session_id_length <= 0 {
            self.session_id_length = DEFAULT_SESSION_ID_LENGTH;
        } else if self.session_id_length > MAX_SESSION_ID_LENGTH {
            return Err(SessionError::Config(format!(
                "session ID length {} exceeds {}",
                self.session_id_length, MAX_SESSION_ID_LENGTH
            )));
        }

        if self.cookie_lifetime.unsigned_abs() > MAX_COOKIE_LIFETIME as u64 {
            return Err(SessionError::Config(format!(
                "cookie lifetime {}s is out of range",
                self.cookie_lifetime
            )));
        }

        Ok(self)
    }

    /// Lifetime applied to records in the backing store.
    pub fn record_ttl(&self) -> Duration {
        Duration::from_secs(self.max_lifetime.max(0) as u64)
    }

    /// Parse the backend connection descriptor.
    pub fn conn(&self) -> SessionResult<ConnConfig> {
        Ok(ConnConfig::parse(&self.conn_config)?)
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn env_int(name: &str) -> Option<i64> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cookie_name_rejected() {
        let err = SessionConfig::default()
            .with_sid_prefix("s_")
            .normalized()
            .unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
    }

    #[test]
    fn test_max_lifetime_falls_back_to_gc_lifetime() {
        let config = SessionConfig::new("sess")
            .with_gc_lifetime(900)
            .with_max_lifetime(0)
            .normalized()
            .unwrap();
        assert_eq!(config.max_lifetime, 900);
        assert_eq!(config.record_ttl(), Duration::from_secs(900));

        let config = SessionConfig::new("sess")
            .with_gc_lifetime(900)
            .with_max_lifetime(60)
            .normalized()
            .unwrap();
        assert_eq!(config.max_lifetime, 60);
    }

    #[test]
    fn test_session_id_length_default() {
        let config = SessionConfig::new("sess")
            .with_session_id_length(-3)
            .normalized()
            .unwrap();
        assert_eq!(config.session_id_length, DEFAULT_SESSION_ID_LENGTH);
    }

    #[test]
    fn test_oversized_session_id_length_rejected() {
        let err = SessionConfig::new("sess")
            .with_session_id_length(MAX_SESSION_ID_LENGTH + 1)
            .normalized()
            .unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));

        let config = SessionConfig::new("sess")
            .with_session_id_length(MAX_SESSION_ID_LENGTH)
            .normalized()
            .unwrap();
        assert_eq!(config.session_id_length, MAX_SESSION_ID_LENGTH);
    }

    #[test]
    fn test_out_of_range_cookie_lifetime_rejected() {
        let config = SessionConfig::from_json(r#"{"cookieName":"sess","cookieLifeTime":10000000000000}"#).unwrap();
        assert!(matches!(config.normalized(), Err(SessionError::Config(_))));

        let config = SessionConfig::new("sess").with_cookie_lifetime(i64::MIN);
        assert!(matches!(config.normalized(), Err(SessionError::Config(_))));

        let config = SessionConfig::new("sess").with_cookie_lifetime(MAX_COOKIE_LIFETIME);
        assert!(config.normalized().is_ok());
    }

    #[test]
    fn test_from_json_uses_wire_names() {
        let json = r#"{
            "sidPrefix": "app_",
            "cookieName": "gosessionid",
            "enableSetCookie": true,
            "gclifetime": 3600,
            "maxLifetime": 7200,
            "secure": true,
            "cookieLifeTime": 86400,
            "ConnConfig": "127.0.0.1:6379,10,pw,2",
            "domain": "example.com",
            "sessionIDLength": 24
        }"#;

        let config = SessionConfig::from_json(json).unwrap();
        assert_eq!(config.sid_prefix, "app_");
        assert_eq!(config.cookie_name, "gosessionid");
        assert!(config.enable_set_cookie);
        assert_eq!(config.max_lifetime, 7200);
        assert_eq!(config.cookie_lifetime, 86400);
        assert_eq!(config.domain, "example.com");
        assert_eq!(config.session_id_length, 24);
        assert!(!config.http_only);

        let conn = config.conn().unwrap();
        assert_eq!(conn.pool_size, 10);
        assert_eq!(conn.database, 2);
    }

    #[test]
    fn test_from_json_missing_fields_default() {
        let config = SessionConfig::from_json(r#"{"cookieName": "sess"}"#).unwrap();
        assert_eq!(config.cookie_name, "sess");
        assert_eq!(config.session_id_length, DEFAULT_SESSION_ID_LENGTH);
        assert!(!config.enable_set_cookie);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            SessionConfig::from_json("{not json"),
            Err(SessionError::Config(_))
        ));
    }
}
