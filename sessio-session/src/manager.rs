//! Session lifecycle: resolving requests to records, issuing and expiring
//! cookies.

use crate::config::SessionConfig;
use crate::cookie::Cookie;
use crate::error::SessionResult;
use crate::record::{RecordOrigin, SessionRecord, decode_values};
use crate::transport::{SessionRequest, SessionResponse};
use chrono::Utc;
use rand::RngCore;
use sessio_store::{BackingStore, RedisStore};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Compact privacy policy sent alongside session cookies.
pub const P3P_HEADER: &str = "P3P";
pub const P3P_POLICY: &str = "IDC DSP COR ADM DEVi TAIi PSA PSD IVAi IVDi CONi HIS OUR IND CNT";

/// How far in the past a destroy cookie's `Expires` is set.
const EXPIRED_COOKIE_OFFSET_SECS: i64 = 600;

/// Resolves requests to session records.
///
/// Each manager owns its configuration and store, so several managers with
/// different cookie names or backends can run side by side.
///
/// # Examples
///
/// ```no_run
/// use sessio_session::{HttpRequest, HttpResponse, SessionConfig, SessionManager};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SessionConfig::new("sess")
///     .with_sid_prefix("s_")
///     .with_set_cookie(true)
///     .with_conn_config("127.0.0.1:6379,10");
/// let manager = SessionManager::new(config).await?;
///
/// let mut req = HttpRequest::new("GET", "/");
/// let mut resp = HttpResponse::ok();
/// let session = manager.start_session(&mut req, &mut resp).await?;
/// session.set("user_id", 123);
/// session.persist().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionManager {
    config: Arc<SessionConfig>,
    store: Arc<dyn BackingStore>,
}

impl SessionManager {
    /// Validate `config` and connect to the Redis backend it describes.
    pub async fn new(config: SessionConfig) -> SessionResult<Self> {
        let config = config.normalized()?;
        let store = RedisStore::connect(config.conn()?).await?;
        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
        })
    }

    /// Validate `config` and use an already-built store.
    pub fn with_store(config: SessionConfig, store: Arc<dyn BackingStore>) -> SessionResult<Self> {
        let config = config.normalized()?;
        Ok(Self {
            config: Arc::new(config),
            store,
        })
    }

    /// The normalized configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn BackingStore> {
        &self.store
    }

    /// Resolve the request's session, creating one when needed.
    ///
    /// An identifier from the cookie (or, failing that, the same-named
    /// form field) that exists in the store is loaded as-is. Anything else
    /// gets a freshly generated identifier and a new cookie.
    pub async fn start_session<Req, Resp>(
        &self,
        request: &mut Req,
        response: &mut Resp,
    ) -> SessionResult<SessionRecord>
    where
        Req: SessionRequest + ?Sized,
        Resp: SessionResponse + ?Sized,
    {
        let candidate = self.request_sid(request)?;

        if let Some(sid) = candidate.as_deref().filter(|s| !s.is_empty()) {
            if self.exists(sid).await {
                debug!(sid = %sid, "Resuming session");
                return self.load(sid).await;
            }
            debug!(sid = %sid, "Unknown session ID, issuing a new one");
        }

        let sid = self.generate_sid();
        let record = self.load(&sid).await?;

        let cookie = self.session_cookie(&sid);
        if self.config.enable_set_cookie {
            response.set_header(P3P_HEADER, P3P_POLICY);
            response.set_cookie(&cookie);
        }
        request.add_cookie(&cookie);

        debug!(sid = %sid, "Started new session");
        Ok(record)
    }

    /// Remove the request's session from the store and expire its cookie.
    ///
    /// Best-effort: store failures are logged, never returned. A request
    /// without a session cookie is left alone.
    pub async fn destroy_session<Req, Resp>(&self, request: &mut Req, response: &mut Resp)
    where
        Req: SessionRequest + ?Sized,
        Resp: SessionResponse + ?Sized,
    {
        let Some(cookie) = request.cookie(&self.config.cookie_name) else {
            return;
        };
        if cookie.value.is_empty() {
            return;
        }

        let sid = unescape(&cookie.value);
        if let Err(e) = self.store.del(&sid).await {
            warn!(sid = %sid, error = %e, "Failed to delete session");
        }

        if self.config.enable_set_cookie {
            response.set_header(P3P_HEADER, P3P_POLICY);
            response.set_cookie(&self.expired_cookie());
        }
    }

    /// Run `handler` with the request's session and persist it afterwards.
    ///
    /// The record is persisted only when the handler returns `Ok`; a
    /// handler error is passed through and nothing is written.
    pub async fn scoped<Req, Resp, F, Fut, T, E>(
        &self,
        request: &mut Req,
        response: &mut Resp,
        handler: F,
    ) -> Result<T, E>
    where
        Req: SessionRequest + ?Sized,
        Resp: SessionResponse + ?Sized,
        F: FnOnce(Arc<SessionRecord>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<crate::error::SessionError>,
    {
        let record = Arc::new(self.start_session(request, response).await?);
        let output = handler(record.clone()).await?;
        record.persist().await?;
        Ok(output)
    }

    /// Generate a new identifier: the prefix followed by hex-encoded random
    /// bytes from the thread-local CSPRNG.
    pub fn generate_sid(&self) -> String {
        let mut bytes = vec![0u8; self.config.session_id_length as usize];
        rand::rng().fill_bytes(&mut bytes);
        format!("{}{}", self.config.sid_prefix, hex::encode(bytes))
    }

    /// Materialize the record stored under `sid`.
    ///
    /// A missing entry yields an empty record. A payload that cannot be
    /// decoded also yields an empty record, marked
    /// [`RecordOrigin::Corrupted`] and logged.
    pub async fn load(&self, sid: &str) -> SessionResult<SessionRecord> {
        let payload = self.store.get(sid).await?;

        let (values, origin) = match payload {
            None => (HashMap::new(), RecordOrigin::Fresh),
            Some(bytes) if bytes.is_empty() => (HashMap::new(), RecordOrigin::Fresh),
            Some(bytes) => match decode_values(&bytes) {
                Ok(values) => (values, RecordOrigin::Loaded),
                Err(e) => {
                    warn!(sid = %sid, error = %e, "Discarding undecodable session payload");
                    (HashMap::new(), RecordOrigin::Corrupted)
                }
            },
        };

        Ok(SessionRecord::new(
            sid.to_string(),
            values,
            self.config.record_ttl(),
            origin,
            self.store.clone(),
        ))
    }

    /// Whether the store holds `sid`. Store failures count as absent.
    pub async fn exists(&self, sid: &str) -> bool {
        match self.store.exists(sid).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(sid = %sid, error = %e, "Session lookup failed");
                false
            }
        }
    }

    fn request_sid<Req>(&self, request: &Req) -> SessionResult<Option<String>>
    where
        Req: SessionRequest + ?Sized,
    {
        let name = &self.config.cookie_name;
        match request.cookie(name) {
            Some(cookie) if !cookie.value.is_empty() && !cookie.is_expired() => {
                Ok(Some(unescape(&cookie.value)))
            }
            _ => request.form_value(name),
        }
    }

    fn session_cookie(&self, sid: &str) -> Cookie {
        let lifetime = self.config.cookie_lifetime;
        Cookie {
            name: self.config.cookie_name.clone(),
            value: urlencoding::encode(sid).into_owned(),
            path: Some("/".to_string()),
            domain: non_empty(&self.config.domain),
            expires: chrono::Duration::try_seconds(lifetime)
                .and_then(|d| Utc::now().checked_add_signed(d)),
            max_age: lifetime,
            secure: self.config.secure,
            http_only: self.config.http_only,
        }
    }

    fn expired_cookie(&self) -> Cookie {
        Cookie {
            name: self.config.cookie_name.clone(),
            value: String::new(),
            path: Some("/".to_string()),
            domain: non_empty(&self.config.domain),
            expires: chrono::Duration::try_seconds(EXPIRED_COOKIE_OFFSET_SECS)
                .and_then(|d| Utc::now().checked_sub_signed(d)),
            max_age: -1,
            secure: self.config.secure,
            http_only: self.config.http_only,
        }
    }
}

fn unescape(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
