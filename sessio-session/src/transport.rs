//! HTTP boundary used by the session manager.
//!
//! The manager only needs to read one cookie and one form field, and to
//! write one header and one cookie. [`SessionRequest`] and
//! [`SessionResponse`] capture that surface so any server framework can
//! plug in; [`HttpRequest`] and [`HttpResponse`] are plain implementations.

use crate::cookie::{Cookie, parse_cookie_header};
use crate::error::{SessionError, SessionResult};
use std::collections::HashMap;

/// Request side of the session boundary.
pub trait SessionRequest {
    /// First cookie named `name`, if present.
    fn cookie(&self, name: &str) -> Option<Cookie>;

    /// Form or query field named `name`.
    fn form_value(&self, name: &str) -> SessionResult<Option<String>>;

    /// Make `cookie` visible to later readers of this request.
    fn add_cookie(&mut self, cookie: &Cookie);
}

/// Response side of the session boundary.
pub trait SessionResponse {
    /// Set `name` to `value`, replacing any previous value.
    fn set_header(&mut self, name: &str, value: &str);

    /// Append a `Set-Cookie` header.
    fn set_cookie(&mut self, cookie: &Cookie);
}

/// Minimal HTTP request.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub query_params: HashMap<String, String>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Add a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    /// Set an `application/x-www-form-urlencoded` body.
    pub fn with_form_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Get a query parameter.
    pub fn query(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    fn is_form_body(&self) -> bool {
        self.header("Content-Type")
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false)
    }
}

impl SessionRequest for HttpRequest {
    fn cookie(&self, name: &str) -> Option<Cookie> {
        let header = self.header("Cookie")?;
        parse_cookie_header(header)
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(n, v)| Cookie::new(n, v))
    }

    fn form_value(&self, name: &str) -> SessionResult<Option<String>> {
        // Body fields shadow query fields
        if self.is_form_body() && !self.body.is_empty() {
            let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(&self.body)
                .map_err(|e| SessionError::Request(e.to_string()))?;
            if let Some((_, value)) = fields.into_iter().find(|(k, _)| k == name) {
                return Ok(Some(value));
            }
        }

        Ok(self.query(name).cloned())
    }

    fn add_cookie(&mut self, cookie: &Cookie) {
        let pair = cookie.to_pair();
        let key = self
            .headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case("Cookie"))
            .cloned()
            .unwrap_or_else(|| "Cookie".to_string());

        let existing = self.headers.entry(key).or_default();
        let mut replaced = false;
        let mut pairs: Vec<String> = Vec::new();
        for segment in existing.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let name = segment.split_once('=').map_or(segment, |(n, _)| n).trim();
            if name == cookie.name {
                // One pair per name
                if !replaced {
                    pairs.push(pair.clone());
                    replaced = true;
                }
            } else {
                pairs.push(segment.to_string());
            }
        }
        if !replaced {
            pairs.push(pair);
        }
        *existing = pairs.join("; ");
    }
}

/// Minimal HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    /// `Set-Cookie` values, kept apart since a response may carry several
    pub cookies: Vec<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            cookies: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    /// `Set-Cookie` values written so far.
    pub fn set_cookie_headers(&self) -> &[String] {
        &self.cookies
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::ok()
    }
}

impl SessionResponse for HttpResponse {
    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    fn set_cookie(&mut self, cookie: &Cookie) {
        self.cookies.push(cookie.to_header_value());
    }
}
