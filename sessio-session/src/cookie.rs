//! Session cookies.

use chrono::{DateTime, Utc};

/// `Expires` attribute format (IMF-fixdate).
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// An HTTP cookie as read from a request or written to a response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value, already escaped for the wire
    pub value: String,
    /// `Path` attribute
    pub path: Option<String>,
    /// `Domain` attribute
    pub domain: Option<String>,
    /// `Expires` attribute
    pub expires: Option<DateTime<Utc>>,
    /// `Max-Age` in seconds: zero means unset, negative means delete now
    pub max_age: i64,
    /// `Secure` attribute
    pub secure: bool,
    /// `HttpOnly` attribute
    pub http_only: bool,
}

impl Cookie {
    /// Create a cookie with only a name and value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Whether the cookie is marked for immediate deletion.
    pub fn is_expired(&self) -> bool {
        self.max_age < 0
    }

    /// Render the cookie as a `Set-Cookie` header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use sessio_session::Cookie;
    ///
    /// let mut cookie = Cookie::new("sess", "abc");
    /// cookie.path = Some("/".to_string());
    /// cookie.max_age = 60;
    /// assert_eq!(cookie.to_header_value(), "sess=abc; Path=/; Max-Age=60");
    /// ```
    pub fn to_header_value(&self) -> String {
        let mut header = format!("{}={}", self.name, self.value);

        if let Some(ref path) = self.path {
            header.push_str(&format!("; Path={}", path));
        }

        if let Some(ref domain) = self.domain {
            header.push_str(&format!("; Domain={}", domain.trim_start_matches('.')));
        }

        if let Some(expires) = self.expires {
            header.push_str(&format!("; Expires={}", expires.format(EXPIRES_FORMAT)));
        }

        if self.max_age > 0 {
            header.push_str(&format!("; Max-Age={}", self.max_age));
        } else if self.max_age < 0 {
            header.push_str("; Max-Age=0");
        }

        if self.http_only {
            header.push_str("; HttpOnly");
        }

        if self.secure {
            header.push_str("; Secure");
        }

        header
    }

    /// Render the cookie as a `name=value` pair for a `Cookie` request header.
    pub fn to_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Parse a `Cookie` request header into name/value pairs, in order.
///
/// Double quotes around a value are stripped. Pairs without `=` or with an
/// empty name are skipped.
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_full_header_value() {
        let cookie = Cookie {
            name: "sess".to_string(),
            value: "s_00ff".to_string(),
            path: Some("/".to_string()),
            domain: Some("example.com".to_string()),
            expires: Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()),
            max_age: 3600,
            secure: true,
            http_only: false,
        };

        assert_eq!(
            cookie.to_header_value(),
            "sess=s_00ff; Path=/; Domain=example.com; Expires=Fri, 02 Jan 2026 03:04:05 GMT; Max-Age=3600; Secure"
        );
    }

    #[test]
    fn test_negative_max_age_renders_zero() {
        let mut cookie = Cookie::new("sess", "");
        cookie.max_age = -1;
        assert!(cookie.is_expired());
        assert_eq!(cookie.to_header_value(), "sess=; Max-Age=0");
    }

    #[test]
    fn test_http_only() {
        let mut cookie = Cookie::new("sess", "v");
        cookie.http_only = true;
        assert_eq!(cookie.to_header_value(), "sess=v; HttpOnly");
    }

    #[test]
    fn test_parse_cookie_header() {
        let pairs = parse_cookie_header(r#"a=1; sess="s_ab"; junk; =x; b = 2"#);
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("sess".to_string(), "s_ab".to_string()),
                ("b".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_empty_header() {
        assert!(parse_cookie_header("").is_empty());
    }
}
