//! Cookie plumbing between HTTP headers and the gatekeeper.
//!
//! Reading parses every `Cookie` request header into a name→value map. Writing renders
//! the provider's `CookieMutation`s as `Set-Cookie` header values.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue},
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Attributes of a `Set-Cookie` header. Defaults to a host-wide, `HttpOnly`, `Lax` cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub path: String,
    pub max_age: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            max_age: None,
            expires: None,
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

/// CookieMutation
///
/// A cookie the session provider wants written onto the outgoing response, typically
/// a refreshed access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieMutation {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

impl CookieMutation {
    pub fn new(name: impl Into<String>, value: impl Into<String>, options: CookieOptions) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            options,
        }
    }

    /// A mutation that deletes `name` in the browser.
    pub fn removal(name: impl Into<String>, secure: bool) -> Self {
        Self::new(
            name,
            "",
            CookieOptions {
                max_age: Some(0),
                secure,
                ..CookieOptions::default()
            },
        )
    }

    /// Renders the `Set-Cookie` value, e.g. `sb-access-token=abc; Path=/; Max-Age=3600; HttpOnly; SameSite=Lax`.
    pub fn to_set_cookie(&self) -> String {
        let mut cookie = format!("{}={}; Path={}", self.name, self.value, self.options.path);
        if let Some(max_age) = self.options.max_age {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }
        if let Some(expires) = self.options.expires {
            cookie.push_str(&format!(
                "; Expires={}",
                expires.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        if self.options.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.options.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; SameSite=");
        cookie.push_str(self.options.same_site.as_str());
        cookie
    }

    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.to_set_cookie())
    }
}

/// Collects every `name=value` pair from all `Cookie` headers.
///
/// Pairs without `=` or with an empty name are skipped. When a name repeats, the first
/// occurrence wins, matching how browsers order the more specific cookie first.
pub fn parse_cookie_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((name, val)) = pair.trim().split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            cookies
                .entry(name.to_string())
                .or_insert_with(|| val.trim().trim_matches('"').to_string());
        }
    }
    cookies
}
