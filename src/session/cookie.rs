use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use std::time::Duration;

pub const SESSION_COOKIE: &str = "relay.sid";

/// Find a cookie value across all `Cookie` headers.
pub fn read<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"'))
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value carrying a signed session id.
pub fn issue(value: &str, secure: bool, max_age: Duration) -> HeaderValue {
    build(value, secure, max_age.as_secs())
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear(secure: bool) -> HeaderValue {
    build("", secure, 0)
}

/// Header map holding just a `Set-Cookie` entry, for response tuples.
pub fn set_header(value: HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, value);
    headers
}

fn build(value: &str, secure: bool, max_age: u64) -> HeaderValue {
    let mut cookie =
        format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    // Signed ids are base64url, so the value is always a valid header.
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("relay.sid=; Max-Age=0"))
}
