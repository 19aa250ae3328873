use std::net::SocketAddr;
use std::time::{Duration, UNIX_EPOCH};

use anyhow::{Result, anyhow};
use hyper::Request;
use hyper::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Peer address of the TCP connection, inserted by the accept loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub SocketAddr);

/// Extract a header value as a string
pub fn get_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Every `name=value` pair across all `Cookie` headers.
fn cookie_pairs(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> {
    headers
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then_some((name, value.trim()))
        })
}

/// Extract cookie value by name
pub fn get_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let found = cookie_pairs(headers)
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.to_string());

    if found.is_some() {
        debug!("Cookie found: {}", cookie_name);
    }
    found
}

/// Names of all cookies the client presented, without duplicates.
pub fn cookie_names(headers: &HeaderMap) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (name, _) in cookie_pairs(headers) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Set a cookie with options. `SameSite=Strict` is always applied.
pub fn set_cookie(
    name: &str,
    value: &str,
    max_age: Option<Duration>,
    path: Option<&str>,
    http_only: bool,
    secure: bool,
) -> Result<HeaderValue> {
    let mut cookie = format!("{}={}", name, value);

    if let Some(age) = max_age {
        cookie.push_str(&format!("; Max-Age={}", age.as_secs()));
        if age.is_zero() {
            cookie.push_str(&format!("; Expires={}", httpdate::fmt_http_date(UNIX_EPOCH)));
        }
    }

    if let Some(p) = path {
        cookie.push_str(&format!("; Path={}", p));
    }

    if http_only {
        cookie.push_str("; HttpOnly");
    }

    if secure {
        cookie.push_str("; Secure");
    }

    cookie.push_str("; SameSite=Strict");

    debug!("Setting cookie: {}", name);

    HeaderValue::from_str(&cookie).map_err(|e| {
        warn!("Failed to create cookie header for {}: {}", name, e);
        anyhow!("Invalid cookie value: {}", e)
    })
}

/// The session cookie: HttpOnly, whole site, lives as long as the token.
pub fn session_cookie(token: &str, max_age: Duration, secure: bool) -> Result<HeaderValue> {
    set_cookie(TOKEN_COOKIE, token, Some(max_age), Some("/"), true, secure)
}

/// Delete a cookie by setting it to expire
pub fn delete_cookie(name: &str, secure: bool) -> Result<HeaderValue> {
    debug!("Deleting cookie: {}", name);
    set_cookie(name, "", Some(Duration::ZERO), Some("/"), true, secure)
}

/// Client address used to key rate limits.
///
/// Forwarding headers are only consulted when the deployment says a proxy
/// in front of us overwrites them; otherwise anyone could pick their own key.
pub fn client_ip<B>(req: &Request<B>, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(forwarded) = get_header_value(req.headers(), "x-forwarded-for") {
            if let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty()) {
                return first.to_string();
            }
        }

        if let Some(real_ip) = get_header_value(req.headers(), "x-real-ip") {
            let real_ip = real_ip.trim();
            if !real_ip.is_empty() {
                return real_ip.to_string();
            }
        }
    }

    req.extensions()
        .get::<ClientAddr>()
        .map(|addr| addr.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Extract bearer token from Authorization header
/// Format: "Authorization: Bearer <token>"
pub fn get_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = get_header_value(headers, "authorization")?;
    let (scheme, token) = auth.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim().to_string())
    } else {
        None
    }
}

/// The session token: the `token` cookie first, then a Bearer header.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = get_cookie(headers, TOKEN_COOKIE).filter(|t| !t.is_empty()) {
        return Some(token);
    }

    let bearer = get_bearer_token(headers);
    if bearer.is_some() {
        debug!("Using session token from Bearer header");
    }
    bearer
}
