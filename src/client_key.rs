//! Derivation of the rate limit subject from the caller's network address.

use axum::http::HeaderMap;
use std::fmt;
use std::net::SocketAddr;

/// Opaque rate limit subject. Stable for the lifetime of one client
/// connection; never persisted beyond the store's own expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(String);

impl ClientKey {
    /// Forwarded headers take precedence over the socket peer so the key
    /// tracks the original caller when the service sits behind a proxy.
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        Self::from_ip(&client_ip(headers, peer))
    }

    pub fn from_ip(ip: &str) -> Self {
        ClientKey(sanitize(ip))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Best-effort client address: `X-Forwarded-For` (first entry), then
/// `X-Real-IP`, then the connection peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

/// The key ends up inside a Redis key; anything outside a safe set is
/// replaced.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ':' | '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
