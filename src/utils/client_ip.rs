//! Client address resolution for click events.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Resolves the requester's IP address.
///
/// When `behind_proxy` is true, the first valid hop of `X-Forwarded-For` wins,
/// then `X-Real-IP`, then the socket peer. Otherwise forwarding headers are
/// ignored, since any client can set them.
pub fn client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    behind_proxy: bool,
) -> Option<String> {
    if behind_proxy {
        if let Some(ip) = forwarded_for(headers).or_else(|| real_ip(headers)) {
            return Some(ip.to_string());
        }
    }

    peer.map(|addr| addr.ip().to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get(X_FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .and_then(|hop| hop.trim().parse().ok())
}

fn real_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers.get(X_REAL_IP)?.to_str().ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.7:51234".parse().unwrap())
    }

    #[test]
    fn test_direct_uses_peer_and_ignores_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.9"));

        assert_eq!(client_ip(&headers, peer(), false).as_deref(), Some("10.0.0.7"));
    }

    #[test]
    fn test_proxy_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.9, 70.41.3.18, 150.172.238.178"),
        );
        headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.1"));

        assert_eq!(client_ip(&headers, peer(), true).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_proxy_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("garbage"));
        headers.insert(X_REAL_IP, HeaderValue::from_static("2001:db8::1"));

        assert_eq!(client_ip(&headers, peer(), true).as_deref(), Some("2001:db8::1"));
    }

    #[test]
    fn test_proxy_without_headers_uses_peer() {
        assert_eq!(
            client_ip(&HeaderMap::new(), peer(), true).as_deref(),
            Some("10.0.0.7")
        );
    }

    #[test]
    fn test_no_peer_no_headers() {
        assert_eq!(client_ip(&HeaderMap::new(), None, false), None);
    }
}
