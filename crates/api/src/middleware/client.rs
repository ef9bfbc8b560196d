//! Client provenance recorded on new sessions.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::auth::service::ClientInfo;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Client IP, user agent and device description of the current request.
///
/// Never rejects; fields the request does not reveal are `None`.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta(pub ClientInfo);

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientMeta(client_info(&parts.headers, peer)))
    }
}

pub fn client_info(headers: &HeaderMap, peer: Option<SocketAddr>) -> ClientInfo {
    let ip_address = client_ip(headers, peer);
    let user_agent = header_str(headers, USER_AGENT.as_str()).map(str::to_string);
    let device_info = ip_address
        .as_ref()
        .map(|ip| format!("Device accessing from {ip}"));

    ClientInfo {
        ip_address,
        user_agent,
        device_info,
    }
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = header_str(headers, X_FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| header_str(headers, X_REAL_IP).map(str::trim).filter(|v| !v.is_empty()))
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn peer() -> Option<SocketAddr> {
        Some("10.1.2.3:54321".parse().unwrap())
    }

    #[test]
    fn forwarded_for_first_hop_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("198.51.100.4, 10.0.0.1"));
        headers.insert(X_REAL_IP, HeaderValue::from_static("192.0.2.9"));

        assert_eq!(client_ip(&headers, peer()).as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn real_ip_then_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, HeaderValue::from_static("192.0.2.9"));
        assert_eq!(client_ip(&headers, peer()).as_deref(), Some("192.0.2.9"));

        assert_eq!(client_ip(&HeaderMap::new(), peer()).as_deref(), Some("10.1.2.3"));
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }

    #[test]
    fn device_info_is_derived_from_ip() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("curl/8.5"));

        let info = client_info(&headers, peer());
        assert_eq!(info.user_agent.as_deref(), Some("curl/8.5"));
        assert_eq!(info.device_info.as_deref(), Some("Device accessing from 10.1.2.3"));

        let anonymous = client_info(&HeaderMap::new(), None);
        assert_eq!(anonymous, ClientInfo::default());
    }
}
