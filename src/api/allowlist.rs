use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

/// IPv4 allowlist made of exact addresses and CIDR ranges.
///
/// IPv4-mapped IPv6 clients are matched by their IPv4 form. Other IPv6
/// clients are denied unless the list contains `0.0.0.0/0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpAllowlist {
    ranges: Vec<Ipv4Range>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ipv4Range {
    network: u32,
    mask: u32,
}

impl Ipv4Range {
    fn parse(entry: &str) -> Result<Self, String> {
        let (addr, prefix) = match entry.split_once('/') {
            Some((addr, prefix)) => {
                let prefix: u32 = prefix
                    .parse()
                    .map_err(|_| format!("invalid prefix in `{entry}`"))?;
                if prefix > 32 {
                    return Err(format!("prefix out of range in `{entry}`"));
                }
                (addr, prefix)
            }
            None => (entry, 32),
        };

        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| format!("invalid IPv4 address in `{entry}`"))?;
        let mask = if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - prefix)
        };

        Ok(Self {
            network: u32::from(addr) & mask,
            mask,
        })
    }

    fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & self.mask == self.network
    }

    fn is_any(&self) -> bool {
        self.mask == 0
    }
}

impl IpAllowlist {
    /// Parses a comma separated list such as `192.168.1.0/24, 79.140.150.238`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let ranges = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(Ipv4Range::parse)
            .collect::<Result<Vec<_>, _>>()?;

        if ranges.is_empty() {
            return Err("allowlist is empty".to_string());
        }

        Ok(Self { ranges })
    }

    pub fn allows(&self, ip: Option<IpAddr>) -> bool {
        if self.ranges.iter().any(Ipv4Range::is_any) {
            return true;
        }

        match ip.and_then(as_ipv4) {
            Some(v4) => self.ranges.iter().any(|range| range.contains(v4)),
            None => false,
        }
    }
}

fn as_ipv4(ip: IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

/// Resolves the client address: the first `X-Forwarded-For` hop when the
/// header is present, the socket peer otherwise.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| peer.map(|addr| addr.ip()))
}

/// Middleware rejecting clients outside the allowlist with `403`.
pub async fn enforce_allowlist(
    State(allowlist): State<Arc<IpAllowlist>>,
    req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(req.headers(), peer);

    if allowlist.allows(ip) {
        return next.run(req).await;
    }

    let shown = ip.map(|ip| ip.to_string()).unwrap_or_else(|| "unknown".to_string());
    warn!(ip = %shown, path = %req.uri().path(), "Access denied by IP allowlist");

    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "Access Denied",
            "message": "This service is only available on allowed networks.",
            "ip": shown,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use axum::http::HeaderValue;

    use super::*;

    fn ip(s: &str) -> Option<IpAddr> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_cidr_and_exact_entries() {
        let list = IpAllowlist::parse("192.168.1.0/24, 79.140.150.238").unwrap();

        assert!(list.allows(ip("192.168.1.1")));
        assert!(list.allows(ip("192.168.1.254")));
        assert!(list.allows(ip("79.140.150.238")));
        assert!(!list.allows(ip("192.168.2.1")));
        assert!(!list.allows(ip("79.140.150.239")));
        assert!(!list.allows(None));
    }

    #[test]
    fn test_ipv4_mapped_ipv6_is_normalised() {
        let list = IpAllowlist::parse("127.0.0.1").unwrap();
        let mapped = IpAddr::V6(Ipv4Addr::new(127, 0, 0, 1).to_ipv6_mapped());

        assert!(list.allows(Some(mapped)));
        assert!(!list.allows(Some(IpAddr::V6(Ipv6Addr::LOCALHOST))));
    }

    #[test]
    fn test_allow_all_range() {
        let list = IpAllowlist::parse("0.0.0.0/0").unwrap();
        assert!(list.allows(ip("8.8.8.8")));
        assert!(list.allows(Some(IpAddr::V6(Ipv6Addr::LOCALHOST))));
        assert!(list.allows(None));
    }

    #[test]
    fn test_rejects_bad_entries() {
        assert!(IpAllowlist::parse("").is_err());
        assert!(IpAllowlist::parse("10.0.0.0/33").is_err());
        assert!(IpAllowlist::parse("10.0.0/8").is_err());
        assert!(IpAllowlist::parse("::1").is_err());
    }

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        let peer: SocketAddr = "10.0.0.9:5555".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer)), ip("10.0.0.9"));

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.10, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, Some(peer)), ip("203.0.113.10"));
    }
}
