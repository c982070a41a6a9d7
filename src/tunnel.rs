//! Tunnel host resolution.
//!
//! scrcpy's remote tunnel wants the IPv4 address behind the tunnel host name
//! (`host.docker.internal` in the stock setup); this module is the launcher's
//! equivalent of `getent hosts host.docker.internal | awk '{ print $1 }'`.

use std::net::{IpAddr, Ipv4Addr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TunnelError {
    #[error("Host `{0}` did not resolve to any address")]
    Unresolved(String),

    #[error("Host `{0}` resolved to IPv6 only; the scrcpy tunnel needs an IPv4 address")]
    NoIpv4(String),

    #[error("Failed to resolve `{host}`: {source}")]
    Lookup {
        host: String,
        source: std::io::Error,
    },
}

/// Resolve the tunnel host to its first IPv4 address.
///
/// There is no fallback and no retry: when the name does not resolve here,
/// the mirroring session cannot work, and the caller should surface that
/// instead of limping on.
pub async fn resolve_ipv4(host: &str) -> Result<Ipv4Addr, TunnelError> {
    let addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| TunnelError::Lookup {
            host: host.to_string(),
            source: e,
        })?;

    let mut saw_any = false;
    for addr in addrs {
        saw_any = true;
        if let IpAddr::V4(v4) = addr.ip() {
            return Ok(v4);
        }
    }

    if saw_any {
        Err(TunnelError::NoIpv4(host.to_string()))
    } else {
        Err(TunnelError::Unresolved(host.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_ipv4_literals() {
        let ip = resolve_ipv4("127.0.0.1").await.unwrap();
        assert_eq!(ip, Ipv4Addr::LOCALHOST);
    }

    #[tokio::test]
    async fn ipv6_only_answers_are_rejected() {
        let err = resolve_ipv4("::1").await.unwrap_err();
        assert!(matches!(err, TunnelError::NoIpv4(host) if host == "::1"));
    }

    #[tokio::test]
    async fn unresolvable_hosts_error_with_the_host_name() {
        // RFC 2606 reserves .invalid; lookups must fail.
        match resolve_ipv4("vivus.invalid").await.unwrap_err() {
            TunnelError::Lookup { host, .. } => assert_eq!(host, "vivus.invalid"),
            TunnelError::Unresolved(host) => assert_eq!(host, "vivus.invalid"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
