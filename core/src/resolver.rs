use std::net::{IpAddr, SocketAddr};

use pingr_common::command::CommandError;
use pingr_common::network::target::HostSpec;
use tokio::net::lookup_host;
use tracing::debug;

/// Turns a host specification into the socket address the probers use.
///
/// IP literals skip DNS entirely. For names, IPv4 answers win over IPv6 since
/// the ICMP prober only speaks IPv4.
pub async fn resolve(spec: &HostSpec, default_port: u16) -> Result<SocketAddr, CommandError> {
    let port: u16 = spec.port_or(default_port);

    if let Some(ip) = spec.ip_literal() {
        return Ok(SocketAddr::new(ip, port));
    }

    let addrs: Vec<SocketAddr> = lookup_host((spec.host.as_str(), port))
        .await
        .map_err(|e| CommandError::Resolve {
            host: spec.host.clone(),
            reason: e.to_string(),
        })?
        .collect();

    debug!("{} resolved to {} address(es)", spec.host, addrs.len());

    pick_preferred(&addrs).ok_or_else(|| CommandError::Resolve {
        host: spec.host.clone(),
        reason: "no addresses found".to_string(),
    })
}

fn pick_preferred(addrs: &[SocketAddr]) -> Option<SocketAddr> {
    addrs
        .iter()
        .find(|addr| matches!(addr.ip(), IpAddr::V4(_)))
        .or_else(|| addrs.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[tokio::test]
    async fn literal_addresses_skip_dns() {
        let spec = HostSpec::new("192.0.2.7", None);
        let addr = resolve(&spec, 443).await.unwrap();
        assert_eq!(addr, SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7)), 443));

        let spec = HostSpec::new("::1", Some(8080));
        let addr = resolve(&spec, 443).await.unwrap();
        assert_eq!(addr, SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 8080));
    }

    #[test]
    fn ipv4_is_preferred() {
        let v6 = SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 1);
        let v4 = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 1);
        assert_eq!(pick_preferred(&[v6, v4]), Some(v4));
        assert_eq!(pick_preferred(&[v6]), Some(v6));
        assert_eq!(pick_preferred(&[]), None);
    }

    #[tokio::test]
    #[ignore]
    async fn unknown_name_fails_to_resolve() {
        let spec = HostSpec::new("does-not-exist.invalid", None);
        let err = resolve(&spec, 443).await.unwrap_err();
        assert!(matches!(err, CommandError::Resolve { .. }));
    }
}
