//! # Ping Target Model
//!
//! Defines what the monitor can be pointed at.
//!
//! A target is a host plus an optional port:
//! * A hostname (e.g., `example.com`) or `hostname:port`.
//! * An IPv4 address (e.g., `192.168.1.5`) or `ip:port`.
//! * An IPv6 address, bare (`::1`) or bracketed with a port (`[::1]:443`).

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TargetError {
    #[error("host cannot be empty")]
    Empty,
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("invalid IPv6 address '{0}'")]
    InvalidIpv6(String),
}

/// A host the monitor can probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostSpec {
    pub host: String,
    pub port: Option<u16>,
}

impl HostSpec {
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the literal address when the host is an IP rather than a name.
    pub fn ip_literal(&self) -> Option<IpAddr> {
        self.host.parse::<IpAddr>().ok()
    }

    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }
}

impl FromStr for HostSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetError::Empty);
        }

        if let Some(target) = parse_bracketed_v6(s)? {
            return Ok(target);
        }

        // More than one colon without brackets can only be a bare IPv6 address.
        if s.matches(':').count() > 1 {
            return s
                .parse::<Ipv6Addr>()
                .map(|_| HostSpec::new(s, None))
                .map_err(|_| TargetError::InvalidIpv6(s.to_string()));
        }

        match s.split_once(':') {
            Some((host, port_str)) => {
                if host.is_empty() {
                    return Err(TargetError::Empty);
                }
                let port = parse_port(port_str)?;
                Ok(HostSpec::new(host, Some(port)))
            }
            None => Ok(HostSpec::new(s, None)),
        }
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.port, self.host.contains(':')) {
            (Some(port), true) => write!(f, "[{}]:{}", self.host, port),
            (Some(port), false) => write!(f, "{}:{}", self.host, port),
            (None, _) => write!(f, "{}", self.host),
        }
    }
}

/// Parses `[v6]` or `[v6]:port`.
fn parse_bracketed_v6(s: &str) -> Result<Option<HostSpec>, TargetError> {
    let Some(rest) = s.strip_prefix('[') else {
        return Ok(None);
    };

    let Some((addr_str, tail)) = rest.split_once(']') else {
        return Err(TargetError::InvalidIpv6(s.to_string()));
    };

    addr_str
        .parse::<Ipv6Addr>()
        .map_err(|_| TargetError::InvalidIpv6(addr_str.to_string()))?;

    let port = match tail {
        "" => None,
        _ => {
            let port_str = tail
                .strip_prefix(':')
                .ok_or_else(|| TargetError::InvalidPort(tail.to_string()))?;
            Some(parse_port(port_str)?)
        }
    };

    Ok(Some(HostSpec::new(addr_str, port)))
}

fn parse_port(s: &str) -> Result<u16, TargetError> {
    match s.parse::<u16>() {
        Ok(0) | Err(_) => Err(TargetError::InvalidPort(s.to_string())),
        Ok(port) => Ok(port),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
