//! Probe results as they flow from the monitor to the renderers.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EMPTY_SLOT: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeMethod {
    Icmp,
    Tcp,
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Icmp => write!(f, "ICMP echo"),
            Self::Tcp => write!(f, "TCP handshake"),
        }
    }
}

/// One successful probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingLine {
    pub hostname: String,
    pub addr: IpAddr,
    pub seq: u64,
    pub ttl: Option<u8>,
    pub rtt: Duration,
    pub method: ProbeMethod,
}

impl fmt::Display for PingLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.method {
            ProbeMethod::Icmp => {
                let ttl = self
                    .ttl
                    .map(|ttl| ttl.to_string())
                    .unwrap_or_else(|| "?".to_string());
                write!(
                    f,
                    "64 bytes from {}: icmp_seq={} ttl={} time={}ms",
                    self.hostname,
                    self.seq,
                    ttl,
                    self.rtt.as_millis(),
                )
            }
            ProbeMethod::Tcp => write!(
                f,
                "connected to {} ({}): tcp_seq={} time={}ms",
                self.hostname,
                self.addr,
                self.seq,
                self.rtt.as_millis(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ProbeError {
    #[error("request timeout for seq {seq}")]
    Timeout { seq: u64 },
    #[error("host unreachable: {0}")]
    Unreachable(String),
    #[error("probe failed: {0}")]
    Io(String),
}

pub type PingOutcome = Result<PingLine, ProbeError>;

/// Renders one history slot the way the live window shows it.
pub fn render_slot(slot: &Option<PingOutcome>) -> String {
    match slot {
        Some(Ok(line)) => line.to_string(),
        Some(Err(err)) => err.to_string(),
        None => EMPTY_SLOT.to_string(),
    }
}
