//! The central **abstraction** for probing a single host.
//!
//! The monitor only talks to [`Prober`]. Concrete strategies live in the
//! submodules: [`icmp`] sends real echo requests over a raw socket and needs
//! root, [`dgram`] sends them over an unprivileged datagram socket where the
//! OS allows it, and [`tcp`] times a TCP handshake as the last resort.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use pingr_common::config::Config;
use pingr_common::network::target::HostSpec;
use pingr_common::ping::{PingOutcome, ProbeMethod};
use tracing::{debug, warn};

mod dgram;
mod icmp;
mod tcp;

pub use dgram::DgramIcmpProber;
pub use icmp::IcmpProber;
pub use tcp::TcpProber;

/// The resolved host a probe is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    /// Name shown in result lines, port included when one was given.
    pub hostname: String,
    pub addr: SocketAddr,
}

impl ProbeTarget {
    pub fn new(spec: &HostSpec, addr: SocketAddr) -> Self {
        Self {
            hostname: spec.to_string(),
            addr,
        }
    }
}

#[async_trait]
pub trait Prober: Send + Sync {
    fn method(&self) -> ProbeMethod;

    /// Sends one probe and waits for its answer or the timeout.
    ///
    /// Failures are part of the outcome; a probe never errors out of band.
    async fn probe(&self, target: &ProbeTarget, seq: u64) -> PingOutcome;
}

/// Picks the first ICMP socket we may open, TCP when none is allowed.
///
/// Root tries the raw socket first. Everyone tries the datagram socket.
pub fn select_prober(cfg: &Config, is_root: bool) -> Arc<dyn Prober> {
    if cfg.force_tcp {
        debug!("Using TCP probes as requested");
        return Arc::new(TcpProber::new(cfg.timeout));
    }

    if is_root {
        match IcmpProber::new(cfg.timeout) {
            Ok(prober) => return Arc::new(prober),
            Err(e) => debug!("Raw ICMP socket unavailable: {e}"),
        }
    }

    match DgramIcmpProber::new(cfg.timeout) {
        Ok(prober) => {
            debug!("Using unprivileged ICMP datagram socket");
            Arc::new(prober)
        }
        Err(e) => {
            warn!("ICMP sockets unavailable ({e}), falling back to TCP probes");
            Arc::new(TcpProber::new(cfg.timeout))
        }
    }
}

/// Convenience wrapper that asks the OS whether we run privileged.
pub fn default_prober(cfg: &Config) -> Arc<dyn Prober> {
    select_prober(cfg, is_root::is_root())
}
