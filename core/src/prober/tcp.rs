use std::io::ErrorKind;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pingr_common::ping::{PingLine, PingOutcome, ProbeError, ProbeMethod};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::{ProbeTarget, Prober};

pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Prober for TcpProber {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Tcp
    }

    async fn probe(&self, target: &ProbeTarget, seq: u64) -> PingOutcome {
        let start: Instant = Instant::now();

        match timeout(self.timeout, TcpStream::connect(target.addr)).await {
            // A refused handshake still proves the host answered.
            Ok(Ok(_)) => Ok(line(target, seq, start.elapsed())),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                Ok(line(target, seq, start.elapsed()))
            }
            Ok(Err(e)) => Err(ProbeError::Unreachable(e.to_string())),
            Err(_elapsed) => Err(ProbeError::Timeout { seq }),
        }
    }
}

fn line(target: &ProbeTarget, seq: u64, rtt: Duration) -> PingLine {
    PingLine {
        hostname: target.hostname.clone(),
        addr: target.addr.ip(),
        seq,
        ttl: None,
        rtt,
        method: ProbeMethod::Tcp,
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
