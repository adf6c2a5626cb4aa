use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pingr_common::ping::{PingLine, PingOutcome, ProbeError, ProbeMethod};
use pingr_protocols::icmp;
use socket2::{Domain, Protocol, Socket, Type};
use tracing::trace;

use super::{ProbeTarget, Prober, TcpProber};

const SEND_TTL: u32 = 64;
const RECV_BUFFER_SIZE: usize = 2048;

/// ICMPv4 echo over an unprivileged datagram socket.
///
/// Linux allows this for groups in `net.ipv4.ping_group_range`; macOS always
/// does. The kernel owns the echo identifier, so replies are matched on the
/// sequence number alone. IPv6 targets are handed to an internal [`TcpProber`].
pub struct DgramIcmpProber {
    socket: Arc<Mutex<UdpSocket>>,
    timeout: Duration,
    fallback: TcpProber,
}

impl DgramIcmpProber {
    pub fn new(timeout: Duration) -> std::io::Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::ICMPV4))?;
        let socket: UdpSocket = socket.into();
        socket.set_ttl(SEND_TTL)?;

        Ok(Self {
            socket: Arc::new(Mutex::new(socket)),
            timeout,
            fallback: TcpProber::new(timeout),
        })
    }
}

#[async_trait]
impl Prober for DgramIcmpProber {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Icmp
    }

    async fn probe(&self, target: &ProbeTarget, seq: u64) -> PingOutcome {
        let IpAddr::V4(_) = target.addr.ip() else {
            return self.fallback.probe(target, seq).await;
        };

        let socket = self.socket.clone();
        let addr: IpAddr = target.addr.ip();
        let timeout: Duration = self.timeout;

        let (rtt, ttl) = tokio::task::spawn_blocking(move || echo_round_trip(&socket, addr, seq, timeout))
            .await
            .map_err(|e| ProbeError::Io(e.to_string()))??;

        Ok(PingLine {
            hostname: target.hostname.clone(),
            addr,
            seq,
            ttl: Some(ttl.unwrap_or(SEND_TTL as u8)),
            rtt,
            method: ProbeMethod::Icmp,
        })
    }
}

fn echo_round_trip(
    socket: &Mutex<UdpSocket>,
    addr: IpAddr,
    seq: u64,
    timeout: Duration,
) -> Result<(Duration, Option<u8>), ProbeError> {
    let wire_seq: u16 = seq as u16;
    let bytes: Vec<u8> = icmp::create_echo_request(0, wire_seq, &icmp::default_payload())
        .map_err(|e| ProbeError::Io(e.to_string()))?;

    let socket = socket
        .lock()
        .map_err(|_| ProbeError::Io("icmp socket poisoned".to_string()))?;

    let start: Instant = Instant::now();
    socket
        .send_to(&bytes, SocketAddr::new(addr, 0))
        .map_err(|e| ProbeError::Unreachable(e.to_string()))?;

    let mut buffer = [0u8; RECV_BUFFER_SIZE];
    let deadline: Instant = start + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ProbeError::Timeout { seq });
        }
        socket
            .set_read_timeout(Some(remaining))
            .map_err(|e| ProbeError::Io(e.to_string()))?;

        let (len, source) = match socket.recv_from(&mut buffer) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(ProbeError::Timeout { seq });
            }
            Err(e) => return Err(ProbeError::Io(e.to_string())),
        };

        let (ttl, message) = icmp::strip_ipv4_header(&buffer[..len]);
        match icmp::parse_echo_reply(message) {
            Some(echo) if source.ip() == addr && echo.sequence == wire_seq => {
                return Ok((start.elapsed(), ttl));
            }
            _ => trace!("Ignoring unrelated ICMP packet from {source}"),
        }
    }
}
