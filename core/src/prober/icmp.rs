use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pingr_common::ping::{PingLine, PingOutcome, ProbeError, ProbeMethod};
use pingr_protocols::icmp;
use pnet::packet::Packet;
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{
    self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender,
};
use tracing::trace;

use super::{ProbeTarget, Prober, TcpProber};

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const SEND_TTL: u8 = 64;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

/// Raw-socket ICMPv4 echo prober.
///
/// IPv6 targets are handed to an internal [`TcpProber`].
pub struct IcmpProber {
    tx: Arc<Mutex<TransportSender>>,
    rx: Arc<Mutex<TransportReceiver>>,
    identifier: u16,
    timeout: Duration,
    fallback: TcpProber,
}

impl IcmpProber {
    pub fn new(timeout: Duration) -> std::io::Result<Self> {
        let (mut tx, rx) = transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)?;
        tx.set_ttl(SEND_TTL)?;

        Ok(Self {
            tx: Arc::new(Mutex::new(tx)),
            rx: Arc::new(Mutex::new(rx)),
            identifier: rand::random(),
            timeout,
            fallback: TcpProber::new(timeout),
        })
    }
}

#[async_trait]
impl Prober for IcmpProber {
    fn method(&self) -> ProbeMethod {
        ProbeMethod::Icmp
    }

    async fn probe(&self, target: &ProbeTarget, seq: u64) -> PingOutcome {
        let IpAddr::V4(_) = target.addr.ip() else {
            return self.fallback.probe(target, seq).await;
        };

        let tx = self.tx.clone();
        let rx = self.rx.clone();
        let addr: IpAddr = target.addr.ip();
        let identifier: u16 = self.identifier;
        let timeout: Duration = self.timeout;

        let rtt = tokio::task::spawn_blocking(move || {
            echo_round_trip(&tx, &rx, addr, identifier, seq, timeout)
        })
        .await
        .map_err(|e| ProbeError::Io(e.to_string()))??;

        Ok(PingLine {
            hostname: target.hostname.clone(),
            addr,
            seq,
            ttl: Some(SEND_TTL),
            rtt,
            method: ProbeMethod::Icmp,
        })
    }
}

fn echo_round_trip(
    tx: &Mutex<TransportSender>,
    rx: &Mutex<TransportReceiver>,
    addr: IpAddr,
    identifier: u16,
    seq: u64,
    timeout: Duration,
) -> Result<Duration, ProbeError> {
    // Sequence numbers on the wire are 16 bit and wrap.
    let wire_seq: u16 = seq as u16;
    let bytes: Vec<u8> = icmp::create_echo_request(identifier, wire_seq, &icmp::default_payload())
        .map_err(|e| ProbeError::Io(e.to_string()))?;
    let packet = IcmpPacket::new(&bytes)
        .ok_or_else(|| ProbeError::Io("echo request buffer too small".to_string()))?;

    let mut receiver = rx
        .lock()
        .map_err(|_| ProbeError::Io("icmp receiver poisoned".to_string()))?;

    let start: Instant = Instant::now();
    {
        let mut sender = tx
            .lock()
            .map_err(|_| ProbeError::Io("icmp sender poisoned".to_string()))?;
        sender
            .send_to(packet, addr)
            .map_err(|e| ProbeError::Unreachable(e.to_string()))?;
    }

    let mut iter = transport::icmp_packet_iter(&mut receiver);
    let deadline: Instant = start + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ProbeError::Timeout { seq });
        }

        match iter.next_with_timeout(remaining) {
            Ok(Some((reply, source))) if source == addr => {
                match icmp::parse_echo_reply(reply.packet()) {
                    Some(echo) if echo.identifier == identifier && echo.sequence == wire_seq => {
                        return Ok(start.elapsed());
                    }
                    _ => trace!("Ignoring unrelated ICMP packet from {source}"),
                }
            }
            Ok(Some(_)) => {}
            Ok(None) => return Err(ProbeError::Timeout { seq }),
            Err(e) => return Err(ProbeError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
    use tokio::net::TcpListener;

    /// Needs root for the raw socket.
    #[tokio::test]
    #[ignore]
    async fn loopback_answers_echo_requests() {
        let prober = IcmpProber::new(Duration::from_secs(1)).unwrap();
        let target = ProbeTarget {
            hostname: "localhost".to_string(),
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
        };

        let line = prober.probe(&target, 1).await.unwrap();
        assert_eq!(line.method, ProbeMethod::Icmp);
        assert_eq!(line.ttl, Some(SEND_TTL));
    }

    #[tokio::test]
    async fn ipv6_targets_get_a_tcp_handshake() {
        let Ok(prober) = IcmpProber::new(Duration::from_secs(1)) else {
            eprintln!("Skipping: raw sockets need root");
            return;
        };
        let Ok(listener) = TcpListener::bind((Ipv6Addr::LOCALHOST, 0)).await else {
            eprintln!("Skipping: no IPv6 loopback");
            return;
        };
        let port: u16 = listener.local_addr().unwrap().port();

        let target = ProbeTarget {
            hostname: format!("[::1]:{port}"),
            addr: SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), port),
        };
        let line = prober.probe(&target, 2).await.unwrap();
        assert_eq!(line.method, ProbeMethod::Tcp);
        assert_eq!(line.ttl, None);
    }
}
