use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};
use pnet::packet::ipv4::Ipv4Packet;

pub const ICMP_ECHO_HDR_LEN: usize = 8;
/// 56 bytes of payload plus the 8 byte header gives the classic 64 byte ping.
pub const ECHO_PAYLOAD_LEN: usize = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoReply {
    pub identifier: u16,
    pub sequence: u16,
}

pub fn create_echo_request(identifier: u16, sequence: u16, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ICMP_ECHO_HDR_LEN + payload.len()];
    {
        let mut echo: MutableEchoRequestPacket =
            MutableEchoRequestPacket::new(&mut buffer).context("creating echo request packet")?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCode(0));
        echo.set_identifier(identifier);
        echo.set_sequence_number(sequence);
        echo.set_payload(payload);
        echo.set_checksum(0);
    }

    let csm: u16 = {
        let view = IcmpPacket::new(&buffer).context("creating icmp view")?;
        icmp::checksum(&view)
    };
    buffer[2..4].copy_from_slice(&csm.to_be_bytes());

    Ok(buffer)
}

/// Default payload: an incrementing byte pattern, like most ping tools use.
pub fn default_payload() -> Vec<u8> {
    (0..ECHO_PAYLOAD_LEN).map(|i| i as u8).collect()
}

/// Extracts identifier and sequence from an echo reply. Any other ICMP
/// message yields `None`.
pub fn parse_echo_reply(bytes: &[u8]) -> Option<EchoReply> {
    let packet = IcmpPacket::new(bytes)?;
    if packet.get_icmp_type() != IcmpTypes::EchoReply {
        return None;
    }

    let reply = EchoReplyPacket::new(packet.packet())?;
    Some(EchoReply {
        identifier: reply.get_identifier(),
        sequence: reply.get_sequence_number(),
    })
}

/// Splits a leading IPv4 header off `bytes`, returning its TTL and the rest.
///
/// Datagram ICMP sockets hand out the bare ICMP message on Linux but keep the
/// IP header on macOS; both shapes end up as the ICMP message here.
pub fn strip_ipv4_header(bytes: &[u8]) -> (Option<u8>, &[u8]) {
    if bytes.first().map(|b| b >> 4) != Some(4) {
        return (None, bytes);
    }

    match Ipv4Packet::new(bytes) {
        Some(ip) => {
            let header_len: usize = usize::from(ip.get_header_length()) * 4;
            match bytes.get(header_len..) {
                Some(rest) if header_len >= 20 => (Some(ip.get_ttl()), rest),
                _ => (None, bytes),
            }
        }
        None => (None, bytes),
    }
}
