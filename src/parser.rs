//! Function for parsing ARP payloads.
use pnet::packet::arp::{ArpHardwareTypes, ArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use thiserror::Error;

use crate::models::ArpHeader;

/// Reasons for rejecting an inbound ARP payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Truncated ARP header: {0} bytes")]
    Truncated(usize),

    #[error("Unsupported hardware type: {0:#06x}")]
    UnsupportedHardwareType(u16),

    #[error("Unsupported protocol type: {0:#06x}")]
    UnsupportedProtocolType(u16),

    #[error("Invalid address lengths: hardware={0} protocol={1}")]
    InvalidAddressLength(u8, u8),

    #[error("Not an ARP frame: ethertype {0:#06x}")]
    NotArp(u16),
}

/// Parse an ARP payload (the bytes following the Ethernet header).
///
/// Only Ethernet/IPv4 mappings are accepted. Opcodes are not validated:
/// an unknown opcode still yields a header so that the sender can be cached.
pub fn parse(payload: &[u8]) -> Result<ArpHeader, ParseError> {
    let arp = ArpPacket::new(payload).ok_or(ParseError::Truncated(payload.len()))?;

    let hardware_type = arp.get_hardware_type();
    if hardware_type != ArpHardwareTypes::Ethernet {
        return Err(ParseError::UnsupportedHardwareType(hardware_type.0));
    }

    let protocol_type = arp.get_protocol_type();
    if protocol_type != EtherTypes::Ipv4 {
        return Err(ParseError::UnsupportedProtocolType(protocol_type.0));
    }

    let (hw_addr_len, proto_addr_len) = (arp.get_hw_addr_len(), arp.get_proto_addr_len());
    if hw_addr_len != 6 || proto_addr_len != 4 {
        return Err(ParseError::InvalidAddressLength(hw_addr_len, proto_addr_len));
    }

    Ok(ArpHeader {
        opcode: arp.get_operation().0.into(),
        sender_mac: arp.get_sender_hw_addr(),
        sender_ip: arp.get_sender_proto_addr(),
        target_mac: arp.get_target_hw_addr(),
        target_ip: arp.get_target_proto_addr(),
    })
}

/// Parse a full Ethernet frame carrying an ARP payload.
pub fn parse_frame(frame: &[u8]) -> Result<ArpHeader, ParseError> {
    let ethernet = EthernetPacket::new(frame).ok_or(ParseError::Truncated(frame.len()))?;
    match ethernet.get_ethertype() {
        // NOTE: Slice the frame instead of using ethernet.payload() (lifetime issue).
        EtherTypes::Arp => parse(&frame[EthernetPacket::minimum_packet_size()..]),
        other => Err(ParseError::NotArp(other.0)),
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use pnet::util::MacAddr;

    use crate::builder::build_arp;
    use crate::models::{ArpHeader, Opcode};
    use crate::parser::{parse, ParseError};

    fn request() -> ArpHeader {
        ArpHeader::request(
            MacAddr::new(0x02, 0, 0, 0, 0, 0x0b),
            Ipv4Addr::new(10, 0, 0, 2),
            Ipv4Addr::new(10, 0, 0, 1),
        )
    }

    #[test]
    fn test_parse_truncated() {
        let packet = build_arp(&request());
        assert_eq!(parse(&packet.data()[..27]), Err(ParseError::Truncated(27)));
        assert_eq!(parse(&[]), Err(ParseError::Truncated(0)));
    }

    #[test]
    fn test_parse_trailing_padding() {
        // Ethernet pads short frames to 60 bytes.
        let mut data = build_arp(&request()).into_inner();
        data.resize(46, 0);
        assert_eq!(parse(&data), Ok(request()));
    }

    #[test]
    fn test_parse_unsupported_types() {
        let mut data = build_arp(&request()).into_inner();
        data[1] = 6; // IEEE 802
        assert_eq!(parse(&data), Err(ParseError::UnsupportedHardwareType(6)));

        let mut data = build_arp(&request()).into_inner();
        data[2] = 0x86;
        data[3] = 0xdd; // IPv6
        assert_eq!(
            parse(&data),
            Err(ParseError::UnsupportedProtocolType(0x86dd))
        );

        let mut data = build_arp(&request()).into_inner();
        data[5] = 16;
        assert_eq!(parse(&data), Err(ParseError::InvalidAddressLength(6, 16)));
    }

    #[test]
    fn test_parse_unknown_opcode() {
        let mut data = build_arp(&request()).into_inner();
        data[7] = 9;
        let header = parse(&data).unwrap();
        assert_eq!(header.opcode, Opcode::Unknown(9));
        assert_eq!(header.sender_ip, Ipv4Addr::new(10, 0, 0, 2));
    }
}
