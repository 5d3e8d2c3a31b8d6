//! Functions for building ARP payloads and Ethernet frames.
//!
//! # Examples
//!
//! ```
//! use std::net::Ipv4Addr;
//! use pnet::util::MacAddr;
//! use arpcat::builder::build_arp;
//! use arpcat::models::ArpHeader;
//! use arpcat::parser::parse;
//!
//! let mac = MacAddr::new(0x02, 0, 0, 0, 0, 0x01);
//! let header = ArpHeader::request(mac, Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2));
//! let packet = build_arp(&header);
//!
//! assert_eq!(parse(packet.data()).unwrap(), header);
//! ```
use pnet::packet::arp::{ArpHardwareTypes, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherType, EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::util::MacAddr;

use crate::models::{ArpHeader, Packet};

/// Size of an Ethernet/IPv4 ARP header.
pub const ARP_HEADER_SIZE: usize = 28;

/// Size of an Ethernet header (without the 802.1Q tag).
pub const ETHERNET_HEADER_SIZE: usize = 14;

/// Build the ARP payload for `header`.
pub fn build_arp(header: &ArpHeader) -> Packet {
    let mut packet = Packet::zeroed(ArpPacket::minimum_packet_size());
    let mut arp =
        MutableArpPacket::new(packet.data_mut()).expect("buffer is sized for an ARP header");
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(header.opcode.into());
    arp.set_sender_hw_addr(header.sender_mac);
    arp.set_sender_proto_addr(header.sender_ip);
    arp.set_target_hw_addr(header.target_mac);
    arp.set_target_proto_addr(header.target_ip);
    packet
}

/// Prepend an Ethernet header to `payload`, writing the frame into `buffer`.
///
/// The buffer is cleared first; on return it holds exactly one frame.
pub fn build_ethernet(
    buffer: &mut Vec<u8>,
    src_addr: MacAddr,
    dst_addr: MacAddr,
    ethertype: EtherType,
    payload: &[u8],
) {
    buffer.clear();
    buffer.resize(EthernetPacket::minimum_packet_size(), 0);
    let mut ethernet =
        MutableEthernetPacket::new(buffer).expect("buffer is sized for an Ethernet header");
    ethernet.set_source(src_addr);
    ethernet.set_destination(dst_addr);
    ethernet.set_ethertype(ethertype);
    buffer.extend_from_slice(payload);
}
