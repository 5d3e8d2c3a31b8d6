use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

use pnet::util::MacAddr;

use crate::models::Opcode;

/// The fields of an Ethernet/IPv4 ARP header that the resolver acts upon.
///
/// The hardware and protocol types are fixed (Ethernet, IPv4) and are checked
/// by [`crate::parser::parse`] before a header is built.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArpHeader {
    pub opcode: Opcode,
    /// Hardware address of the host that emitted the packet.
    pub sender_mac: MacAddr,
    /// Protocol address of the host that emitted the packet.
    pub sender_ip: Ipv4Addr,
    /// Zero in requests, the requester's hardware address in replies.
    pub target_mac: MacAddr,
    /// The address being resolved (requests) or the reply recipient (replies).
    pub target_ip: Ipv4Addr,
}

impl ArpHeader {
    /// Build a request asking who owns `target_ip`.
    pub fn request(sender_mac: MacAddr, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        ArpHeader {
            opcode: Opcode::Request,
            sender_mac,
            sender_ip,
            target_mac: MacAddr::zero(),
            target_ip,
        }
    }

    /// Build a reply telling `target_ip`/`target_mac` that `sender_ip` is at `sender_mac`.
    pub fn reply(
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    ) -> Self {
        ArpHeader {
            opcode: Opcode::Reply,
            sender_mac,
            sender_ip,
            target_mac,
            target_ip,
        }
    }
}

impl Display for ArpHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "opcode={}", self.opcode)?;
        write!(f, " sender_mac={}", self.sender_mac)?;
        write!(f, " sender_ip={}", self.sender_ip)?;
        write!(f, " target_mac={}", self.target_mac)?;
        write!(f, " target_ip={}", self.target_ip)
    }
}
