//! Interfaces between the resolver and the stack that owns it.
use std::net::Ipv4Addr;

use pnet::packet::ethernet::EtherType;
use pnet::util::MacAddr;

use crate::models::Chain;

/// The IP stack owning a resolver.
pub trait Stack {
    /// Name of the network interface, used to name counters.
    fn ifname(&self) -> &str;

    /// The IPv4 address of this interface.
    fn ip_addr(&self) -> Ipv4Addr;

    /// The MAC address of this interface.
    fn link_addr(&self) -> MacAddr;

    /// Called when a pending address exhausted its retries.
    /// `dropped` holds the packets that were waiting for it.
    fn resolution_failed(&mut self, addr: Ipv4Addr, dropped: Chain) {
        let _ = (addr, dropped);
    }
}

/// The link-layer transmit path.
pub trait LinkLayer {
    /// Send every packet of `chain`, in order, to `destination`.
    fn send(&mut self, chain: Chain, destination: MacAddr, ethertype: EtherType);
}
