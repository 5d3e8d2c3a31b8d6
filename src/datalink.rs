//! Bindings of the resolver to a host network interface.
use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::error;
use pnet::datalink::{self, Channel, DataLinkReceiver, DataLinkSender};
use pnet::packet::ethernet::{EtherType, EthernetPacket};
use pnet::util::MacAddr;

use crate::builder::build_ethernet;
use crate::models::Chain;
use crate::stack::{LinkLayer, Stack};
use crate::utilities::{get_interface, get_ipv4_address, get_mac_address};

/// The identity of a host interface.
pub struct Host {
    ifname: String,
    ip_addr: Ipv4Addr,
    link_addr: MacAddr,
}

impl Host {
    pub fn new(ifname: &str, ip_addr: Ipv4Addr, link_addr: MacAddr) -> Self {
        Host {
            ifname: ifname.to_string(),
            ip_addr,
            link_addr,
        }
    }

    /// Read the addresses of `interface` from the operating system.
    pub fn from_interface(interface: &str, ip_addr: Option<Ipv4Addr>) -> Result<Self> {
        let link_addr = get_mac_address(interface).context("Device has no MAC address")?;
        let ip_addr = match ip_addr {
            Some(ip_addr) => ip_addr,
            None => get_ipv4_address(interface).context("Device has no IPv4 address")?,
        };
        Ok(Host::new(interface, ip_addr, link_addr))
    }
}

impl Stack for Host {
    fn ifname(&self) -> &str {
        &self.ifname
    }

    fn ip_addr(&self) -> Ipv4Addr {
        self.ip_addr
    }

    fn link_addr(&self) -> MacAddr {
        self.link_addr
    }

    fn resolution_failed(&mut self, addr: Ipv4Addr, dropped: Chain) {
        error!(
            "{}: cannot resolve {}, {} packets dropped",
            self.ifname,
            addr,
            dropped.len()
        );
    }
}

/// Ethernet framing over a raw datalink channel.
pub struct EthernetLink {
    tx: Box<dyn DataLinkSender>,
    src_mac: MacAddr,
    buffer: Vec<u8>,
    failed: u64,
}

impl EthernetLink {
    pub fn new(tx: Box<dyn DataLinkSender>, src_mac: MacAddr) -> Self {
        EthernetLink {
            tx,
            src_mac,
            buffer: Vec::with_capacity(1514),
            failed: 0,
        }
    }

    /// Number of frames the driver refused.
    pub fn failed(&self) -> u64 {
        self.failed
    }
}

impl LinkLayer for EthernetLink {
    fn send(&mut self, chain: Chain, destination: MacAddr, ethertype: EtherType) {
        for packet in chain {
            build_ethernet(
                &mut self.buffer,
                self.src_mac,
                destination,
                ethertype,
                packet.data(),
            );
            match self.tx.send_to(&self.buffer, None) {
                Some(Ok(())) => {}
                Some(Err(error)) => {
                    self.failed += 1;
                    error!("{}", error);
                }
                None => {
                    self.failed += 1;
                    error!("Cannot send frame: buffer too small");
                }
            }
        }
    }
}

/// Open an Ethernet channel on `interface`.
///
/// Reads on the receiver return after `read_timeout` if no frames arrive,
/// which lets the caller service its timers.
pub fn open(
    interface: &str,
    read_timeout: Duration,
) -> Result<(EthernetLink, Box<dyn DataLinkReceiver>)> {
    let iface = get_interface(interface).context("Interface not found")?;
    let src_mac = iface.mac.context("Device has no MAC address")?;
    let config = datalink::Config {
        read_timeout: Some(read_timeout),
        ..Default::default()
    };
    match datalink::channel(&iface, config)? {
        Channel::Ethernet(tx, rx) => Ok((EthernetLink::new(tx, src_mac), rx)),
        _ => bail!("Unsupported channel type"),
    }
}

/// Read the next frame, `None` on timeout.
pub fn next_frame(rx: &mut dyn DataLinkReceiver) -> Result<Option<&[u8]>> {
    match rx.next() {
        Ok(frame) => Ok(Some(frame)),
        Err(error) if error.kind() == io::ErrorKind::TimedOut => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Split a frame into its ethertype and payload.
pub fn demux(frame: &[u8]) -> Option<(EtherType, &[u8])> {
    let ethernet = EthernetPacket::new(frame)?;
    let ethertype = ethernet.get_ethertype();
    frame
        .get(EthernetPacket::minimum_packet_size()..)
        .map(|payload| (ethertype, payload))
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use pnet::packet::ethernet::EtherTypes;
    use pnet::util::MacAddr;

    use crate::builder::{build_arp, build_ethernet};
    use crate::datalink::demux;
    use crate::models::ArpHeader;

    #[test]
    fn test_demux() {
        let mac = MacAddr::new(0x02, 0, 0, 0, 0, 0x01);
        let arp = build_arp(&ArpHeader::request(
            mac,
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
        ));
        let mut frame = Vec::new();
        build_ethernet(&mut frame, mac, MacAddr::broadcast(), EtherTypes::Arp, arp.data());

        let (ethertype, payload) = demux(&frame).unwrap();
        assert_eq!(ethertype, EtherTypes::Arp);
        assert_eq!(payload, arp.data());
        assert!(demux(&frame[..10]).is_none());
    }
}
