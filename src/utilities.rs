//! Utilities.
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};
use std::panic;
use std::process;

use log::LevelFilter;
use pnet::datalink::{self, NetworkInterface};
use pnet::util::MacAddr;

/// Configure the global logger with millisecond timestamps.
pub fn configure_logger(level: LevelFilter) {
    env_logger::builder()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter_level(level)
        .init();
}

/// Exit the whole process when any thread panics.
pub fn exit_process_on_panic() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        default_hook(info);
        process::exit(1);
    }));
}

/// Return the network interface with the given name.
pub fn get_interface(interface: &str) -> Option<NetworkInterface> {
    datalink::interfaces()
        .into_iter()
        .find(|iface| iface.name == interface)
}

/// Return the first interface that is up, not a loopback, and has an IPv4 address.
pub fn get_default_interface() -> String {
    datalink::interfaces()
        .into_iter()
        .find(|iface| iface.is_up() && !iface.is_loopback() && first_ipv4(iface).is_some())
        .map(|iface| iface.name)
        .unwrap_or_default()
}

/// Return the preferred IPv4 address for the interface.
pub fn get_ipv4_address(interface: &str) -> Option<Ipv4Addr> {
    first_ipv4(&get_interface(interface)?)
}

/// Return the MAC address of the interface (if any).
pub fn get_mac_address(interface: &str) -> Option<MacAddr> {
    get_interface(interface).and_then(|iface| iface.mac)
}

fn first_ipv4(iface: &NetworkInterface) -> Option<Ipv4Addr> {
    iface.ips.iter().find_map(|network| match network.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(_) => None,
    })
}
