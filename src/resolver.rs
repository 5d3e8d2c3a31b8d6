//! The ARP resolution engine.
//!
//! One [`Arp`] instance serves one network interface. It is driven by three
//! kinds of events, each running to completion:
//! - outbound packets, through [`Arp::transmit`];
//! - inbound ARP payloads, through [`Arp::receive`];
//! - timer expirations, through [`Arp::on_timer`] (or [`Arp::poll`]).
//!
//! # Examples
//!
//! ```
//! use std::net::Ipv4Addr;
//! use std::time::Instant;
//! use pnet::packet::ethernet::EtherType;
//! use pnet::util::MacAddr;
//! use arpcat::builder::build_arp;
//! use arpcat::config::Config;
//! use arpcat::models::{ArpHeader, Chain, Packet};
//! use arpcat::resolver::Arp;
//! use arpcat::stack::{LinkLayer, Stack};
//! use arpcat::timers::TimerQueue;
//!
//! struct Host;
//!
//! impl Stack for Host {
//!     fn ifname(&self) -> &str { "eth0" }
//!     fn ip_addr(&self) -> Ipv4Addr { Ipv4Addr::new(10, 0, 0, 1) }
//!     fn link_addr(&self) -> MacAddr { MacAddr::new(2, 0, 0, 0, 0, 1) }
//! }
//!
//! #[derive(Default)]
//! struct Wire(Vec<(Chain, MacAddr, EtherType)>);
//!
//! impl LinkLayer for Wire {
//!     fn send(&mut self, chain: Chain, destination: MacAddr, ethertype: EtherType) {
//!         self.0.push((chain, destination, ethertype));
//!     }
//! }
//!
//! let timers = TimerQueue::manual(Instant::now());
//! let mut arp = Arp::new(Host, Wire::default(), timers, Config::default());
//! let peer = Ipv4Addr::new(10, 0, 0, 2);
//! let peer_mac = MacAddr::new(2, 0, 0, 0, 0, 2);
//!
//! // Unknown next hop: the packet waits and a request is broadcast.
//! arp.transmit(Packet::from(vec![0x45]), peer);
//! assert_eq!(arp.link().0.len(), 1);
//!
//! // The reply resolves the address and releases the packet.
//! let own_mac = MacAddr::new(2, 0, 0, 0, 0, 1);
//! let reply = ArpHeader::reply(peer_mac, peer, own_mac, Ipv4Addr::new(10, 0, 0, 1));
//! arp.receive(build_arp(&reply).data());
//! assert_eq!(arp.lookup(peer), Some(peer_mac));
//! assert_eq!(arp.link().0[1].1, peer_mac);
//! ```
use std::net::Ipv4Addr;

use log::{debug, info, trace, warn};
use pnet::packet::ethernet::EtherTypes;
use pnet::util::MacAddr;

use crate::builder::build_arp;
use crate::cache::{ArpCache, CacheUpdate};
use crate::config::Config;
use crate::models::{ArpHeader, Chain, Opcode};
use crate::parser::parse;
use crate::pending::{Enqueued, PendingQueue};
use crate::stack::{LinkLayer, Stack};
use crate::statistics::ArpStatistics;
use crate::timers::{Timer, TimerQueue, Timers};

type ProxyPredicate = Box<dyn Fn(Ipv4Addr) -> bool>;

pub struct Arp<S, L, T> {
    stack: S,
    link: L,
    timers: T,
    config: Config,
    cache: ArpCache,
    pending: PendingQueue,
    proxy: Option<ProxyPredicate>,
    statistics: ArpStatistics,
}

impl<S: Stack, L: LinkLayer, T: Timers> Arp<S, L, T> {
    pub fn new(stack: S, link: L, timers: T, config: Config) -> Self {
        debug!("<arp> ifname={} {}", stack.ifname(), config);
        Arp {
            stack,
            link,
            timers,
            config,
            cache: ArpCache::new(),
            pending: PendingQueue::new(),
            proxy: None,
            statistics: ArpStatistics::default(),
        }
    }

    /// Answer requests for the addresses accepted by `predicate`.
    pub fn set_proxy(&mut self, predicate: impl Fn(Ipv4Addr) -> bool + 'static) {
        self.proxy = Some(Box::new(predicate));
    }

    pub fn clear_proxy(&mut self) {
        self.proxy = None;
    }

    /// Send `packets` to `next_hop`, resolving its MAC address if needed.
    pub fn transmit(&mut self, packets: impl Into<Chain>, next_hop: Ipv4Addr) {
        let chain: Chain = packets.into();
        trace!(
            "<arp> transmit packets={} bytes={} next_hop={}",
            chain.len(),
            chain.size(),
            next_hop
        );
        if chain.size() == 0 {
            warn!("<arp> dropping empty chain for {}", next_hop);
            return;
        }

        let dst_mac = if next_hop == Ipv4Addr::BROADCAST {
            MacAddr::broadcast()
        } else if let Some(mac) = self.config.passthrough {
            mac
        } else {
            match self.cache.lookup(next_hop) {
                Some(mac) => {
                    trace!("<arp> cache hit {} -> {}", next_hop, mac);
                    mac
                }
                None => {
                    debug!("<arp> no cache entry for {}, resolving", next_hop);
                    self.await_resolution(chain, next_hop);
                    return;
                }
            }
        };

        self.link.send(chain, dst_mac, EtherTypes::Ipv4);
    }

    /// Handle an inbound ARP payload (the bytes following the Ethernet header).
    pub fn receive(&mut self, payload: &[u8]) {
        let header = match parse(payload) {
            Ok(header) => header,
            Err(error) => {
                warn!("<arp> dropping packet: {}", error);
                self.statistics.malformed_rx += 1;
                return;
            }
        };
        trace!("<arp> receive {}", header);

        // Every sighting is trusted, whatever the opcode.
        self.insert_or_update(header.sender_ip, header.sender_mac);

        // Always try to ship waiting packets when someone talks.
        if let Some(chain) = self.pending.take_and_clear(header.sender_ip) {
            debug!(
                "<arp> {} resolved, sending {} waiting packets",
                header.sender_ip,
                chain.len()
            );
            self.link.send(chain, header.sender_mac, EtherTypes::Ipv4);
        }

        match header.opcode {
            Opcode::Request => {
                self.statistics.requests_rx += 1;
                debug!(
                    "<arp> {} is looking for {}",
                    header.sender_ip, header.target_ip
                );
                if header.target_ip == self.stack.ip_addr() {
                    self.respond(&header, header.target_ip);
                } else if self
                    .proxy
                    .as_ref()
                    .map_or(false, |proxy| proxy(header.target_ip))
                {
                    debug!("<arp> answering for {} (proxy)", header.target_ip);
                    self.respond(&header, header.target_ip);
                } else {
                    trace!("<arp> {} is not ours, dropping", header.target_ip);
                }
            }
            Opcode::Reply => {
                self.statistics.replies_rx += 1;
                debug!(
                    "<arp> {} is at {} (waiting={})",
                    header.sender_ip,
                    header.sender_mac,
                    self.pending.len()
                );
            }
            Opcode::Unknown(opcode) => {
                trace!("<arp> unknown opcode {}, dropping", opcode);
            }
        }
    }

    /// Broadcast a request for the MAC address of `target`.
    pub fn issue_request(&mut self, target: Ipv4Addr) {
        debug!("<arp> who has {}?", target);
        let request = ArpHeader::request(self.stack.link_addr(), self.stack.ip_addr(), target);
        self.statistics.requests_tx += 1;
        self.link.send(
            build_arp(&request).into(),
            MacAddr::broadcast(),
            EtherTypes::Arp,
        );
    }

    /// Re-issue a request for every pending address.
    pub fn retry_sweep(&mut self) {
        if self.pending.is_empty() {
            debug!("<arp> nothing to resolve, stopping retry timer");
            self.timers.stop(Timer::Retry);
            return;
        }

        for addr in self.pending.addresses() {
            let exhausted = match (self.config.max_retries, self.pending.retries(addr)) {
                (Some(max), Some(retries)) if retries >= max => Some(retries),
                _ => None,
            };
            if let Some(retries) = exhausted {
                self.give_up(addr, retries);
            } else {
                self.pending.record_retry(addr);
                self.issue_request(addr);
            }
        }

        if self.pending.is_empty() {
            self.timers.stop(Timer::Retry);
        } else {
            self.timers.start(Timer::Retry, self.config.retry_interval);
        }
    }

    /// Evict expired cache entries.
    pub fn flush_sweep(&mut self) {
        let now = self.timers.now();
        let before = self.cache.len();
        let remaining = self.cache.evict_expired(now, self.config.cache_ttl);
        debug!(
            "<arp> flushed {} expired entries, {} left",
            before - self.cache.len(),
            self.cache.len()
        );
        if remaining {
            self.timers.start(Timer::Flush, self.config.flush_interval);
        } else {
            self.timers.stop(Timer::Flush);
        }
    }

    /// Run the sweep associated with a fired timer.
    pub fn on_timer(&mut self, timer: Timer) {
        trace!("<arp> {} timer fired", timer);
        match timer {
            Timer::Flush => self.flush_sweep(),
            Timer::Retry => self.retry_sweep(),
        }
    }

    pub fn lookup(&self, addr: Ipv4Addr) -> Option<MacAddr> {
        self.cache.lookup(addr)
    }

    /// Drop every cache entry. Pending packets are kept.
    pub fn flush_cache(&mut self) {
        self.cache.clear();
        self.timers.stop(Timer::Flush);
    }

    /// Record that `ip` is at `mac`, starting the flush timer on a new entry.
    pub fn insert_or_update(&mut self, ip: Ipv4Addr, mac: MacAddr) {
        let now = self.timers.now();
        match self.cache.insert_or_update(ip, mac, now) {
            CacheUpdate::Inserted => {
                debug!("<arp> caching {} -> {}", ip, mac);
                if !self.timers.is_running(Timer::Flush) {
                    self.timers.start(Timer::Flush, self.config.flush_interval);
                }
            }
            CacheUpdate::Replaced { previous } => {
                debug!("<arp> {} moved from {} to {}", ip, previous, mac);
            }
            CacheUpdate::Refreshed => {
                trace!("<arp> refreshing {} -> {}", ip, mac);
            }
        }
    }

    pub fn cache(&self) -> &ArpCache {
        &self.cache
    }

    pub fn pending(&self) -> &PendingQueue {
        &self.pending
    }

    pub fn statistics(&self) -> &ArpStatistics {
        &self.statistics
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }

    fn await_resolution(&mut self, chain: Chain, next_hop: Ipv4Addr) {
        match self.pending.enqueue(next_hop, chain) {
            Enqueued::AlreadyWaiting => {
                trace!("<arp> packets already queued for {}", next_hop);
            }
            Enqueued::NewlyWaiting => {
                // Try immediately, the retry sweep takes over one interval later.
                self.issue_request(next_hop);
                self.timers.start(Timer::Retry, self.config.retry_interval);
            }
        }
    }

    fn respond(&mut self, request: &ArpHeader, ack_ip: Ipv4Addr) {
        let reply = ArpHeader::reply(
            self.stack.link_addr(),
            ack_ip,
            request.sender_mac,
            request.sender_ip,
        );
        debug!(
            "<arp> {} is at {}, telling {}",
            ack_ip, reply.sender_mac, request.sender_ip
        );
        self.statistics.replies_tx += 1;
        self.link.send(
            build_arp(&reply).into(),
            request.sender_mac,
            EtherTypes::Arp,
        );
    }

    fn give_up(&mut self, addr: Ipv4Addr, retries: u32) {
        if let Some(dropped) = self.pending.take_and_clear(addr) {
            info!(
                "<arp> giving up on {} after {} retries, dropping {} packets",
                addr,
                retries,
                dropped.len()
            );
            self.statistics.resolutions_failed += 1;
            self.stack.resolution_failed(addr, dropped);
        }
    }
}

impl<S: Stack, L: LinkLayer> Arp<S, L, TimerQueue> {
    /// Fire every expired timer of the built-in timer queue.
    pub fn poll(&mut self) {
        for timer in self.timers.expired() {
            self.on_timer(timer);
        }
    }
}
