//! The IPv4 to MAC address cache.
use std::collections::hash_map::{Entry, Iter};
use std::collections::HashMap;
use std::io::Write;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use anyhow::Result;
use pnet::util::MacAddr;
use serde::Serialize;

/// A cached mapping and the instant it was last confirmed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    mac: MacAddr,
    timestamp: Instant,
}

impl CacheEntry {
    pub fn new(mac: MacAddr, timestamp: Instant) -> Self {
        CacheEntry { mac, timestamp }
    }

    pub fn mac(&self) -> MacAddr {
        self.mac
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.timestamp)
    }

    /// An entry is expired once it is strictly older than `ttl`.
    pub fn expired(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) > ttl
    }

    fn update(&mut self, now: Instant) {
        self.timestamp = now;
    }
}

/// What [`ArpCache::insert_or_update`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CacheUpdate {
    /// No entry existed for this address.
    Inserted,
    /// An entry existed with another MAC address and was discarded.
    Replaced { previous: MacAddr },
    /// An entry existed with the same MAC address, its timestamp was refreshed.
    Refreshed,
}

#[derive(Debug, Default)]
pub struct ArpCache {
    entries: HashMap<Ipv4Addr, CacheEntry>,
}

impl ArpCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.entries.get(&ip).map(CacheEntry::mac)
    }

    pub fn get(&self, ip: Ipv4Addr) -> Option<&CacheEntry> {
        self.entries.get(&ip)
    }

    /// Record that `ip` is at `mac`.
    ///
    /// The most recent sighting always wins: an entry with a different MAC
    /// address is replaced outright, never merged.
    pub fn insert_or_update(&mut self, ip: Ipv4Addr, mac: MacAddr, now: Instant) -> CacheUpdate {
        match self.entries.entry(ip) {
            Entry::Occupied(mut entry) => {
                let previous = entry.get().mac();
                if previous != mac {
                    entry.insert(CacheEntry::new(mac, now));
                    CacheUpdate::Replaced { previous }
                } else {
                    entry.get_mut().update(now);
                    CacheUpdate::Refreshed
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(CacheEntry::new(mac, now));
                CacheUpdate::Inserted
            }
        }
    }

    /// Remove every entry older than `ttl`; return whether entries remain.
    pub fn evict_expired(&mut self, now: Instant, ttl: Duration) -> bool {
        self.entries.retain(|_, entry| !entry.expired(now, ttl));
        !self.entries.is_empty()
    }

    pub fn remove(&mut self, ip: Ipv4Addr) -> Option<CacheEntry> {
        self.entries.remove(&ip)
    }

    pub fn clear(&mut self) {
        self.entries.clear()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, Ipv4Addr, CacheEntry> {
        self.entries.iter()
    }

    /// Write the cache as CSV (`ip_addr,mac_addr,age_ms`), sorted by address.
    pub fn write_csv<W: Write>(&self, writer: W, now: Instant) -> Result<()> {
        let mut records: Vec<CacheRecord> = self
            .entries
            .iter()
            .map(|(ip, entry)| CacheRecord {
                ip_addr: *ip,
                mac_addr: entry.mac().to_string(),
                age_ms: entry.age(now).as_millis() as u64,
            })
            .collect();
        records.sort_by_key(|record| record.ip_addr);

        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(writer);
        for record in records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct CacheRecord {
    ip_addr: Ipv4Addr,
    mac_addr: String,
    age_ms: u64,
}
