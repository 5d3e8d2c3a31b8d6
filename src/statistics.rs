//! Counters of a resolver.
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct ArpStatistics {
    pub requests_rx: u64,
    pub requests_tx: u64,
    pub replies_rx: u64,
    pub replies_tx: u64,
    /// Payloads rejected by the parser.
    pub malformed_rx: u64,
    /// Pending addresses dropped after exhausting their retries.
    pub resolutions_failed: u64,
}

impl ArpStatistics {
    /// Counters named `<ifname>.arp.<counter>`.
    pub fn counters(&self, ifname: &str) -> Vec<(String, u64)> {
        [
            ("requests_rx", self.requests_rx),
            ("requests_tx", self.requests_tx),
            ("replies_rx", self.replies_rx),
            ("replies_tx", self.replies_tx),
            ("malformed_rx", self.malformed_rx),
            ("resolutions_failed", self.resolutions_failed),
        ]
        .into_iter()
        .map(|(name, value)| (format!("{ifname}.arp.{name}"), value))
        .collect()
    }
}

impl Display for ArpStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "requests_rx={} requests_tx={} replies_rx={} replies_tx={} malformed_rx={} resolutions_failed={}",
            self.requests_rx,
            self.requests_tx,
            self.replies_rx,
            self.replies_tx,
            self.malformed_rx,
            self.resolutions_failed
        )
    }
}
