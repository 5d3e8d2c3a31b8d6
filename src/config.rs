//! Resolver configuration.
use std::fmt::{Display, Formatter};
use std::time::Duration;

use pnet::util::MacAddr;

pub struct Config {
    /// Maximum age of a cache entry before the flush sweep evicts it.
    pub cache_ttl: Duration,
    /// Interval between two flush sweeps.
    pub flush_interval: Duration,
    /// Interval between two retry sweeps.
    pub retry_interval: Duration,
    /// Number of retry requests before a pending address is given up (unlimited by default).
    pub max_retries: Option<u32>,
    /// Send every non-broadcast packet to this MAC address, without resolution.
    pub passthrough: Option<MacAddr>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_ttl: Duration::from_secs(5 * 60),
            flush_interval: Duration::from_secs(5 * 60),
            retry_interval: Duration::from_secs(1),
            max_retries: None,
            passthrough: None,
        }
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "cache_ttl={:?}", self.cache_ttl)?;
        write!(f, " flush_interval={:?}", self.flush_interval)?;
        write!(f, " retry_interval={:?}", self.retry_interval)?;
        write!(f, " max_retries={:?}", self.max_retries)?;
        write!(
            f,
            " passthrough={:?}",
            self.passthrough.map(|mac| mac.to_string())
        )
    }
}
