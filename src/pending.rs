//! Packets waiting for the resolution of their next hop.
use std::collections::HashMap;
use std::net::Ipv4Addr;

use crate::models::Chain;

/// Outcome of [`PendingQueue::enqueue`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Enqueued {
    /// First packet for this address: the caller must start resolving it.
    NewlyWaiting,
    /// Packets were already queued, a resolution is in progress.
    AlreadyWaiting,
}

#[derive(Debug)]
struct Waiting {
    chain: Chain,
    retries: u32,
}

/// Unresolved addresses and the packets queued for each of them.
///
/// An address is present if and only if at least one packet waits for it.
#[derive(Debug, Default)]
pub struct PendingQueue {
    waiting: HashMap<Ipv4Addr, Waiting>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, ip: Ipv4Addr, chain: Chain) -> Enqueued {
        match self.waiting.get_mut(&ip) {
            Some(waiting) => {
                waiting.chain.append(chain);
                Enqueued::AlreadyWaiting
            }
            None => {
                self.waiting.insert(ip, Waiting { chain, retries: 0 });
                Enqueued::NewlyWaiting
            }
        }
    }

    /// Remove and return every packet waiting for `ip`, in enqueue order.
    pub fn take_and_clear(&mut self, ip: Ipv4Addr) -> Option<Chain> {
        self.waiting.remove(&ip).map(|waiting| waiting.chain)
    }

    pub fn get(&self, ip: Ipv4Addr) -> Option<&Chain> {
        self.waiting.get(&ip).map(|waiting| &waiting.chain)
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.waiting.contains_key(&ip)
    }

    /// Number of retry requests issued for `ip` since it started waiting.
    pub fn retries(&self, ip: Ipv4Addr) -> Option<u32> {
        self.waiting.get(&ip).map(|waiting| waiting.retries)
    }

    /// Count one more retry request for `ip` and return the new total.
    pub fn record_retry(&mut self, ip: Ipv4Addr) -> Option<u32> {
        self.waiting.get_mut(&ip).map(|waiting| {
            waiting.retries += 1;
            waiting.retries
        })
    }

    pub fn addresses(&self) -> Vec<Ipv4Addr> {
        self.waiting.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use crate::models::{Chain, Packet};
    use crate::pending::{Enqueued, PendingQueue};

    const IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

    fn chain(byte: u8) -> Chain {
        Chain::new(Packet::from(vec![byte]))
    }

    #[test]
    fn test_enqueue_and_take() {
        let mut queue = PendingQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.enqueue(IP, chain(1)), Enqueued::NewlyWaiting);
        assert_eq!(queue.enqueue(IP, chain(2)), Enqueued::AlreadyWaiting);
        assert_eq!(queue.addresses(), vec![IP]);

        let taken = queue.take_and_clear(IP).unwrap();
        let order: Vec<u8> = taken.iter().map(|p| p.data()[0]).collect();
        assert_eq!(order, vec![1, 2]);

        assert!(queue.is_empty());
        assert!(queue.take_and_clear(IP).is_none());
        assert_eq!(queue.enqueue(IP, chain(3)), Enqueued::NewlyWaiting);
    }

    #[test]
    fn test_retries() {
        let mut queue = PendingQueue::new();
        assert_eq!(queue.record_retry(IP), None);
        queue.enqueue(IP, chain(1));
        assert_eq!(queue.retries(IP), Some(0));
        assert_eq!(queue.record_retry(IP), Some(1));
        assert_eq!(queue.record_retry(IP), Some(2));
        queue.take_and_clear(IP);
        queue.enqueue(IP, chain(1));
        assert_eq!(queue.retries(IP), Some(0));
    }
}
