//! Timers driving the cache eviction and resolution retry sweeps.
use std::collections::HashMap;
use std::time::{Duration, Instant};

use strum::{Display, EnumString};

/// The two sweeps of a resolver.
#[derive(Copy, Clone, Debug, Display, EnumString, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Timer {
    /// Evicts expired cache entries.
    Flush,
    /// Re-issues requests for pending addresses.
    Retry,
}

/// The timer facility used by the resolver.
///
/// Timers are one-shot: once fired, a timer is no longer running until it is
/// started again. Starting a running timer re-arms it.
pub trait Timers {
    fn now(&self) -> Instant;
    fn start(&mut self, timer: Timer, after: Duration);
    fn stop(&mut self, timer: Timer);
    fn is_running(&self, timer: Timer) -> bool;
}

/// A deadline queue, polled by the owner of the event loop.
///
/// ```
/// use std::time::{Duration, Instant};
/// use arpcat::timers::{Timer, TimerQueue, Timers};
///
/// let mut timers = TimerQueue::manual(Instant::now());
/// timers.start(Timer::Retry, Duration::from_secs(1));
/// assert!(timers.expired().is_empty());
///
/// timers.advance(Duration::from_secs(1));
/// assert_eq!(timers.expired(), vec![Timer::Retry]);
/// assert!(!timers.is_running(Timer::Retry));
/// ```
#[derive(Debug, Default)]
pub struct TimerQueue {
    // Frozen clock, `None` to use the system monotonic clock.
    manual: Option<Instant>,
    deadlines: HashMap<Timer, Instant>,
}

impl TimerQueue {
    /// A timer queue following the system monotonic clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// A timer queue whose clock only moves with [`TimerQueue::advance`].
    pub fn manual(start: Instant) -> Self {
        TimerQueue {
            manual: Some(start),
            deadlines: HashMap::new(),
        }
    }

    /// Move a manual clock forward. No effect on a system clock.
    pub fn advance(&mut self, by: Duration) {
        if let Some(now) = self.manual.as_mut() {
            *now += by;
        }
    }

    pub fn deadline(&self, timer: Timer) -> Option<Instant> {
        self.deadlines.get(&timer).copied()
    }

    /// The earliest deadline, if any timer is running.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Time left until the earliest deadline, zero if it already passed.
    pub fn time_to_next(&self) -> Option<Duration> {
        let now = self.now();
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Remove and return the timers whose deadline has passed, earliest first.
    pub fn expired(&mut self) -> Vec<Timer> {
        let now = self.now();
        let mut fired: Vec<(Instant, Timer)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(timer, deadline)| (*deadline, *timer))
            .collect();
        fired.sort_by_key(|(deadline, _)| *deadline);
        for (_, timer) in &fired {
            self.deadlines.remove(timer);
        }
        fired.into_iter().map(|(_, timer)| timer).collect()
    }
}

impl Timers for TimerQueue {
    fn now(&self) -> Instant {
        self.manual.unwrap_or_else(Instant::now)
    }

    fn start(&mut self, timer: Timer, after: Duration) {
        let deadline = self.now() + after;
        self.deadlines.insert(timer, deadline);
    }

    fn stop(&mut self, timer: Timer) {
        self.deadlines.remove(&timer);
    }

    fn is_running(&self, timer: Timer) -> bool {
        self.deadlines.contains_key(&timer)
    }
}
