//! Resolve the MAC address of IPv4 hosts on the local network.
//!
//! Requests for the unresolved targets are broadcast every retry interval.
//! Every ARP packet seen on the interface feeds the resolver cache, which is
//! written as CSV on exit.
//!
//! The resolver only queues outbound packets, and this tool has none to send,
//! so the request rounds are paced here from the resolver's `retry_interval`
//! and `max_retries` instead of its retry sweep.
use std::io::stdout;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use arpcat::config::Config;
use arpcat::datalink::{demux, next_frame, open, Host};
use arpcat::proxy::ProxyTable;
use arpcat::resolver::Arp;
use arpcat::stack::Stack;
use arpcat::timers::{TimerQueue, Timers};
use arpcat::utilities::{configure_logger, exit_process_on_panic, get_default_interface};
use clap::Parser;
use log::{info, warn, LevelFilter};
use pnet::packet::ethernet::EtherTypes;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Addresses to resolve.
    #[arg(required = true)]
    targets: Vec<Ipv4Addr>,
    /// Interface on which to send the requests.
    #[arg(short = 'z', long, default_value_t = get_default_interface())]
    interface: String,
    /// Source address of the requests (interface address by default).
    #[arg(short = 's', long)]
    src_addr: Option<Ipv4Addr>,
    /// Time in seconds to wait for all the targets to be resolved.
    #[arg(short = 'W', long, default_value_t = 5)]
    timeout: u64,
    /// Time in milliseconds between two requests for the same target.
    #[arg(short = 'r', long, default_value_t = 1000)]
    retry_interval: u64,
    /// Stop sending requests after this many retries (unlimited by default).
    #[arg(short = 'n', long)]
    max_retries: Option<u32>,
    /// Answer requests for the prefixes listed in this file (proxy ARP).
    #[arg(long)]
    proxy_prefixes_file: Option<PathBuf>,
    /// Minimum log level.
    #[arg(short = 'L', long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

/// Pacing of the request rounds: one immediately, then one retry per
/// `retry_interval` until `max_retries` is reached.
struct Rounds {
    retry_interval: Duration,
    max_retries: Option<u32>,
    next: Instant,
    retries: Option<u32>,
}

impl Rounds {
    fn new(config: &Config, start: Instant) -> Self {
        Rounds {
            retry_interval: config.retry_interval,
            max_retries: config.max_retries,
            next: start,
            retries: None,
        }
    }

    /// Whether a round of requests must be sent at `now`; records it if so.
    fn due(&mut self, now: Instant) -> bool {
        let exhausted = matches!(
            (self.retries, self.max_retries),
            (Some(retries), Some(max)) if retries >= max
        );
        if exhausted || now < self.next {
            return false;
        }
        self.retries = Some(self.retries.map_or(0, |retries| retries + 1));
        self.next += self.retry_interval;
        true
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    configure_logger(args.log_level);
    exit_process_on_panic();

    let config = Config {
        retry_interval: Duration::from_millis(args.retry_interval),
        max_retries: args.max_retries,
        ..Default::default()
    };
    info!("interface={} {}", args.interface, config);

    let host = Host::from_interface(&args.interface, args.src_addr)?;
    let (link, mut rx) = open(&args.interface, Duration::from_millis(50))?;
    let mut arp = Arp::new(host, link, TimerQueue::new(), config);

    if let Some(path) = args.proxy_prefixes_file {
        let table = ProxyTable::from_file(&path)?;
        info!("proxying {} prefixes", table.len());
        arp.set_proxy(table.into_predicate());
    }

    let mut targets = args.targets.clone();
    targets.sort();
    targets.dedup();

    let mut rounds = Rounds::new(arp.config(), Instant::now());
    let deadline = Instant::now() + Duration::from_secs(args.timeout);

    loop {
        let unresolved: Vec<Ipv4Addr> = targets
            .iter()
            .copied()
            .filter(|target| arp.lookup(*target).is_none())
            .collect();
        if unresolved.is_empty() || Instant::now() >= deadline {
            break;
        }

        if rounds.due(Instant::now()) {
            unresolved
                .iter()
                .for_each(|target| arp.issue_request(*target));
        }

        if let Some(frame) = next_frame(rx.as_mut())? {
            if let Some((EtherTypes::Arp, payload)) = demux(frame) {
                arp.receive(payload);
            }
        }
        arp.poll();
    }

    for target in &targets {
        if arp.lookup(*target).is_none() {
            warn!("{}: no reply from {}", arp.stack().ifname(), target);
        }
    }

    arp.cache().write_csv(stdout().lock(), arp.timers().now())?;
    info!("{}", arp.statistics());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use arpcat::config::Config;

    use crate::Rounds;

    #[test]
    fn test_rounds() {
        let config = Config {
            retry_interval: Duration::from_millis(500),
            max_retries: Some(2),
            ..Default::default()
        };
        let start = Instant::now();
        let mut rounds = Rounds::new(&config, start);

        assert!(rounds.due(start));
        assert!(!rounds.due(start + Duration::from_millis(499)));
        assert!(rounds.due(start + Duration::from_millis(500)));
        assert!(rounds.due(start + Duration::from_millis(1000)));
        // Two retries after the first round, then nothing.
        assert!(!rounds.due(start + Duration::from_millis(1500)));
        assert!(!rounds.due(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_rounds_unbounded() {
        let start = Instant::now();
        let mut rounds = Rounds::new(&Config::default(), start);
        for i in 0..20 {
            assert!(rounds.due(start + Duration::from_secs(i)));
        }
    }
}
