//! Prefix table for proxy ARP.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::Ipv4Addr;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ip_network::Ipv4Network;
use ip_network_table::IpNetworkTable;
use log::error;

/// Prefixes on whose behalf the resolver answers requests.
///
/// ```
/// use std::net::Ipv4Addr;
/// use arpcat::proxy::ProxyTable;
///
/// let mut table = ProxyTable::default();
/// table.insert_string("192.0.2.0/24").unwrap();
///
/// assert!(table.contains(Ipv4Addr::new(192, 0, 2, 42)));
/// assert!(!table.contains(Ipv4Addr::new(192, 0, 3, 42)));
/// ```
pub struct ProxyTable {
    table: IpNetworkTable<()>,
}

impl Default for ProxyTable {
    fn default() -> Self {
        ProxyTable {
            table: IpNetworkTable::new(),
        }
    }
}

impl ProxyTable {
    /// Read one prefix per line, ignoring comments (`#`) and invalid lines.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut table = Self::default();
        let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
        BufReader::new(file)
            .lines()
            .flat_map(|line| line.ok())
            .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
            .for_each(|line| match table.insert_string(&line) {
                Ok(_) => {}
                Err(error) => error!("{}: {}", error, line),
            });
        Ok(table)
    }

    /// Insert a prefix such as `192.0.2.0/24`, or a single address.
    pub fn insert_string(&mut self, line: &str) -> Result<()> {
        // If there are multiple columns, take only the first one.
        let first_col = line.split_whitespace().next().context("Empty line")?;
        let elems: Vec<&str> = first_col.split('/').collect();
        let (addr, length) = match elems.as_slice() {
            [addr] => (addr.parse::<Ipv4Addr>()?, 32),
            [addr, length] => (addr.parse::<Ipv4Addr>()?, length.parse::<u8>()?),
            _ => bail!("Invalid prefix"),
        };
        let network = Ipv4Network::new_truncate(addr, length)?;
        self.table.insert(network, ());
        Ok(())
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.table.longest_match(addr).is_some()
    }

    pub fn len(&self) -> usize {
        self.table.len().0
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Turn the table into a predicate for [`crate::resolver::Arp::set_proxy`].
    pub fn into_predicate(self) -> impl Fn(Ipv4Addr) -> bool {
        move |addr| self.contains(addr)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::Ipv4Addr;

    use tempfile::NamedTempFile;

    use crate::proxy::ProxyTable;

    #[test]
    fn test_insert_string() {
        let mut table = ProxyTable::default();
        assert!(table.is_empty());
        table.insert_string("10.1.0.0/16 via eth1").unwrap();
        table.insert_string("10.2.3.4").unwrap();
        assert!(table.insert_string("10.2.3.4/8/1").is_err());
        assert!(table.insert_string("not-an-ip/8").is_err());
        assert!(table.insert_string("   ").is_err());
        assert_eq!(table.len(), 2);

        let predicate = table.into_predicate();
        assert!(predicate(Ipv4Addr::new(10, 1, 200, 1)));
        assert!(predicate(Ipv4Addr::new(10, 2, 3, 4)));
        assert!(!predicate(Ipv4Addr::new(10, 2, 3, 5)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# proxied prefixes").unwrap();
        writeln!(file, "192.0.2.0/24").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "198.51.100.7 lab host").unwrap();
        writeln!(file, "192.0.2.0/33").unwrap();
        writeln!(file, "garbage").unwrap();
        file.flush().unwrap();

        let table = ProxyTable::from_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.contains(Ipv4Addr::new(192, 0, 2, 200)));
        assert!(table.contains(Ipv4Addr::new(198, 51, 100, 7)));
        assert!(!table.contains(Ipv4Addr::new(198, 51, 100, 8)));
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ProxyTable::from_file(&dir.path().join("missing.txt")).is_err());
    }
}
