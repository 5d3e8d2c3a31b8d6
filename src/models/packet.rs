use std::slice::Iter;
use std::vec::IntoIter;

/// An outbound network-layer packet, without its link-layer header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Packet {
    data: Vec<u8>,
}

impl Packet {
    pub fn new(data: Vec<u8>) -> Self {
        Packet { data }
    }

    /// A zero-filled packet of `size` bytes.
    pub fn zeroed(size: usize) -> Self {
        Packet {
            data: vec![0u8; size],
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for Packet {
    fn from(data: Vec<u8>) -> Self {
        Packet::new(data)
    }
}

impl From<&[u8]> for Packet {
    fn from(data: &[u8]) -> Self {
        Packet::new(data.to_vec())
    }
}

/// An ordered, non-empty sequence of packets handed to the link layer in one call.
///
/// ```
/// use arpcat::models::{Chain, Packet};
///
/// let mut chain = Chain::new(Packet::from(vec![1]));
/// chain.chain(Packet::from(vec![2]));
///
/// let first: Vec<u8> = chain.iter().flat_map(|p| p.data().to_vec()).collect();
/// assert_eq!(first, vec![1, 2]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chain {
    packets: Vec<Packet>,
}

impl Chain {
    pub fn new(head: Packet) -> Self {
        Chain {
            packets: vec![head],
        }
    }

    /// Append a packet at the tail of the chain.
    pub fn chain(&mut self, packet: Packet) {
        self.packets.push(packet);
    }

    /// Append every packet of `other`, keeping its order.
    pub fn append(&mut self, other: Chain) {
        self.packets.extend(other.packets);
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    // A chain always holds at least one packet.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn first(&self) -> &Packet {
        &self.packets[0]
    }

    pub fn iter(&self) -> Iter<'_, Packet> {
        self.packets.iter()
    }

    /// Total number of bytes in the chain.
    pub fn size(&self) -> usize {
        self.packets.iter().map(Packet::len).sum()
    }

    pub fn into_packets(self) -> Vec<Packet> {
        self.packets
    }
}

impl From<Packet> for Chain {
    fn from(packet: Packet) -> Self {
        Chain::new(packet)
    }
}

impl IntoIterator for Chain {
    type Item = Packet;
    type IntoIter = IntoIter<Packet>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.into_iter()
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Packet;
    type IntoIter = Iter<'a, Packet>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Chain, Packet};

    #[test]
    fn test_chain_append_keeps_order() {
        let mut chain = Chain::new(Packet::from(vec![1]));
        let mut other = Chain::new(Packet::from(vec![2, 2]));
        other.chain(Packet::from(vec![3, 3, 3]));
        chain.append(other);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.size(), 6);
        let heads: Vec<u8> = chain.into_iter().map(|p| p.data()[0]).collect();
        assert_eq!(heads, vec![1, 2, 3]);
    }
}
