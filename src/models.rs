//! Data structures for representing ARP headers and outbound packets.
mod header;
mod packet;
mod protocols;

pub use header::*;
pub use packet::*;
pub use protocols::*;
