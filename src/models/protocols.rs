use pnet::packet::arp::{ArpOperation, ArpOperations};
use strum::Display;

/// ARP operation code.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Opcode {
    /// Who has `target_ip`? Tell `sender_ip`.
    Request,
    /// `sender_ip` is at `sender_mac`.
    Reply,
    /// Anything else, kept so that the sender can still be cached.
    Unknown(u16),
}

impl From<u16> for Opcode {
    fn from(value: u16) -> Self {
        match ArpOperation::new(value) {
            ArpOperations::Request => Opcode::Request,
            ArpOperations::Reply => Opcode::Reply,
            _ => Opcode::Unknown(value),
        }
    }
}

impl From<Opcode> for ArpOperation {
    fn from(value: Opcode) -> Self {
        match value {
            Opcode::Request => ArpOperations::Request,
            Opcode::Reply => ArpOperations::Reply,
            Opcode::Unknown(other) => ArpOperation::new(other),
        }
    }
}

impl From<Opcode> for u16 {
    fn from(value: Opcode) -> Self {
        let val: ArpOperation = value.into();
        val.0
    }
}
