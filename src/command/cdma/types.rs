//! Argument and parameter types used by CDMA Rm interface Commands and
//! Responses

/// Rm interface protocol between the host and a CDMA modem.
///
/// The +CRM index is the variant position minus one; `Unknown` has no wire
/// representation and means "keep whatever the modem currently uses".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RmProtocol {
    #[default]
    Unknown,
    /// Asynchronous data or fax.
    Async,
    /// Packet data service, relay layer Rm interface.
    PacketRelay,
    /// Packet data service, network layer Rm interface, PPP.
    PacketNetworkPpp,
    /// Packet data service, network layer Rm interface, SLIP.
    PacketNetworkSlip,
    /// STU-III service.
    StuIii,
}

impl RmProtocol {
    /// The +CRM index selecting this protocol, `None` for `Unknown`.
    pub fn crm_index(self) -> Option<u8> {
        match self {
            RmProtocol::Unknown => None,
            RmProtocol::Async => Some(0),
            RmProtocol::PacketRelay => Some(1),
            RmProtocol::PacketNetworkPpp => Some(2),
            RmProtocol::PacketNetworkSlip => Some(3),
            RmProtocol::StuIii => Some(4),
        }
    }

    pub fn from_crm_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(RmProtocol::Async),
            1 => Some(RmProtocol::PacketRelay),
            2 => Some(RmProtocol::PacketNetworkPpp),
            3 => Some(RmProtocol::PacketNetworkSlip),
            4 => Some(RmProtocol::StuIii),
            _ => None,
        }
    }

    /// Human-readable name, used in capability error messages.
    pub fn name(self) -> &'static str {
        match self {
            RmProtocol::Unknown => "unknown",
            RmProtocol::Async => "asynchronous",
            RmProtocol::PacketRelay => "packet-relay",
            RmProtocol::PacketNetworkPpp => "packet-network-ppp",
            RmProtocol::PacketNetworkSlip => "packet-network-slip",
            RmProtocol::StuIii => "stu-iii",
        }
    }
}
