use crate::port::PortError;

/// Errors reported by the bearer pipelines.
///
/// The variants map one-to-one onto the failure classes the surrounding
/// daemon distinguishes: re-entry, argument validation, cooperative
/// cancellation, port acquisition, modem command failures and port
/// line-discipline failures.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// `connect` called while a session is already established, or the
    /// primary AT port is still in data mode.
    AlreadyConnected,
    /// `disconnect` or a status query without an established session.
    NotConnected,
    /// APN/capability mismatch, unsupported IP family or RM protocol.
    InvalidArgs(&'static str),
    /// Cancellation observed before the point of no return.
    Cancelled,
    /// No usable primary/data port, or the data port could not be opened.
    PortUnavailable,
    /// AT command failure as reported by the command channel.
    At(atat::Error),
    /// Dial failure enriched with the `+CEER` extended report text.
    Dial(heapless::String<64>),
    /// The bearer's PDP context was missing from a `+CGACT?` listing.
    ContextNotFound,
    /// A response carried the expected tag but did not parse.
    Parse,
    /// The modem declared the queried feature unsupported.
    NotSupported,
    /// Serial port operation failure (reopen and flash errors end up here).
    Port(PortError),
}

impl From<atat::Error> for Error {
    fn from(e: atat::Error) -> Self {
        Error::At(e)
    }
}

impl From<PortError> for Error {
    fn from(e: PortError) -> Self {
        Error::Port(e)
    }
}
