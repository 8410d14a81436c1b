use atat::AtatCmd;

use crate::cancel::CancelToken;
use crate::config::IpFamily;
use crate::error::Error;
use crate::port::{PortKind, SerialPort};

/// Modem facade consumed by the bearer.
///
/// Port lookups are non-owning peeks; whether a port is usable is decided by
/// opening it. All AT traffic is funneled through the modem so that commands
/// from different actors are serialized per port — the bearer never talks to
/// a port behind the modem's back.
pub trait Modem {
    type Port: SerialPort;

    fn is_3gpp(&self) -> bool;

    fn is_cdma(&self) -> bool;

    fn is_3gpp_only(&self) -> bool {
        self.is_3gpp() && !self.is_cdma()
    }

    fn is_cdma_only(&self) -> bool {
        self.is_cdma() && !self.is_3gpp()
    }

    /// The primary AT control port.
    fn port_primary(&self) -> Option<Self::Port>;

    /// The secondary AT control port, if the modem exposes one.
    fn port_secondary(&self) -> Option<Self::Port>;

    /// Best port to carry user data, restricted to the given kind.
    fn best_data_port(&self, kind: PortKind) -> Option<Self::Port>;

    /// Best AT port currently usable for control commands.
    fn best_command_port(&self) -> Option<Self::Port>;

    /// IP family used when the bearer config requests `None` or `Any`.
    fn default_ip_family(&self) -> IpFamily;

    /// Issues one AT command on the given port and parses its response.
    ///
    /// The command's own `MAX_TIMEOUT_MS` bounds the wait. Implementations
    /// should fail with [`Error::Cancelled`] when the token fires while the
    /// command is still queued.
    async fn command<C: AtatCmd>(
        &self,
        port: &Self::Port,
        cmd: &C,
        cancel: &CancelToken,
    ) -> Result<C::Response, Error>;

    /// Like [`Modem::command`], but the implementation may serve the reply
    /// from a cache of earlier identical queries. Used for capability ranges
    /// that cannot change at runtime.
    async fn command_cached<C: AtatCmd>(
        &self,
        port: &Self::Port,
        cmd: &C,
        cancel: &CancelToken,
    ) -> Result<C::Response, Error> {
        self.command(port, cmd, cancel).await
    }
}
