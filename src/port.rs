use embassy_time::Duration;

/// What kind of device a data port is; decides the IP method handed to the
/// host (PPP over an AT-capable TTY, DHCP over a network interface).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortKind {
    At,
    Net,
}

/// DTE flow control applied to a port while it is in data mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowControl {
    #[default]
    None,
    /// XON/XOFF software flow control.
    XonXoff,
    /// RTS/CTS hardware flow control.
    RtsCts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum PortError {
    /// The device could not be opened.
    OpenFailed,
    /// Close-all/open-all cycle failed; the port is in an unknown state.
    ReopenFailed,
    /// The DTR flash did not complete.
    FlashFailed,
    /// Carrier dropped during a flash; expected while disconnecting.
    CarrierLost,
    /// The line-discipline change was rejected.
    FlowControl,
    /// Init-sequence replay failed.
    InitSequence,
}

/// Serial port facade.
///
/// Ports are owned by the modem object; a handle is a cheap, cloneable
/// relation plus a reference count on opens. Every `open` must be matched by
/// exactly one `close`, on every exit path.
///
/// The `connected` flag is single-writer: it is owned by whatever pipeline
/// currently holds the port, and is true iff the TTY is in raw data mode.
pub trait SerialPort: Clone {
    fn kind(&self) -> PortKind;

    /// Device name, for diagnostics only.
    fn device(&self) -> &str;

    /// Adds one reference to the port's open count, opening the device on
    /// the first one.
    fn open(&self) -> Result<(), PortError>;

    /// Releases one open reference.
    fn close(&self);

    /// Closes all outstanding opens and opens them again after `delay`.
    /// Used to recover a TTY whose open count diverged while in data mode.
    async fn reopen(&self, delay: Duration) -> Result<(), PortError>;

    /// Drops DTR for `duration` to signal the modem out of data mode.
    async fn flash(&self, duration: Duration) -> Result<(), PortError>;

    fn set_flow_control(&self, flow_control: FlowControl) -> Result<(), PortError>;

    fn get_connected(&self) -> bool;

    fn set_connected(&self, connected: bool);

    /// Whether the saved AT init sequence is replayed automatically when the
    /// port is (re)opened.
    fn set_init_sequence_enabled(&self, enabled: bool);

    /// Replays the port's saved AT init sequence.
    async fn run_init_sequence(&self) -> Result<(), PortError>;
}
