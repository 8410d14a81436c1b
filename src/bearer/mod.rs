//! The broadband bearer: one cellular packet-data session on a modem driven
//! over its AT channel.
//!
//! A bearer cycles through connect/disconnect over the modem's shared
//! serial ports. Connecting negotiates either a 3GPP PDP context or a CDMA
//! data call, leaves the data port's TTY in raw data mode and tells the
//! host how to configure IP on it; disconnecting deactivates the context
//! and reverts the TTY to command mode.

pub mod cdma;
pub mod ops;
pub mod threegpp;

pub use ops::{BearerOps, Generic};

use core::cell::RefCell;
use core::future::poll_fn;
use core::net::IpAddr;
use core::task::Poll;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::WakerRegistration;
use embassy_time::Duration;
use heapless::Vec;

use crate::cancel::CancelToken;
use crate::command::psn::types::{ContextId, PDPContextStatus};
use crate::command::psn::GetPDPContextState;
use crate::config::BearerConfig;
use crate::error::Error;
use crate::modem::Modem;
use crate::port::{FlowControl, PortError, PortKind, SerialPort};

/// How the host is expected to obtain IP configuration on the data port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IpMethod {
    Ppp,
    Dhcp,
    Static,
}

/// IP configuration for one address family, handed upward on connect.
///
/// The generic pipelines only ever pick the method; addressing is filled in
/// by vendor IP-config strategies that can query it from the modem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpConfig {
    pub method: IpMethod,
    pub address: Option<IpAddr>,
    pub prefix: Option<u8>,
    pub gateway: Option<IpAddr>,
    pub dns: Vec<IpAddr, 3>,
}

impl IpConfig {
    pub fn new(method: IpMethod) -> Self {
        Self {
            method,
            address: None,
            prefix: None,
            gateway: None,
            dns: Vec::new(),
        }
    }
}

/// Successful connect outcome: the bound data port plus at least one
/// per-family IP configuration.
#[derive(Debug, Clone)]
pub struct ConnectResult<P> {
    pub data_port: P,
    pub ipv4: Option<IpConfig>,
    pub ipv6: Option<IpConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionType {
    None,
    ThreeGpp,
    Cdma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionStatus {
    Unknown,
    Connected,
    Disconnected,
}

struct Session<P> {
    data_port: Option<P>,
    connection_type: ConnectionType,
    cid: u8,
    status: ConnectionStatus,
    status_waker: WakerRegistration,
}

/// A single packet-data session on `modem`.
///
/// The bearer never owns its ports; it holds a relation to modem-owned
/// objects plus exactly one open on the data port between dial and
/// disconnect.
pub struct Bearer<'a, M: Modem, O: BearerOps<M> = Generic> {
    modem: &'a M,
    config: BearerConfig,
    flow_control: FlowControl,
    ops: O,
    shared: Mutex<NoopRawMutex, RefCell<Session<M::Port>>>,
}

impl<'a, M: Modem> Bearer<'a, M> {
    /// Creates a bearer using the generic connection strategies.
    ///
    /// `flow_control` is inherited from the modem and stays fixed for the
    /// bearer's lifetime. The bearer is not usable until [`Bearer::init`]
    /// has completed.
    pub fn new(modem: &'a M, config: BearerConfig, flow_control: FlowControl) -> Self {
        Self::with_ops(modem, config, flow_control, Generic)
    }
}

impl<'a, M: Modem, O: BearerOps<M>> Bearer<'a, M, O> {
    /// Creates a bearer whose pipeline steps are partially replaced by a
    /// vendor strategy.
    pub fn with_ops(
        modem: &'a M,
        config: BearerConfig,
        flow_control: FlowControl,
        ops: O,
    ) -> Self {
        Self {
            modem,
            config,
            flow_control,
            ops,
            shared: Mutex::new(RefCell::new(Session {
                data_port: None,
                connection_type: ConnectionType::None,
                cid: 0,
                status: ConnectionStatus::Unknown,
                status_waker: WakerRegistration::new(),
            })),
        }
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut Session<M::Port>) -> R) -> R {
        self.shared.lock(|s| f(&mut s.borrow_mut()))
    }

    /// Current 3GPP context identifier, 0 while none is assigned.
    pub fn cid(&self) -> u8 {
        self.with_session(|s| s.cid)
    }

    pub fn flow_control(&self) -> FlowControl {
        self.flow_control
    }

    pub fn connection_type(&self) -> ConnectionType {
        self.with_session(|s| s.connection_type)
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.with_session(|s| s.status)
    }

    /// One-shot capability gate run before the bearer is published.
    ///
    /// When the modem is CDMA-capable and the config pins a specific Rm
    /// protocol, the supported `+CRM` range is checked up front so that an
    /// impossible configuration fails here instead of at dial time.
    pub async fn init(&self) -> Result<(), Error> {
        let primary = self.modem.port_primary().ok_or(Error::PortUnavailable)?;
        primary.open().map_err(|_| Error::PortUnavailable)?;
        let result = self.check_rm_protocol_support(&primary).await;
        primary.close();
        result
    }

    async fn check_rm_protocol_support(&self, primary: &M::Port) -> Result<(), Error> {
        let requested = self.config.rm_protocol;
        let index = match requested.crm_index() {
            Some(index) if self.modem.is_cdma() => index,
            _ => return Ok(()),
        };

        let reply = self
            .modem
            .command_cached(primary, &crate::command::cdma::GetRmProtocolRange, &CancelToken::new())
            .await?;

        if !reply.range.contains(index) {
            error!(
                "Requested RM protocol '{}' is not supported",
                requested.name()
            );
            return Err(Error::InvalidArgs("requested RM protocol is not supported"));
        }

        Ok(())
    }

    /// Establishes the session.
    ///
    /// Chooses the 3GPP path when the modem is 3GPP-capable and an APN is
    /// configured (an empty APN counts: the modem may substitute the
    /// subscription default), the CDMA path when the modem is CDMA-capable
    /// and no APN is configured. On failure nothing is mutated.
    pub async fn connect(
        &self,
        cancel: &CancelToken,
    ) -> Result<ConnectResult<M::Port>, Error> {
        if self.with_session(|s| s.data_port.is_some()) {
            return Err(Error::AlreadyConnected);
        }

        let primary = self.modem.port_primary().ok_or(Error::PortUnavailable)?;
        if primary.get_connected() {
            return Err(Error::AlreadyConnected);
        }

        let apn = self.config.apn.as_deref();
        if self.modem.is_3gpp_only() && apn.is_none() {
            return Err(Error::InvalidArgs("3GPP connection logic requires APN setting"));
        }
        if self.modem.is_cdma_only() && apn.is_some() {
            return Err(Error::InvalidArgs("3GPP2 doesn't support APN setting"));
        }

        let (result, connection_type) = match apn {
            Some(apn) if self.modem.is_3gpp() => {
                debug!("Launching 3GPP connection attempt with APN '{}'", apn);
                (
                    self.connect_3gpp(&primary, apn, cancel).await?,
                    ConnectionType::ThreeGpp,
                )
            }
            None if self.modem.is_cdma() => {
                debug!("Launching 3GPP2 connection attempt");
                (
                    self.ops
                        .connect_cdma(self.modem, &primary, &self.config, self.flow_control, cancel)
                        .await?,
                    ConnectionType::Cdma,
                )
            }
            _ => unreachable!(),
        };

        // For ATD based connections the port is already marked connected;
        // doing it again is harmless.
        result.data_port.set_connected(true);
        self.with_session(|s| {
            s.data_port = Some(result.data_port.clone());
            s.connection_type = connection_type;
            s.status = ConnectionStatus::Connected;
            s.status_waker.wake();
        });

        Ok(result)
    }

    async fn connect_3gpp(
        &self,
        primary: &M::Port,
        apn: &str,
        cancel: &CancelToken,
    ) -> Result<ConnectResult<M::Port>, Error> {
        // Clear any leftover cid on every connection attempt.
        self.with_session(|s| s.cid = 0);

        let ip_family = self
            .config
            .ip_family
            .resolve(self.modem.default_ip_family());

        let cid = self
            .ops
            .cid_selection_3gpp(self.modem, primary, apn, ip_family, cancel)
            .await?;

        // Keep the cid around from here on so unsolicited PDP activation
        // events can be matched against it.
        self.with_session(|s| s.cid = cid.0);

        let data = match self
            .ops
            .dial_3gpp(self.modem, primary, cid, self.flow_control, cancel)
            .await
        {
            Ok(data) => data,
            Err(e) => {
                self.with_session(|s| s.cid = 0);
                return Err(e);
            }
        };

        let secondary = self.modem.port_secondary();
        match self
            .ops
            .get_ip_config_3gpp(
                self.modem,
                primary,
                secondary.as_ref(),
                &data,
                cid,
                ip_family,
                cancel,
            )
            .await
        {
            Ok((ipv4, ipv6)) => Ok(ConnectResult {
                data_port: data,
                ipv4,
                ipv6,
            }),
            Err(e) => {
                // Past the dial, failures still have to give the open back,
                // and the cid goes with it.
                data.close();
                self.with_session(|s| s.cid = 0);
                Err(e)
            }
        }
    }

    /// Tears the session down.
    ///
    /// On any fatal reversion error the session state is left untouched so
    /// the caller can retry or force-drop; on success the session is reset.
    pub async fn disconnect(&self) -> Result<(), Error> {
        let (data, connection_type, cid) =
            self.with_session(|s| (s.data_port.clone(), s.connection_type, s.cid));
        let data = data.ok_or(Error::NotConnected)?;

        let primary = self.modem.port_primary().ok_or(Error::PortUnavailable)?;
        let secondary = self.modem.port_secondary();

        match connection_type {
            ConnectionType::ThreeGpp => {
                let cid = (cid > 0).then_some(ContextId(cid));
                self.ops
                    .disconnect_3gpp(
                        self.modem,
                        &primary,
                        secondary.as_ref(),
                        &data,
                        cid,
                        self.flow_control,
                    )
                    .await?
            }
            ConnectionType::Cdma => {
                self.ops
                    .disconnect_cdma(self.modem, &primary, &data, self.flow_control)
                    .await?
            }
            ConnectionType::None => unreachable!(),
        }

        self.reset();
        self.with_session(|s| {
            s.status = ConnectionStatus::Disconnected;
            s.status_waker.wake();
        });

        Ok(())
    }

    /// Queries the modem for the activation state of the bearer's context.
    pub async fn load_connection_status(&self) -> Result<ConnectionStatus, Error> {
        let cid = self.with_session(|s| s.cid);
        if cid == 0 {
            return Err(Error::NotConnected);
        }

        let port = self.modem.best_command_port().ok_or(Error::NotSupported)?;
        let states = self
            .modem
            .command(&port, &GetPDPContextState, &CancelToken::new())
            .await?;

        for state in states.iter() {
            if state.cid.0 == cid {
                return Ok(if state.status == PDPContextStatus::Activated {
                    ConnectionStatus::Connected
                } else {
                    ConnectionStatus::Disconnected
                });
            }
        }

        Err(Error::ContextNotFound)
    }

    /// Push-side status input, fed from unsolicited modem events.
    ///
    /// A reported disconnect resets the session before watchers are woken,
    /// regardless of any operation in flight.
    pub fn report_connection_status(&self, status: ConnectionStatus) {
        if status == ConnectionStatus::Disconnected {
            self.reset();
        }
        self.with_session(|s| {
            s.status = status;
            s.status_waker.wake();
        });
    }

    /// Completes when the connection status changes, returning the new one.
    pub async fn wait_connection_status_change(&self) -> ConnectionStatus {
        let old = self.with_session(|s| s.status);
        poll_fn(|cx| {
            self.shared.lock(|s| {
                let s = &mut *s.borrow_mut();
                if s.status != old {
                    Poll::Ready(s.status)
                } else {
                    s.status_waker.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }

    /// Resets the session before the bearer is dropped.
    pub fn dispose(self) {
        self.reset();
    }

    /// Sole cleanup path: clears the data port (marking it disconnected),
    /// the connection type and the cid. Idempotent, so a reported
    /// disconnect racing a status query cannot double-release anything.
    fn reset(&self) {
        self.with_session(|s| {
            if let Some(port) = s.data_port.take() {
                port.set_connected(false);
            }
            s.connection_type = ConnectionType::None;
            s.cid = 0;
        });
    }
}

/// Grabs the port a generic (AT-based) connection will dial on: the best AT
/// data port, or the primary port for modems whose probed data port is a
/// net device the generic path cannot drive. The returned port carries one
/// open.
pub(crate) fn acquire_at_data_port<M: Modem>(modem: &M) -> Result<M::Port, Error> {
    let data = match modem.best_data_port(PortKind::At) {
        Some(data) => data,
        None => modem.port_primary().ok_or(Error::PortUnavailable)?,
    };

    if data.open().is_err() {
        warn!("Couldn't connect: cannot keep data port open");
        return Err(Error::PortUnavailable);
    }

    debug!("Connection through a plain serial AT port ({})", data.device());
    Ok(data)
}

/// Reverts a data port from raw data mode back to command mode.
///
/// The reopen restores a sane open count (in data mode it may differ), the
/// flash drops DTR so the modem exits data mode, and the saved init
/// sequence re-arms the port for AT use. Carrier-lost and flash-failed are
/// expected side effects of disconnection; everything else aborts the
/// teardown with the port deliberately left marked connected.
pub(crate) async fn revert_port_mode<P: SerialPort>(
    data: &P,
    flow_control: FlowControl,
) -> Result<(), Error> {
    // Init replay is suppressed for the reopen; the flash below would race
    // it.
    data.set_init_sequence_enabled(false);
    debug!("Reopening data port ({})...", data.device());
    let reopened = data.reopen(Duration::from_millis(1000)).await;
    data.set_init_sequence_enabled(true);
    reopened?;

    debug!("Flashing data port ({})...", data.device());
    let flashed = data.flash(Duration::from_millis(1000)).await;

    if flow_control != FlowControl::None {
        if let Err(e) = data.set_flow_control(FlowControl::None) {
            debug!("Couldn't reset flow control settings: {:?}", e);
        }
    }

    // The open held since dial is released here, and the port leaves data
    // mode no matter how the flash went.
    data.close();
    data.set_connected(false);

    match flashed {
        Ok(()) => {}
        Err(PortError::CarrierLost) | Err(PortError::FlashFailed) => {
            debug!("Port flashing failed (not fatal)");
        }
        Err(e) => return Err(e.into()),
    }

    if data.run_init_sequence().await.is_err() {
        debug!("Port init sequence failed (not fatal)");
    }

    Ok(())
}
