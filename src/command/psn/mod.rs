//! ### Packet Switched Data Services Commands
//!
//! A PDP context is the modem's template for one packet data session: a
//! local context identifier, a PDP type and an access point name. Defined
//! contexts are persistent over power cycles on most modules; activating a
//! context attaches it to the network, and dialing `*99` on top of an
//! activated (or activatable) context drops the TTY into PPP data mode.

pub mod responses;
pub mod types;

use atat::atat_derive::AtatCmd;

use responses::{PDPContextDefinition, PDPContextFormat, PDPContextState};
use types::{ContextId, PDPContextStatus, PDPType};

use super::NoResponse;

/// PDP context definition +CGDCONT
///
/// Defines the connection parameters for the PDP context identified by
/// `cid`. The APN is written quoted; an empty string leaves the gateway
/// selection to the subscription default.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGDCONT", NoResponse, timeout_ms = 3000)]
pub struct SetPDPContextDefinition<'a> {
    #[at_arg(position = 0)]
    pub cid: ContextId,
    #[at_arg(position = 1)]
    pub pdp_type: PDPType,
    #[at_arg(position = 2, len = 100)]
    pub apn: &'a str,
}

/// Read PDP context definitions +CGDCONT?
///
/// One response row per defined context. Some modules reject the read
/// command outright while still accepting definitions; callers treat that
/// as an empty table.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGDCONT?", heapless::Vec<PDPContextDefinition, 8>, timeout_ms = 3000)]
pub struct GetPDPContextDefinition;

/// Test supported PDP context parameters +CGDCONT=?
///
/// One response row per supported PDP type, carrying the usable cid range.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGDCONT=?", heapless::Vec<PDPContextFormat, 4>, timeout_ms = 3000)]
pub struct GetPDPContextFormats;

/// PDP context activate or deactivate +CGACT
///
/// With no `cid`, the requested state is applied to every context — only
/// used for deactivation, where it doubles as a safety net when the bearer
/// never learned its cid.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGACT", NoResponse, timeout_ms = 10000, abortable = true)]
pub struct SetPDPContextState {
    #[at_arg(position = 0)]
    pub status: PDPContextStatus,
    #[at_arg(position = 1)]
    pub cid: Option<ContextId>,
}

/// Read PDP context state +CGACT?
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGACT?", heapless::Vec<PDPContextState, 7>, timeout_ms = 3000)]
pub struct GetPDPContextState;

/// Enter PPP state/GPRS dial-up D*
///
/// `ATD*99***<cid>#` asks the MT to establish the DTE-network path for the
/// given context through PPP. On success the "CONNECT" intermediate result
/// is returned and the TTY is in raw data mode; everything after that
/// belongs to the PPP client.
#[derive(Clone, AtatCmd)]
#[at_cmd(
    "D*99***",
    NoResponse,
    value_sep = false,
    timeout_ms = 60000,
    abortable = true,
    termination = "#\r\n"
)]
pub struct EnterPPP {
    #[at_arg(position = 0)]
    pub cid: ContextId,
}
