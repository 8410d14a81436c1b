//! ### CDMA Rm interface setup
//!
//! TIA/EIA-678 commands selecting the protocol spoken between the host and
//! a 3GPP2 modem on the Rm (serial) interface before dialing a packet call.

pub mod responses;
pub mod types;

use atat::atat_derive::AtatCmd;

use responses::{RmProtocolRange, RmProtocolSetting};

use super::NoResponse;

/// Read the current Rm interface protocol +CRM?
#[derive(Clone, AtatCmd)]
#[at_cmd("+CRM?", RmProtocolSetting, timeout_ms = 3000)]
pub struct GetRmProtocol;

/// Select the Rm interface protocol +CRM
#[derive(Clone, AtatCmd)]
#[at_cmd("+CRM", NoResponse, timeout_ms = 3000)]
pub struct SetRmProtocol {
    #[at_arg(position = 0)]
    pub index: u8,
}

/// Query the supported Rm protocol index range +CRM=?
///
/// The range is a device capability and cannot change at runtime, so the
/// reply may be served from the modem facade's command cache.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CRM=?", RmProtocolRange, timeout_ms = 3000)]
pub struct GetRmProtocolRange;
