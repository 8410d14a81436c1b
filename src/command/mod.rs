//! AT command definitions used by the bearer\
//! Packet domain commands follow 3GPP TS 27.007, dialing follows V.250, and
//! the CDMA Rm interface selection follows TIA/EIA-678.

pub mod call_control;
pub mod cdma;
pub mod mobile_control;
pub mod psn;
pub mod types;

use atat::atat_derive::AtatResp;

#[derive(Debug, Clone, AtatResp)]
pub struct NoResponse;
