//! ### Mobile equipment control and status Commands

pub mod responses;

use atat::atat_derive::AtatCmd;

use responses::ExtendedErrorReport;

/// 5.20 Extended error report +CEER
///
/// Returns an extended report of the reason for the last call release or
/// failure. Issued after a failed packet dial to turn a bare ERROR into
/// something a human can act on.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CEER", ExtendedErrorReport, timeout_ms = 3000)]
pub struct GetExtendedErrorReport;
