//! Responses for Mobile equipment control and status Commands

use atat::atat_derive::AtatResp;
use heapless::String;

/// 5.20 Extended error report +CEER
///
/// The report is free text; vendors disagree on its shape beyond the
/// leading tag, so only the first token is captured and any structured
/// tail is ignored.
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct ExtendedErrorReport {
    #[at_arg(position = 0)]
    pub report: String<64>,
}
