//! Responses for CDMA Rm interface Commands

use atat::atat_derive::AtatResp;

use crate::command::types::ValueRange;

/// +CRM? read response.
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct RmProtocolSetting {
    #[at_arg(position = 0)]
    pub index: u8,
}

/// +CRM=? test response.
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct RmProtocolRange {
    #[at_arg(position = 0)]
    pub range: ValueRange,
}
