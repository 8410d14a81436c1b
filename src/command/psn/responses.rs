//! Responses for Packet Switched Data Services Commands

use atat::atat_derive::AtatResp;
use heapless::String;

use super::types::{ContextId, PDPContextStatus, PDPType};
use crate::command::types::ValueRange;

/// One row of the +CGDCONT? information response.
///
/// Only the fields the bearer consumes are parsed; compression and
/// allocation settings trailing the PDP address are ignored.
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct PDPContextDefinition {
    #[at_arg(position = 0)]
    pub cid: ContextId,
    #[at_arg(position = 1)]
    pub pdp_type: PDPType,
    #[at_arg(position = 2)]
    pub apn: String<100>,
    #[at_arg(position = 3)]
    pub pdp_addr: Option<String<40>>,
}

/// One row of the +CGDCONT=? test response.
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct PDPContextFormat {
    #[at_arg(position = 0)]
    pub cid_range: ValueRange,
    #[at_arg(position = 1)]
    pub pdp_type: PDPType,
}

/// One row of the +CGACT? read response.
#[derive(Debug, Clone, PartialEq, AtatResp)]
pub struct PDPContextState {
    #[at_arg(position = 0)]
    pub cid: ContextId,
    #[at_arg(position = 1)]
    pub status: PDPContextStatus,
}
