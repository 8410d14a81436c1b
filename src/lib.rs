#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod apn;
pub mod bearer;
pub mod cancel;
pub mod command;
pub mod config;
pub mod error;
pub mod modem;
pub mod port;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use bearer::{
    Bearer, BearerOps, ConnectResult, ConnectionStatus, ConnectionType, Generic, IpConfig,
    IpMethod,
};
pub use cancel::CancelToken;
pub use config::{BearerConfig, IpFamily};
pub use error::Error;
pub use modem::Modem;
pub use port::{FlowControl, PortKind, SerialPort};
