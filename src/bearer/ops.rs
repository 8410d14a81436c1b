use super::{cdma, threegpp, ConnectResult, IpConfig};
use crate::cancel::CancelToken;
use crate::command::psn::types::ContextId;
use crate::config::{BearerConfig, IpFamily};
use crate::error::Error;
use crate::modem::Modem;
use crate::port::FlowControl;

/// Per-path connection strategies.
///
/// Every method has a generic 27.007/TIA-678 default; a vendor plugin
/// replaces individual steps by overriding them while inheriting the rest.
/// The bearer holds one strategy value for its whole lifetime.
pub trait BearerOps<M: Modem> {
    /// Chooses the PDP context to dial and makes sure it is defined,
    /// returning its cid.
    async fn cid_selection_3gpp(
        &self,
        modem: &M,
        primary: &M::Port,
        apn: &str,
        ip_family: IpFamily,
        cancel: &CancelToken,
    ) -> Result<ContextId, Error> {
        threegpp::cid_selection(modem, primary, apn, ip_family, cancel).await
    }

    /// Activates the context by dialing and returns the data port, opened
    /// once and already marked connected.
    async fn dial_3gpp(
        &self,
        modem: &M,
        primary: &M::Port,
        cid: ContextId,
        flow_control: FlowControl,
        cancel: &CancelToken,
    ) -> Result<M::Port, Error> {
        threegpp::dial(modem, primary, cid, flow_control, cancel).await
    }

    /// Retrieves the IP configuration after a successful dial.
    ///
    /// The default picks PPP or DHCP from the data port kind without
    /// touching the modem; vendor strategies may query negotiated
    /// addressing through any of the passed ports.
    async fn get_ip_config_3gpp(
        &self,
        modem: &M,
        primary: &M::Port,
        secondary: Option<&M::Port>,
        data: &M::Port,
        cid: ContextId,
        ip_family: IpFamily,
        cancel: &CancelToken,
    ) -> Result<(Option<IpConfig>, Option<IpConfig>), Error> {
        let _ = (modem, primary, secondary, cid, cancel);
        Ok(threegpp::default_ip_config(data, ip_family))
    }

    async fn connect_cdma(
        &self,
        modem: &M,
        primary: &M::Port,
        config: &BearerConfig,
        flow_control: FlowControl,
        cancel: &CancelToken,
    ) -> Result<ConnectResult<M::Port>, Error> {
        cdma::connect(modem, primary, config, flow_control, cancel).await
    }

    async fn disconnect_3gpp(
        &self,
        modem: &M,
        primary: &M::Port,
        secondary: Option<&M::Port>,
        data: &M::Port,
        cid: Option<ContextId>,
        flow_control: FlowControl,
    ) -> Result<(), Error> {
        threegpp::disconnect(modem, primary, secondary, data, cid, flow_control).await
    }

    async fn disconnect_cdma(
        &self,
        modem: &M,
        primary: &M::Port,
        data: &M::Port,
        flow_control: FlowControl,
    ) -> Result<(), Error> {
        let _ = (modem, primary);
        cdma::disconnect(data, flow_control).await
    }
}

/// The plain 27.007 strategies, used unless a vendor plugin overrides them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Generic;

impl<M: Modem> BearerOps<M> for Generic {}
