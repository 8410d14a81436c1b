//! CDMA connection pipeline: Rm protocol negotiation and direct dial.

use super::{acquire_at_data_port, revert_port_mode, ConnectResult, IpConfig, IpMethod};
use crate::cancel::CancelToken;
use crate::command::call_control::types::DialString;
use crate::command::call_control::DialDirect;
use crate::command::cdma::types::RmProtocol;
use crate::command::cdma::{GetRmProtocol, SetRmProtocol};
use crate::config::BearerConfig;
use crate::error::Error;
use crate::modem::Modem;
use crate::port::{FlowControl, SerialPort};

/// Brings up a CDMA data call and returns the IPv4-only PPP result.
pub(crate) async fn connect<M: Modem>(
    modem: &M,
    primary: &M::Port,
    config: &BearerConfig,
    flow_control: FlowControl,
    cancel: &CancelToken,
) -> Result<ConnectResult<M::Port>, Error> {
    let data = acquire_at_data_port(modem)?;

    if let Err(e) = setup_and_dial(modem, primary, &data, config, flow_control, cancel).await {
        data.close();
        return Err(e);
    }

    // Generic CDMA connections are done over PPP always, IPv4 only.
    Ok(ConnectResult {
        data_port: data,
        ipv4: Some(IpConfig::new(IpMethod::Ppp)),
        ipv6: None,
    })
}

async fn setup_and_dial<M: Modem>(
    modem: &M,
    primary: &M::Port,
    data: &M::Port,
    config: &BearerConfig,
    flow_control: FlowControl,
    cancel: &CancelToken,
) -> Result<(), Error> {
    if let Some(requested_index) = config.rm_protocol.crm_index() {
        debug!("Querying current RM protocol set...");
        let current = match modem.command(primary, &GetRmProtocol, cancel).await {
            Ok(setting) => setting,
            Err(e) => {
                warn!("Couldn't query current RM protocol: {:?}", e);
                return Err(e);
            }
        };
        cancel.check()?;

        let current = match RmProtocol::from_crm_index(current.index) {
            Some(protocol) => protocol,
            None => {
                warn!("Couldn't parse RM protocol reply ({})", current.index);
                return Err(Error::Parse);
            }
        };

        if current != config.rm_protocol {
            debug!("Setting requested RM protocol...");
            let set = SetRmProtocol {
                index: requested_index,
            };
            if let Err(e) = modem.command(primary, &set, cancel).await {
                warn!("Couldn't set RM protocol: {:?}", e);
                return Err(e);
            }
            cancel.check()?;
        }
    }

    // Dial the configured number, or the standard packet service code.
    let number = config.number.as_deref().unwrap_or("#777");
    let number = DialString::new(number).ok_or(Error::InvalidArgs("dial number too long"))?;
    if let Err(e) = modem.command(data, &DialDirect { number }, cancel).await {
        warn!("Couldn't connect: {:?}", e);
        return Err(e);
    }

    // The TTY is in raw data mode now; cancellation no longer applies.
    if flow_control != FlowControl::None {
        debug!("[{}] Setting flow control", data.device());
        if let Err(e) = data.set_flow_control(flow_control) {
            warn!("Couldn't set flow control settings: {:?}", e);
        }
    }

    data.set_connected(true);

    Ok(())
}

/// CDMA teardown is just the port-mode reversion; there is no context to
/// deactivate.
pub(crate) async fn disconnect<P: SerialPort>(
    data: &P,
    flow_control: FlowControl,
) -> Result<(), Error> {
    revert_port_mode(data, flow_control).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bearer::{Bearer, ConnectionType, IpMethod};
    use crate::test_helpers::FakeModem;
    use embassy_futures::block_on;
    use heapless::String;

    fn config(rm_protocol: RmProtocol) -> BearerConfig {
        BearerConfig {
            rm_protocol,
            ..BearerConfig::default()
        }
    }

    #[test]
    fn switches_rm_protocol_before_dialing() {
        let modem = FakeModem::new_cdma();
        modem.expect("[ttyACM0] AT+CRM?", Ok(b"+CRM: 0".as_slice()));
        modem.expect("[ttyACM0] AT+CRM=2", Ok(b"".as_slice()));
        modem.expect("[ttyACM0] ATDT#777", Ok(b"".as_slice()));

        let bearer = Bearer::new(
            &modem,
            config(RmProtocol::PacketNetworkPpp),
            FlowControl::RtsCts,
        );
        let result = block_on(bearer.connect(&CancelToken::new())).unwrap();

        modem.verify();
        assert_eq!(result.ipv4.unwrap().method, IpMethod::Ppp);
        assert!(result.ipv6.is_none());
        assert_eq!(bearer.connection_type(), ConnectionType::Cdma);

        let primary = modem.primary.clone().unwrap();
        assert_eq!(primary.open_count(), 1);
        assert!(primary.connected());
        assert_eq!(primary.flow_control(), Some(FlowControl::RtsCts));
    }

    #[test]
    fn keeps_matching_rm_protocol() {
        let modem = FakeModem::new_cdma();
        modem.expect("[ttyACM0] AT+CRM?", Ok(b"+CRM: 2".as_slice()));
        modem.expect("[ttyACM0] ATDT#777", Ok(b"".as_slice()));

        let bearer = Bearer::new(&modem, config(RmProtocol::PacketNetworkPpp), FlowControl::None);
        block_on(bearer.connect(&CancelToken::new())).unwrap();

        modem.verify();
    }

    #[test]
    fn no_rm_preference_dials_directly() {
        let modem = FakeModem::new_cdma();
        modem.expect("[ttyACM0] ATDT#777", Ok(b"".as_slice()));

        let bearer = Bearer::new(&modem, config(RmProtocol::Unknown), FlowControl::None);
        block_on(bearer.connect(&CancelToken::new())).unwrap();

        modem.verify();
    }

    #[test]
    fn dials_configured_number() {
        let modem = FakeModem::new_cdma();
        modem.expect("[ttyACM0] ATDT5550100", Ok(b"".as_slice()));

        let bearer_config = BearerConfig {
            number: Some(String::try_from("5550100").unwrap()),
            ..BearerConfig::default()
        };
        let bearer = Bearer::new(&modem, bearer_config, FlowControl::None);
        block_on(bearer.connect(&CancelToken::new())).unwrap();

        modem.verify();
    }

    #[test]
    fn rm_query_failure_closes_data_port() {
        let modem = FakeModem::new_cdma();
        modem.expect("[ttyACM0] AT+CRM?", Err(Error::At(atat::Error::Timeout)));

        let bearer = Bearer::new(&modem, config(RmProtocol::PacketRelay), FlowControl::None);
        let err = block_on(bearer.connect(&CancelToken::new())).unwrap_err();

        modem.verify();
        assert_eq!(err, Error::At(atat::Error::Timeout));
        assert_eq!(modem.primary.clone().unwrap().open_count(), 0);
        assert_eq!(bearer.connection_type(), ConnectionType::None);
    }

    #[test]
    fn dial_failure_closes_data_port_without_extended_report() {
        let modem = FakeModem::new_cdma();
        modem.expect("[ttyACM0] ATDT#777", Err(Error::At(atat::Error::Timeout)));

        let bearer = Bearer::new(&modem, config(RmProtocol::Unknown), FlowControl::None);
        let err = block_on(bearer.connect(&CancelToken::new())).unwrap_err();

        modem.verify();
        assert_eq!(err, Error::At(atat::Error::Timeout));
        let primary = modem.primary.clone().unwrap();
        assert_eq!(primary.open_count(), 0);
        assert!(!primary.connected());
    }

    #[test]
    fn disconnect_runs_port_reversion_only() {
        let modem = FakeModem::new_cdma();
        modem.expect("[ttyACM0] ATDT#777", Ok(b"".as_slice()));

        let bearer = Bearer::new(&modem, config(RmProtocol::Unknown), FlowControl::None);
        block_on(bearer.connect(&CancelToken::new())).unwrap();
        block_on(bearer.disconnect()).unwrap();

        modem.verify();
        let lines = modem.transcript_lines();
        let tail: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let reopen = tail.iter().position(|l| *l == "[ttyACM0] reopen").unwrap();
        let flash = tail.iter().position(|l| *l == "[ttyACM0] flash").unwrap();
        let replay = tail
            .iter()
            .position(|l| *l == "[ttyACM0] init-replay")
            .unwrap();
        assert!(reopen < flash && flash < replay);

        let primary = modem.primary.clone().unwrap();
        assert_eq!(primary.open_count(), 0);
        assert!(!primary.connected());
        assert_eq!(bearer.connection_type(), ConnectionType::None);
    }
}
