//! 3GPP connection pipeline: CID selection, PDP activation by dial-up, IP
//! configuration and context deactivation.

use super::{acquire_at_data_port, revert_port_mode, IpConfig, IpMethod};
use crate::apn::apn_matches;
use crate::cancel::CancelToken;
use crate::command::mobile_control::GetExtendedErrorReport;
use crate::command::psn::types::{ContextId, PDPContextStatus, PDPType};
use crate::command::psn::{
    EnterPPP, GetPDPContextDefinition, GetPDPContextFormats, SetPDPContextDefinition,
    SetPDPContextState,
};
use crate::config::IpFamily;
use crate::error::Error;
use crate::modem::Modem;
use crate::port::{FlowControl, PortKind, SerialPort};

/// Chooses which PDP context to use for the given APN and defines it when
/// no reusable definition exists.
///
/// Existing contexts are preferred: an exact APN match (by 3GPP APN
/// equivalence) is reused as-is, an empty-APN slot of the right PDP type is
/// overwritten. Only when neither is found is the supported cid range
/// queried for a free slot. Every query failure degrades softly; the last
/// resort is cid 1.
pub(crate) async fn cid_selection<M: Modem>(
    modem: &M,
    primary: &M::Port,
    apn: &str,
    ip_family: IpFamily,
    cancel: &CancelToken,
) -> Result<ContextId, Error> {
    let requested_type = PDPType::from_ip_family(ip_family);

    let mut max_cid = 0u8;
    let mut selected = 0u8;
    let mut reuse = false;

    cancel.check()?;
    debug!("Looking for best CID...");
    match modem.command(primary, &GetPDPContextDefinition, cancel).await {
        Ok(contexts) => {
            debug!("Found {} PDP contexts", contexts.len());
            for ctx in contexts.iter() {
                debug!(
                    "  PDP context [cid={}] [type='{}'] [apn='{}']",
                    ctx.cid.0,
                    ctx.pdp_type.as_str(),
                    ctx.apn.as_str()
                );

                if Some(ctx.pdp_type) == requested_type {
                    if ctx.apn.is_empty() {
                        debug!("Found PDP context with CID {} and no APN", ctx.cid.0);
                        selected = ctx.cid.0;
                    } else if apn_matches(apn, ctx.apn.as_str()) {
                        debug!(
                            "Found PDP context with CID {} for APN '{}'",
                            ctx.cid.0, apn
                        );
                        selected = ctx.cid.0;
                        reuse = true;
                        break;
                    }
                }

                if max_cid < ctx.cid.0 {
                    max_cid = ctx.cid.0;
                }
            }
        }
        Err(Error::Cancelled) => return Err(Error::Cancelled),
        // Some modems reject listing PDP contexts while accepting
        // definitions, so any read failure leaves the table empty.
        Err(Error::NotSupported) => debug!("Querying PDP context list is unsupported"),
        Err(e) => debug!("Unexpected +CGDCONT? error: {:?}", e),
    }

    cancel.check()?;
    let cid = if selected > 0 {
        selected
    } else {
        match modem.command(primary, &GetPDPContextFormats, cancel).await {
            Ok(formats) => {
                let mut cid = 0u8;
                for format in formats.iter() {
                    if Some(format.pdp_type) == requested_type {
                        if max_cid < format.cid_range.max {
                            cid = max_cid + 1;
                            debug!("Using empty CID {}", cid);
                        } else {
                            cid = max_cid;
                            debug!("Re-using CID {} (max)", cid);
                        }
                        break;
                    }
                }
                if cid == 0 {
                    debug!("Defaulting to CID=1");
                    cid = 1;
                }
                cid
            }
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                debug!("Unexpected +CGDCONT=? error: {:?}", e);
                debug!("Defaulting to CID=1");
                1
            }
        }
    };

    cancel.check()?;
    let pdp_type = requested_type.ok_or(Error::InvalidArgs("unsupported IP type requested"))?;

    if !reuse {
        let define = SetPDPContextDefinition {
            cid: ContextId(cid),
            pdp_type,
            apn,
        };
        if let Err(e) = modem.command(primary, &define, cancel).await {
            warn!("Couldn't initialize PDP context with our APN: {:?}", e);
            return Err(e);
        }
    }

    Ok(ContextId(cid))
}

/// Dials `*99` on the data port, switching its TTY into raw data mode.
///
/// The returned port carries the one open taken here; it stays open for the
/// whole session and is released by the disconnect reversion.
pub(crate) async fn dial<M: Modem>(
    modem: &M,
    primary: &M::Port,
    cid: ContextId,
    flow_control: FlowControl,
    cancel: &CancelToken,
) -> Result<M::Port, Error> {
    let data = acquire_at_data_port(modem)?;

    if let Err(dial_error) = modem.command(&data, &EnterPPP { cid }, cancel).await {
        // Fish an extended reason out of the modem before giving the port
        // back; the reply replaces the message, not the error class.
        let report = modem.command(primary, &GetExtendedErrorReport, cancel).await;
        data.close();
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        return Err(match report {
            Ok(report) if !report.report.is_empty() => Error::Dial(report.report),
            _ => dial_error,
        });
    }

    // The TTY is in raw data mode now; cancellation no longer applies.
    if flow_control != FlowControl::None {
        debug!("[{}] Setting flow control", data.device());
        if let Err(e) = data.set_flow_control(flow_control) {
            warn!("Couldn't set flow control settings: {:?}", e);
        }
    }

    // Marking the port connected here instead of at the end of the connect
    // sequence stops any background polling of it right away.
    data.set_connected(true);

    Ok(data)
}

/// IP configuration when no vendor strategy is installed: PPP on an AT data
/// port, DHCP on a network data port, one config per requested family.
pub(crate) fn default_ip_config<P: SerialPort>(
    data: &P,
    ip_family: IpFamily,
) -> (Option<IpConfig>, Option<IpConfig>) {
    let method = if data.kind() == PortKind::At {
        IpMethod::Ppp
    } else {
        IpMethod::Dhcp
    };

    let ipv4 = ip_family.includes_v4().then(|| IpConfig::new(method));
    let ipv6 = ip_family.includes_v6().then(|| IpConfig::new(method));
    debug_assert!(ipv4.is_some() || ipv6.is_some());

    (ipv4, ipv6)
}

/// Deactivates the PDP context and reverts the data port to command mode.
///
/// Deactivation is attempted on whatever control port is not in data mode;
/// its failure never aborts the teardown. If no port accepted the command
/// before the reversion, it is retried on the primary afterwards (which may
/// by then be the same TTY as the data port).
pub(crate) async fn disconnect<M: Modem>(
    modem: &M,
    primary: &M::Port,
    secondary: Option<&M::Port>,
    data: &M::Port,
    cid: Option<ContextId>,
    flow_control: FlowControl,
) -> Result<(), Error> {
    let cancel = CancelToken::new();
    let deactivate = SetPDPContextState {
        status: PDPContextStatus::Deactivated,
        cid,
    };
    let mut cgact_sent = false;

    if !primary.get_connected() {
        debug!("Sending PDP context deactivation in primary port...");
        match modem.command(primary, &deactivate, &cancel).await {
            Ok(_) => cgact_sent = true,
            Err(e) => debug!("PDP context deactivation failed (not fatal): {:?}", e),
        }
    } else if let Some(secondary) = secondary {
        debug!("Sending PDP context deactivation in secondary port...");
        match modem.command(secondary, &deactivate, &cancel).await {
            Ok(_) => cgact_sent = true,
            Err(e) => debug!("PDP context deactivation failed (not fatal): {:?}", e),
        }
    }

    revert_port_mode(data, flow_control).await?;

    if cgact_sent {
        debug!("PDP disconnection already sent");
        return Ok(());
    }

    // Some modems stop responding on their primary port when the CGACT went
    // out on a separate data port; retry on the primary now that the data
    // port is back in command mode.
    if let Err(e) = modem.command(primary, &deactivate, &cancel).await {
        debug!("PDP context deactivation failed (not fatal): {:?}", e);
    }

    Ok(())
}
