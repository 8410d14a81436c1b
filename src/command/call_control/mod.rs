//! ### Call control
//!
//! Direct dialing, used by the CDMA connection path. 3GPP packet dial-up
//! has its own `D*99` form in the psn group.

pub mod types;

use atat::atat_derive::AtatCmd;

use types::DialString;

use super::NoResponse;

/// Dial command D (tone dialing)
///
/// `ATDT<number>` initiates a data call. No further commands may follow in
/// the command line; on success the "CONNECT" intermediate result is
/// returned and the TTY is in raw data mode.
#[derive(Clone, AtatCmd)]
#[at_cmd("DT", NoResponse, value_sep = false, timeout_ms = 90000, abortable = true)]
pub struct DialDirect {
    #[at_arg(position = 0)]
    pub number: DialString,
}

#[cfg(test)]
mod tests {
    use super::*;
    use atat::AtatCmd;

    #[test]
    fn dial_default_number() {
        let cmd = DialDirect {
            number: DialString::new("#777").unwrap(),
        };
        let mut buf = [0u8; 64];
        let len = cmd.write(&mut buf);
        assert_eq!(&buf[..len], b"ATDT#777\r\n");
    }

    #[test]
    fn dial_custom_number() {
        let cmd = DialDirect {
            number: DialString::new("5550100").unwrap(),
        };
        let mut buf = [0u8; 64];
        let len = cmd.write(&mut buf);
        assert_eq!(&buf[..len], b"ATDT5550100\r\n");
    }
}
