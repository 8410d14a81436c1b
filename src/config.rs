use heapless::String;

use crate::command::cdma::types::RmProtocol;

/// Requested IP family of a 3GPP bearer.
///
/// `None` and `Any` defer to the modem's default family at connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IpFamily {
    #[default]
    None,
    V4,
    V6,
    V4V6,
    Any,
}

impl IpFamily {
    pub fn includes_v4(self) -> bool {
        matches!(self, IpFamily::V4 | IpFamily::V4V6)
    }

    pub fn includes_v6(self) -> bool {
        matches!(self, IpFamily::V6 | IpFamily::V4V6)
    }

    /// Substitutes the modem default for an unspecified request.
    pub fn resolve(self, default: IpFamily) -> IpFamily {
        match self {
            IpFamily::None | IpFamily::Any => default,
            family => family,
        }
    }
}

/// Immutable session parameters, fixed when the bearer is created.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BearerConfig {
    /// Access point name. `None` selects the CDMA path on CDMA-capable
    /// modems; an empty string is a valid 3GPP request that lets the modem
    /// substitute the default subscription APN.
    pub apn: Option<String<100>>,
    /// Requested IP family (3GPP only).
    pub ip_family: IpFamily,
    /// Preferred Rm interface protocol (CDMA only). `Unknown` keeps
    /// whatever the modem currently uses.
    pub rm_protocol: RmProtocol,
    /// Dial string override (CDMA only); `#777` when absent.
    pub number: Option<String<32>>,
}

impl BearerConfig {
    /// Shorthand for a plain 3GPP configuration.
    pub fn for_apn(apn: &str, ip_family: IpFamily) -> Self {
        Self {
            apn: String::try_from(apn).ok(),
            ip_family,
            ..Self::default()
        }
    }
}
