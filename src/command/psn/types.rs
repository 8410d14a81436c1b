//! Argument and parameter types used by Packet Switched Data Services
//! Commands and Responses

use atat::atat_derive::{AtatEnum, AtatLen};
use atat::AtatLen;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::config::IpFamily;

/// PDP context identifier, index into the modem's context table.
///
/// Valid identifiers start at 1; the bearer uses 0 internally for "unset".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, AtatLen,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContextId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[at_enum(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PDPContextStatus {
    Deactivated = 0,
    Activated = 1,
}

/// The packet data protocol type of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PDPType {
    IP,
    IPV6,
    IPV4V6,
}

impl PDPType {
    /// Maps a resolved IP family onto its wire string. `None` for families
    /// that have no 27.007 PDP type (unresolved `None`/`Any`).
    pub fn from_ip_family(family: IpFamily) -> Option<Self> {
        match family {
            IpFamily::V4 => Some(PDPType::IP),
            IpFamily::V6 => Some(PDPType::IPV6),
            IpFamily::V4V6 => Some(PDPType::IPV4V6),
            IpFamily::None | IpFamily::Any => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PDPType::IP => "IP",
            PDPType::IPV6 => "IPV6",
            PDPType::IPV4V6 => "IPV4V6",
        }
    }
}

impl AtatLen for PDPType {
    const LEN: usize = 8;
}

impl Serialize for PDPType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            Self::IP => Serializer::serialize_bytes(serializer, b"\"IP\""),
            Self::IPV6 => Serializer::serialize_bytes(serializer, b"\"IPV6\""),
            Self::IPV4V6 => Serializer::serialize_bytes(serializer, b"\"IPV4V6\""),
        }
    }
}

impl<'de> Deserialize<'de> for PDPType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PDPTypeVisitor;

        const VARIANTS: &[&str] = &["IP", "IPV6", "IPV4V6"];

        impl<'de> de::Visitor<'de> for PDPTypeVisitor {
            type Value = PDPType;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("a valid PDP type string")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<PDPType, E>
            where
                E: de::Error,
            {
                // Vendors disagree on casing ("IPv4v6" has been seen in the
                // wild), so match case-insensitively.
                if v.eq_ignore_ascii_case(b"IP") {
                    Ok(PDPType::IP)
                } else if v.eq_ignore_ascii_case(b"IPV6") {
                    Ok(PDPType::IPV6)
                } else if v.eq_ignore_ascii_case(b"IPV4V6") {
                    Ok(PDPType::IPV4V6)
                } else {
                    let value = core::str::from_utf8(v).unwrap_or("\u{fffd}\u{fffd}\u{fffd}");
                    Err(de::Error::unknown_variant(value, VARIANTS))
                }
            }

            fn visit_str<E>(self, v: &str) -> Result<PDPType, E>
            where
                E: de::Error,
            {
                self.visit_bytes(v.as_bytes())
            }
        }

        deserializer.deserialize_bytes(PDPTypeVisitor)
    }
}
