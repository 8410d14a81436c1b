//! Argument and parameter types used by Call Control Commands and Responses

use atat::AtatLen;
use heapless::String;
use serde::{Serialize, Serializer};

/// Dial string written raw after the dial command.
///
/// Dial characters (digits, `*`, `#`, `+`, pauses) must reach the modem
/// unquoted, so the usual string quoting is bypassed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DialString(String<32>);

impl DialString {
    pub fn new(number: &str) -> Option<Self> {
        String::try_from(number).ok().map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AtatLen for DialString {
    const LEN: usize = 32;
}

impl Serialize for DialString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Serializer::serialize_bytes(serializer, self.0.as_bytes())
    }
}
