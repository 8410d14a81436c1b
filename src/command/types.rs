//! Argument and parameter types shared between command groups

use serde::{de, Deserialize, Deserializer};

/// Inclusive value range as reported by test commands, e.g. `(0-2)`.
///
/// Vendors vary in whether the parentheses are present and whether the
/// range is a real range or a single value; both shapes are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValueRange {
    pub min: u8,
    pub max: u8,
}

impl ValueRange {
    pub fn contains(&self, value: u8) -> bool {
        self.min <= value && value <= self.max
    }
}

impl<'de> Deserialize<'de> for ValueRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RangeVisitor;

        impl<'de> de::Visitor<'de> for RangeVisitor {
            type Value = ValueRange;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("a value range like (0-2)")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<ValueRange, E>
            where
                E: de::Error,
            {
                parse_range(v).ok_or_else(|| de::Error::custom("invalid value range"))
            }

            fn visit_str<E>(self, v: &str) -> Result<ValueRange, E>
            where
                E: de::Error,
            {
                self.visit_bytes(v.as_bytes())
            }
        }

        deserializer.deserialize_bytes(RangeVisitor)
    }
}

fn parse_range(v: &[u8]) -> Option<ValueRange> {
    let v = v.strip_prefix(b"(").unwrap_or(v);
    let v = v.strip_suffix(b")").unwrap_or(v);

    let mut parts = v.splitn(2, |c| *c == b'-');
    let min = parse_u8(parts.next()?.trim_ascii())?;
    let max = match parts.next() {
        Some(part) => parse_u8(part.trim_ascii())?,
        None => min,
    };
    (min <= max).then_some(ValueRange { min, max })
}

fn parse_u8(v: &[u8]) -> Option<u8> {
    if v.is_empty() {
        return None;
    }
    v.iter().try_fold(0u8, |acc, c| {
        if !c.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(c - b'0')
    })
}
