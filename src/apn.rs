//! 3GPP APN name comparison.
//!
//! A PDP context read back from the modem may carry the APN with different
//! casing, a trailing dot, or the operator identifier appended by the
//! network (`.mncXXX.mccYYY.gprs`, see 3GPP TS 23.003). All of those count
//! as the same gateway.

/// Compares a requested APN against one found in an existing PDP context.
pub fn apn_matches(requested: &str, existing: &str) -> bool {
    let requested = requested.as_bytes();
    let requested = requested.strip_suffix(b".").unwrap_or(requested);
    let existing = existing.as_bytes();

    if existing.len() < requested.len() {
        return false;
    }
    if !existing[..requested.len()].eq_ignore_ascii_case(requested) {
        return false;
    }

    let rest = &existing[requested.len()..];
    rest.is_empty() || rest == b"." || is_operator_id_suffix(rest)
}

fn is_operator_id_suffix(s: &[u8]) -> bool {
    strip_label(s, b".mnc")
        .and_then(strip_digits)
        .and_then(|s| strip_label(s, b".mcc"))
        .and_then(strip_digits)
        .and_then(|s| strip_label(s, b".gprs"))
        .is_some_and(|rest| rest.is_empty() || rest == b".")
}

fn strip_label<'a>(s: &'a [u8], label: &[u8]) -> Option<&'a [u8]> {
    if s.len() >= label.len() && s[..label.len()].eq_ignore_ascii_case(label) {
        Some(&s[label.len()..])
    } else {
        None
    }
}

fn strip_digits(s: &[u8]) -> Option<&[u8]> {
    let n = s.iter().take_while(|c| c.is_ascii_digit()).count();
    if n == 0 {
        None
    } else {
        Some(&s[n..])
    }
}
