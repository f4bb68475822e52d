//! MAC address entry helpers.

use std::sync::LazyLock;

use regex::Regex;

static RE_MAC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9A-F]{2}:){5}[0-9A-F]{2}$").unwrap());

const MAC_HEX_DIGITS: usize = 12;

/// Normalize free-form MAC input as the operator types it.
///
/// Keeps hex digits only, truncates to 12, upper-cases them and groups
/// them in colon-separated pairs. Partial input yields a partial address.
pub fn format_mac_input(raw: &str) -> String {
    let mut out = String::with_capacity(17);
    for (i, c) in raw
        .chars()
        .filter(char::is_ascii_hexdigit)
        .take(MAC_HEX_DIGITS)
        .enumerate()
    {
        if i > 0 && i % 2 == 0 {
            out.push(':');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

/// Whether `mac` is a full `AA:BB:CC:DD:EE:FF` address.
pub fn is_complete_mac(mac: &str) -> bool {
    RE_MAC.is_match(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_plain_hex() {
        assert_eq!(format_mac_input("001122aabbcc"), "00:11:22:AA:BB:CC");
    }

    #[test]
    fn test_format_strips_separators_and_junk() {
        assert_eq!(format_mac_input("00-11-22 aa.bb.cc"), "00:11:22:AA:BB:CC");
        assert_eq!(format_mac_input("zz00g11"), "00:11");
    }

    #[test]
    fn test_format_truncates_extra_digits() {
        assert_eq!(format_mac_input("001122aabbccddeeff"), "00:11:22:AA:BB:CC");
    }

    #[test]
    fn test_format_partial_input() {
        assert_eq!(format_mac_input("0011a"), "00:11:A");
        assert_eq!(format_mac_input(""), "");
    }

    #[test]
    fn test_complete_mac() {
        assert!(is_complete_mac("00:11:22:AA:BB:CC"));
        assert!(!is_complete_mac("00:11:22:AA:BB"));
        assert!(!is_complete_mac("00:11:22:aa:bb:cc"));
    }
}
