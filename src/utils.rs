//! Shared validation helpers.
//!
//! The printable check guards the WiFi SSID; hex encoding backs the
//! provisioning signature.

/// Returns `true` if every byte of `s` is in the printable ASCII range
/// `0x20..=0x7E` (space through tilde, inclusive).
pub(crate) fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// Lowercase hex encoding into a fixed-capacity string.
///
/// Returns `None` if `N` is too small for `2 * bytes.len()` characters.
pub(crate) fn hex_lower<const N: usize>(bytes: &[u8]) -> Option<heapless::String<N>> {
    use core::fmt::Write;
    let mut out = heapless::String::<N>::new();
    for b in bytes {
        write!(out, "{:02x}", b).ok()?;
    }
    Some(out)
}
