// SPDX-License-Identifier: PMPL-1.0-or-later

//! Progress markers emitted by running scenarios
//!
//! A harness watching a scenario from the outside needs to know the
//! fault site was reached even when the process dies immediately
//! afterwards, so every marker is flushed before the call returns.
//! Markers are plumbing for observability, not part of any contract.

use std::io::Write;

/// Marker printed at the faulty operation itself. Sweep looks for
/// this prefix in child stdout to confirm the kernel ran.
pub const FAULT_SITE_MARKER: &str = "fault-site:";

pub fn print_line(msg: &str) {
    let mut out = std::io::stdout().lock();
    // A crash right after the kernel must not swallow the marker.
    let _ = writeln!(out, "{}", msg);
    let _ = out.flush();
}

/// Marker a scenario emits at the moment of the erroneous operation.
pub fn fault_site(detail: &str) {
    print_line(&format!("{} {}", FAULT_SITE_MARKER, detail));
}

/// Print a NUL-terminated byte string starting at `ptr`, lossily.
///
/// # Safety
/// `ptr` must point to readable memory containing a NUL terminator
/// within the allocation.
pub unsafe fn print_c_string(ptr: *const u8) {
    let mut len = 0usize;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    let bytes = std::slice::from_raw_parts(ptr, len);
    print_line(&String::from_utf8_lossy(bytes));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_c_string_stops_at_nul() {
        // Only exercises the length scan; output goes to stdout.
        let data = b"marker\0trailing";
        unsafe { print_c_string(data.as_ptr()) };
    }

    #[test]
    fn test_fault_site_marker_prefix_is_stable() {
        assert_eq!(FAULT_SITE_MARKER, "fault-site:");
    }
}
