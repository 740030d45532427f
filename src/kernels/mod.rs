// SPDX-License-Identifier: PMPL-1.0-or-later

//! Defect kernels
//!
//! One module per defect family. Each kernel is the minimal sequence
//! of operations that performs exactly one named erroneous memory
//! operation; the surrounding entry points are flow disguises that
//! change how execution reaches it, never what it does.
//!
//! The helpers in this module are the *correct* allocation plumbing
//! shared by every kernel. The deliberate flaws live only inside the
//! kernel modules; nothing here skips a check or mis-sizes a release.

pub mod double_free;
pub mod free_offset;
pub mod overrun;

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};

/// Layout for a raw byte buffer of `len` bytes.
pub(crate) fn byte_layout(len: usize) -> Layout {
    // Align 1, so the only failure mode is isize overflow, which the
    // fixed corpus sizes never approach. Treated like any other
    // environment failure: terminate, never substitute for a defect.
    Layout::from_size_align(len, 1).unwrap_or_else(|_| std::process::abort())
}

/// Allocate `len` bytes or terminate the process.
///
/// Allocation failure is an environment failure, kept strictly apart
/// from the planted defects so a harness can tell the two classes of
/// abnormal exit apart.
pub(crate) fn alloc_bytes(len: usize) -> *mut u8 {
    let layout = byte_layout(len);
    let ptr = unsafe { alloc(layout) };
    if ptr.is_null() {
        handle_alloc_error(layout);
    }
    ptr
}

/// Correct release: keyed to the base pointer the allocator issued.
///
/// # Safety
/// `base` must be the pointer returned by `alloc_bytes(len)` for the
/// same `len`, not yet released.
pub(crate) unsafe fn release_base(base: *mut u8, len: usize) {
    dealloc(base, byte_layout(len));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_release_round_trip() {
        let ptr = alloc_bytes(100);
        assert!(!ptr.is_null());
        unsafe {
            *ptr = b'x';
            assert_eq!(*ptr, b'x');
            release_base(ptr, 100);
        }
    }

    #[test]
    fn test_byte_layout_has_byte_alignment() {
        let layout = byte_layout(100);
        assert_eq!(layout.size(), 100);
        assert_eq!(layout.align(), 1);
    }
}
