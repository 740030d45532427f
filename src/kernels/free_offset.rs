// SPDX-License-Identifier: PMPL-1.0-or-later

//! CWE761: release of a pointer advanced past the allocation base
//!
//! A 100-byte buffer receives a fixed source string; a scan cursor
//! walks forward looking for the search character and is then handed
//! to the allocator's release. The allocator's bookkeeping is keyed
//! to the base pointer it issued, so releasing the cursor is
//! undefined whenever the scan advanced past at least one byte. For
//! "Fixed String" and `'S'` the released address is base + 6.

use super::{alloc_bytes, byte_layout};
use crate::flow::{runtime_returns_true, AliasPair, FlowConfig};
use crate::trace;
use std::alloc::dealloc;
use std::ptr;

pub const FIXED_STRING: &str = "Fixed String";
pub const SEARCH_CHAR: u8 = b'S';
pub const BUF_CAPACITY: usize = 100;

/// Allocate the scenario buffer, empty-terminated.
pub(crate) fn empty_buffer() -> *mut u8 {
    let data = alloc_bytes(BUF_CAPACITY);
    unsafe { *data = 0 };
    data
}

/// Copy `text` plus terminator into `data`. Also serves as the
/// producing function for the SourceFunctionIndirection variant.
///
/// # Safety
/// `data` must point to at least `text.len() + 1` writable bytes.
pub(crate) unsafe fn copy_into(data: *mut u8, text: &str) -> *mut u8 {
    ptr::copy_nonoverlapping(text.as_ptr(), data, text.len());
    *data.add(text.len()) = 0;
    data
}

/// Allocate and fill the buffer with the fixed source string.
pub(crate) fn fixed_string_buffer() -> *mut u8 {
    let data = empty_buffer();
    unsafe { copy_into(data, FIXED_STRING) }
}

/// Walk the cursor forward to the first `SEARCH_CHAR` byte, stopping
/// at the terminator. Pure pointer arithmetic; performs no release.
///
/// # Safety
/// `base` must point to a readable NUL-terminated byte string.
pub(crate) unsafe fn advance_to_match(base: *mut u8) -> *mut u8 {
    let mut cursor = base;
    while *cursor != 0 {
        if *cursor == SEARCH_CHAR {
            trace::print_line("We have a match!");
            break;
        }
        cursor = cursor.add(1);
    }
    cursor
}

/// The fault function every variant of this family lands on: release
/// keyed to the scan cursor instead of the allocation base.
///
/// # Safety
/// Never safe. That is the point.
pub(crate) unsafe fn release_at_cursor(cursor: *mut u8) {
    trace::fault_site("cwe761 releasing an advanced scan cursor");
    dealloc(cursor, byte_layout(BUF_CAPACITY));
}

pub fn straightline(_cfg: &FlowConfig) {
    let data = fixed_string_buffer();
    unsafe {
        let cursor = advance_to_match(data);
        release_at_cursor(cursor);
    }
}

pub fn static_predicate_gate(cfg: &FlowConfig) {
    let data = fixed_string_buffer();
    if cfg.gate() {
        unsafe {
            let cursor = advance_to_match(data);
            release_at_cursor(cursor);
        }
    }
}

pub fn runtime_predicate_gate(_cfg: &FlowConfig) {
    let data = fixed_string_buffer();
    if runtime_returns_true() {
        unsafe {
            let cursor = advance_to_match(data);
            release_at_cursor(cursor);
        }
    }
}

pub fn reference_alias(_cfg: &FlowConfig) {
    let data = fixed_string_buffer();
    let data_ref = &data;
    {
        let data = *data_ref;
        unsafe {
            let cursor = advance_to_match(data);
            release_at_cursor(cursor);
        }
    }
}

pub fn union_alias(_cfg: &FlowConfig) {
    let data = fixed_string_buffer();
    let pair = AliasPair { first: data };
    {
        // Same pointer, read back through the other union member.
        let data = unsafe { pair.second };
        unsafe {
            let cursor = advance_to_match(data);
            release_at_cursor(cursor);
        }
    }
}

fn scan_sink(data: *mut u8) {
    unsafe {
        let cursor = advance_to_match(data);
        release_at_cursor(cursor);
    }
}

pub fn sink_function(_cfg: &FlowConfig) {
    // Allocation here, scan and release in the sink.
    scan_sink(fixed_string_buffer());
}

pub fn source_function(_cfg: &FlowConfig) {
    let data = empty_buffer();
    // The taint (the scannable contents) comes from the producer.
    let data = unsafe { copy_into(data, FIXED_STRING) };
    unsafe {
        let cursor = advance_to_match(data);
        release_at_cursor(cursor);
    }
}
