// SPDX-License-Identifier: PMPL-1.0-or-later

//! CWE121: stack buffer overrun through an aliased struct
//!
//! `CharVoid` starts with a 16-byte char field and ends with two
//! pointer-sized opaque slots. The kernel copies the source string
//! into the char field using the size of the *whole record*, so the
//! tail of the source lands in the opaque slots. `void_second` ends
//! up holding attacker-controlled bytes where a pointer used to be;
//! dereferencing it afterwards may crash or may silently read
//! garbage, and both outcomes are accepted.

use crate::flow::{runtime_returns_true, AliasPair, FlowConfig};
use crate::trace;
use std::mem;
use std::ptr;

/// Source bytes, sized so the oversized copy never reads past them:
/// 31 characters plus the NUL terminator.
pub const SRC_STR: &[u8; 32] = b"0123456789abcdef0123456789abcde\0";

/// Fixed-layout record under test. The contract a correct program
/// honors is "bytes copied into `char_first` == 16", the capacity of
/// that field, not of the enclosing record.
#[repr(C)]
pub struct CharVoid {
    pub char_first: [u8; 16],
    pub void_second: *const u8,
    pub void_third: *const u8,
}

impl CharVoid {
    pub fn fresh() -> Self {
        Self {
            char_first: [0; 16],
            void_second: ptr::null(),
            void_third: ptr::null(),
        }
    }
}

/// The fault function every variant of this family lands on.
///
/// Copies `size_of::<CharVoid>()` bytes through a pointer derived
/// from the 16-byte field, then re-terminates the field as if the
/// copy had been sized correctly.
pub(crate) fn overrun_into(record: &mut CharVoid) {
    trace::fault_site("cwe121 copy sized to the enclosing record");
    unsafe {
        ptr::copy_nonoverlapping(
            SRC_STR.as_ptr(),
            record.char_first.as_mut_ptr(),
            mem::size_of::<CharVoid>(),
        );
    }
    record.char_first[15] = 0;
}

pub fn straightline(_cfg: &FlowConfig) {
    let mut record = CharVoid::fresh();
    record.void_second = SRC_STR.as_ptr();
    unsafe { trace::print_c_string(record.void_second) };
    overrun_into(&mut record);
    unsafe { trace::print_c_string(record.char_first.as_ptr()) };
    // void_second now holds source bytes reinterpreted as a pointer.
    unsafe { trace::print_c_string(record.void_second) };
}

pub fn static_predicate_gate(cfg: &FlowConfig) {
    if cfg.gate() {
        let mut record = CharVoid::fresh();
        record.void_second = SRC_STR.as_ptr();
        unsafe { trace::print_c_string(record.void_second) };
        overrun_into(&mut record);
        unsafe { trace::print_c_string(record.char_first.as_ptr()) };
        unsafe { trace::print_c_string(record.void_second) };
    }
}

pub fn runtime_predicate_gate(_cfg: &FlowConfig) {
    if runtime_returns_true() {
        let mut record = CharVoid::fresh();
        record.void_second = SRC_STR.as_ptr();
        unsafe { trace::print_c_string(record.void_second) };
        overrun_into(&mut record);
        unsafe { trace::print_c_string(record.char_first.as_ptr()) };
        unsafe { trace::print_c_string(record.void_second) };
    }
}

pub fn reference_alias(_cfg: &FlowConfig) {
    let mut record = CharVoid::fresh();
    let record_ref = &mut record;
    {
        let record = &mut *record_ref;
        record.void_second = SRC_STR.as_ptr();
        unsafe { trace::print_c_string(record.void_second) };
        overrun_into(record);
        unsafe { trace::print_c_string(record.char_first.as_ptr()) };
        unsafe { trace::print_c_string(record.void_second) };
    }
}

pub fn union_alias(_cfg: &FlowConfig) {
    let mut record = CharVoid::fresh();
    let pair = AliasPair {
        first: &mut record as *mut CharVoid,
    };
    {
        // Second name for the same record, read through the other
        // union member.
        let record = unsafe { &mut *pair.second };
        record.void_second = SRC_STR.as_ptr();
        unsafe { trace::print_c_string(record.void_second) };
        overrun_into(record);
        unsafe { trace::print_c_string(record.char_first.as_ptr()) };
        unsafe { trace::print_c_string(record.void_second) };
    }
}

fn overrun_sink(record: &mut CharVoid) {
    unsafe { trace::print_c_string(record.void_second) };
    overrun_into(record);
    unsafe { trace::print_c_string(record.char_first.as_ptr()) };
    unsafe { trace::print_c_string(record.void_second) };
}

pub fn sink_function(_cfg: &FlowConfig) {
    let mut record = CharVoid::fresh();
    record.void_second = SRC_STR.as_ptr();
    overrun_sink(&mut record);
}

fn overrun_source() -> CharVoid {
    let mut record = CharVoid::fresh();
    record.void_second = SRC_STR.as_ptr();
    unsafe { trace::print_c_string(record.void_second) };
    overrun_into(&mut record);
    record
}

pub fn source_function(_cfg: &FlowConfig) {
    // The caller inherits a record the source already corrupted.
    let record = overrun_source();
    unsafe { trace::print_c_string(record.char_first.as_ptr()) };
    unsafe { trace::print_c_string(record.void_second) };
}
