// SPDX-License-Identifier: PMPL-1.0-or-later

//! CWE415: double free through flawed duplication of an owning handle
//!
//! `RecordHandle` owns a heap-allocated C string and releases it on
//! drop. It offers correct deep duplication (`deep_clone`,
//! `assign_from`) next to the flawed shallow paths (`shallow_copy`,
//! the missing-copy-constructor analogue, and `shallow_assign`, the
//! default-assignment-operator analogue). The defect triggers only
//! when a shallow path is exercised: two handles then own one block
//! and both release it. That choice of path is the discriminating
//! input a detector has to follow.

use super::{alloc_bytes, byte_layout};
use crate::flow::{runtime_returns_true, FlowConfig};
use crate::trace;
use crate::types::OwnershipState;
use std::alloc::dealloc;
use std::ptr;

/// Owning handle over a NUL-terminated heap string.
pub struct RecordHandle {
    data: *mut u8,
    capacity: usize,
    state: OwnershipState,
}

impl RecordHandle {
    pub fn new(text: &str) -> Self {
        let capacity = text.len() + 1;
        let data = alloc_bytes(capacity);
        unsafe {
            ptr::copy_nonoverlapping(text.as_ptr(), data, text.len());
            *data.add(text.len()) = 0;
        }
        Self {
            data,
            capacity,
            state: OwnershipState::Owned,
        }
    }

    pub fn print_data(&self) {
        unsafe { trace::print_c_string(self.data) };
    }

    pub fn data_ptr(&self) -> *const u8 {
        self.data
    }

    pub fn state(&self) -> OwnershipState {
        self.state
    }

    fn text(&self) -> String {
        let mut len = 0;
        unsafe {
            while *self.data.add(len) != 0 {
                len += 1;
            }
            String::from_utf8_lossy(std::slice::from_raw_parts(self.data, len)).into_owned()
        }
    }

    /// Correct duplication: fresh allocation, contents copied.
    pub fn deep_clone(&self) -> Self {
        Self::new(&self.text())
    }

    /// Correct assignment: replaces this handle's allocation with a
    /// fresh copy of `other`'s contents, releasing the old one.
    pub fn assign_from(&mut self, other: &Self) {
        if ptr::eq(self, other) {
            return;
        }
        *self = Self::new(&other.text());
    }

    /// Flawed duplication: duplicates the raw pointer, so the clone
    /// and the original both believe they own the allocation.
    pub fn shallow_copy(&self) -> Self {
        trace::fault_site("cwe415 shallow copy of an owned allocation");
        Self {
            data: self.data,
            capacity: self.capacity,
            state: OwnershipState::Owned,
        }
    }

    /// Flawed assignment: overwrites the pointer in place. The old
    /// allocation leaks and two handles now own `other`'s block.
    pub fn shallow_assign(&mut self, other: &Self) {
        trace::fault_site("cwe415 shallow assignment of an owned allocation");
        self.data = other.data;
        self.capacity = other.capacity;
        self.state = OwnershipState::Owned;
    }
}

impl Drop for RecordHandle {
    fn drop(&mut self) {
        // A correct handle would bail out here when state is already
        // Released; this one releases unconditionally.
        unsafe { dealloc(self.data, byte_layout(self.capacity)) };
        self.state = OwnershipState::Released;
    }
}

// --- flawed copy-construction scenarios ------------------------------

pub fn copy_straightline(_cfg: &FlowConfig) {
    let original = RecordHandle::new("One");
    let duplicate = original.shallow_copy();
    duplicate.print_data();
    // Scope end: both handles release the same block.
}

pub fn copy_static_predicate_gate(cfg: &FlowConfig) {
    let original = RecordHandle::new("One");
    if cfg.gate() {
        let duplicate = original.shallow_copy();
        duplicate.print_data();
    }
}

pub fn copy_runtime_predicate_gate(_cfg: &FlowConfig) {
    let original = RecordHandle::new("One");
    if runtime_returns_true() {
        let duplicate = original.shallow_copy();
        duplicate.print_data();
    }
}

pub fn copy_reference_alias(_cfg: &FlowConfig) {
    let original = RecordHandle::new("One");
    let original_ref = &original;
    {
        let original = original_ref;
        let duplicate = original.shallow_copy();
        duplicate.print_data();
    }
}

fn copy_sink(original: RecordHandle) {
    let duplicate = original.shallow_copy();
    duplicate.print_data();
    // Both owners go out of scope here, far from the allocation site.
}

pub fn copy_sink_function(_cfg: &FlowConfig) {
    copy_sink(RecordHandle::new("One"));
}

fn copy_source(original: &RecordHandle) -> RecordHandle {
    original.shallow_copy()
}

pub fn copy_source_function(_cfg: &FlowConfig) {
    let original = RecordHandle::new("One");
    let duplicate = copy_source(&original);
    duplicate.print_data();
}

// --- flawed assignment scenarios -------------------------------------

pub fn assign_straightline(_cfg: &FlowConfig) {
    let first = RecordHandle::new("One");
    let mut second = RecordHandle::new("Two");
    second.shallow_assign(&first);
    second.print_data();
}

pub fn assign_static_predicate_gate(cfg: &FlowConfig) {
    let first = RecordHandle::new("One");
    let mut second = RecordHandle::new("Two");
    if cfg.gate() {
        second.shallow_assign(&first);
        second.print_data();
    }
}

pub fn assign_runtime_predicate_gate(_cfg: &FlowConfig) {
    let first = RecordHandle::new("One");
    let mut second = RecordHandle::new("Two");
    if runtime_returns_true() {
        second.shallow_assign(&first);
        second.print_data();
    }
}

pub fn assign_reference_alias(_cfg: &FlowConfig) {
    let first = RecordHandle::new("One");
    let mut second = RecordHandle::new("Two");
    let first_ref = &first;
    {
        let first = first_ref;
        second.shallow_assign(first);
        second.print_data();
    }
}

fn assign_sink(first: RecordHandle, mut second: RecordHandle) {
    second.shallow_assign(&first);
    second.print_data();
}

pub fn assign_sink_function(_cfg: &FlowConfig) {
    assign_sink(RecordHandle::new("One"), RecordHandle::new("Two"));
}

fn assign_source(first: &RecordHandle) -> RecordHandle {
    let mut second = RecordHandle::new("Two");
    second.shallow_assign(first);
    second
}

pub fn assign_source_function(_cfg: &FlowConfig) {
    let first = RecordHandle::new("One");
    // The returned handle already aliases `first`'s allocation.
    let second = assign_source(&first);
    second.print_data();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn test_shallow_copy_yields_two_owners_of_one_block() {
        let original = RecordHandle::new("One");
        let duplicate = original.shallow_copy();

        assert_eq!(original.data_ptr(), duplicate.data_ptr());
        assert_eq!(original.state(), OwnershipState::Owned);
        assert_eq!(duplicate.state(), OwnershipState::Owned);

        // Only one of the aliased owners may actually run its drop,
        // or this test process would perform the double free itself.
        mem::forget(duplicate);
    }

    #[test]
    fn test_shallow_assign_aliases_and_leaks() {
        let first = RecordHandle::new("One");
        let mut second = RecordHandle::new("Two");
        let old_ptr = second.data_ptr();

        second.shallow_assign(&first);

        assert_eq!(second.data_ptr(), first.data_ptr());
        assert_ne!(second.data_ptr(), old_ptr);
        mem::forget(second);
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let original = RecordHandle::new("One");
        let clone = original.deep_clone();

        assert_ne!(original.data_ptr(), clone.data_ptr());
        assert_eq!(clone.text(), "One");
        // Both drop independently with no aliasing.
    }

    #[test]
    fn test_assign_from_reallocates() {
        let first = RecordHandle::new("One");
        let mut second = RecordHandle::new("Two");

        second.assign_from(&first);

        assert_ne!(second.data_ptr(), first.data_ptr());
        assert_eq!(second.text(), "One");
    }

    #[test]
    fn test_handle_stores_nul_terminated_contents() {
        let handle = RecordHandle::new("Fixed String");
        assert_eq!(handle.text(), "Fixed String");
        unsafe {
            assert_eq!(*handle.data_ptr().add(12), 0);
        }
    }
}
