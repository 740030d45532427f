// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for booby-trap
//!
//! The corpus is indexed along two orthogonal axes: *what* goes wrong
//! (`DefectKind`) and *how execution gets there* (`FlowVariant`). A
//! scenario is one point in that grid, and detectors are measured on
//! whether they can follow the same fault through every disguise.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root-cause defect planted by a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    /// Copy into a struct's leading char array using the size of the
    /// whole struct, clobbering the pointer slots behind it.
    StackOverrunAliasedStruct,
    /// Shallow copy-construction of an owning handle; both copies
    /// release the same allocation on drop.
    DoubleFreeFlawedCopy,
    /// Shallow assignment between owning handles; both release the
    /// same allocation on drop (and the assignee's old buffer leaks).
    DoubleFreeFlawedAssignment,
    /// A scan cursor advanced past the allocation base is handed to
    /// the allocator's release instead of the base pointer.
    FreeNotAtBufferStart,
}

impl DefectKind {
    pub fn all() -> Vec<Self> {
        vec![
            DefectKind::StackOverrunAliasedStruct,
            DefectKind::DoubleFreeFlawedCopy,
            DefectKind::DoubleFreeFlawedAssignment,
            DefectKind::FreeNotAtBufferStart,
        ]
    }

    /// CWE number the defect family is catalogued under.
    pub fn cwe(&self) -> u32 {
        match self {
            DefectKind::StackOverrunAliasedStruct => 121,
            DefectKind::DoubleFreeFlawedCopy => 415,
            DefectKind::DoubleFreeFlawedAssignment => 415,
            DefectKind::FreeNotAtBufferStart => 761,
        }
    }

    /// Stable identifier fragment used in scenario ids.
    pub fn slug(&self) -> &'static str {
        match self {
            DefectKind::StackOverrunAliasedStruct => "stack_overrun_aliased_struct",
            DefectKind::DoubleFreeFlawedCopy => "double_free_flawed_copy",
            DefectKind::DoubleFreeFlawedAssignment => "double_free_flawed_assignment",
            DefectKind::FreeNotAtBufferStart => "free_not_at_buffer_start",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DefectKind::StackOverrunAliasedStruct => {
                "memcpy sized to the enclosing record overruns its leading char field"
            }
            DefectKind::DoubleFreeFlawedCopy => {
                "shallow copy-construction yields two owners of one heap block"
            }
            DefectKind::DoubleFreeFlawedAssignment => {
                "shallow assignment yields two owners of one heap block"
            }
            DefectKind::FreeNotAtBufferStart => {
                "release receives a cursor advanced past the allocation base"
            }
        }
    }
}

impl std::fmt::Display for DefectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CWE{} {}", self.cwe(), self.slug())
    }
}

/// Control/data-flow disguise wrapped around a kernel.
///
/// A variant changes how execution reaches the fault function, never
/// what the fault function does. For a fixed `DefectKind` every
/// applicable variant ends at the identical faulty operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowVariant {
    /// Unconditional call into the kernel.
    Straightline,
    /// Guard whose value was fixed when the scenario was registered.
    StaticPredicateGate,
    /// Guard behind a never-inlined function call, so the detector
    /// must evaluate interprocedurally.
    RuntimePredicateGate,
    /// Second name bound to the same storage by reference in a
    /// nested scope.
    ReferenceAlias,
    /// Second name reached through a union member over the same
    /// storage.
    UnionAlias,
    /// Tainted value handed to a separate function which performs
    /// the fault, separating allocation site from fault site.
    SinkFunctionIndirection,
    /// Tainted value produced by a separate function which performs
    /// the unsafe write before returning.
    SourceFunctionIndirection,
}

impl FlowVariant {
    pub fn all() -> Vec<Self> {
        vec![
            FlowVariant::Straightline,
            FlowVariant::StaticPredicateGate,
            FlowVariant::RuntimePredicateGate,
            FlowVariant::ReferenceAlias,
            FlowVariant::UnionAlias,
            FlowVariant::SinkFunctionIndirection,
            FlowVariant::SourceFunctionIndirection,
        ]
    }

    pub fn slug(&self) -> &'static str {
        match self {
            FlowVariant::Straightline => "straightline",
            FlowVariant::StaticPredicateGate => "static_predicate_gate",
            FlowVariant::RuntimePredicateGate => "runtime_predicate_gate",
            FlowVariant::ReferenceAlias => "reference_alias",
            FlowVariant::UnionAlias => "union_alias",
            FlowVariant::SinkFunctionIndirection => "sink_function",
            FlowVariant::SourceFunctionIndirection => "source_function",
        }
    }

    /// Which variants make sense for a given defect family.
    ///
    /// UnionAlias routes a `Copy` value (a raw pointer) through union
    /// storage; the owning handles of the double-free family are not
    /// `Copy`, and wrapping them in `ManuallyDrop` would change the
    /// drop semantics under test, so the pairing is excluded.
    pub fn applicable_to(kind: DefectKind) -> Vec<Self> {
        match kind {
            DefectKind::StackOverrunAliasedStruct | DefectKind::FreeNotAtBufferStart => Self::all(),
            DefectKind::DoubleFreeFlawedCopy | DefectKind::DoubleFreeFlawedAssignment => {
                Self::all()
                    .into_iter()
                    .filter(|v| *v != FlowVariant::UnionAlias)
                    .collect()
            }
        }
    }
}

impl std::fmt::Display for FlowVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Ownership ledger carried by heap-owning handles.
///
/// The flawed kernels never consult it before releasing; it exists so
/// the tests (and a detector reading the corpus) can see the state a
/// correct implementation would have checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnershipState {
    Owned,
    Released,
}

/// Serializable description of one registered scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInfo {
    pub id: String,
    pub kind: DefectKind,
    pub variant: FlowVariant,
    pub cwe: u32,
    pub description: String,
}

/// Raw outcome of running one scenario in a child process.
///
/// The corpus reports what happened; it renders no verdict on whether
/// the symptom "counts" as a detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub id: String,
    pub kind: DefectKind,
    pub variant: FlowVariant,
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<i32>,
    /// Whether the fault-site progress marker appeared on stdout,
    /// i.e. execution reached the kernel before terminating.
    pub fault_site_reached: bool,
    pub duration: Duration,
}

/// Full sweep across the corpus, one child process per scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub timestamp: String,
    pub corpus_version: String,
    pub outcomes: Vec<ScenarioOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defect_kinds_carry_cwe_numbers() {
        assert_eq!(DefectKind::StackOverrunAliasedStruct.cwe(), 121);
        assert_eq!(DefectKind::DoubleFreeFlawedCopy.cwe(), 415);
        assert_eq!(DefectKind::DoubleFreeFlawedAssignment.cwe(), 415);
        assert_eq!(DefectKind::FreeNotAtBufferStart.cwe(), 761);
    }

    #[test]
    fn test_slugs_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in DefectKind::all() {
            assert!(seen.insert(kind.slug()), "duplicate kind slug {}", kind.slug());
        }
        seen.clear();
        for variant in FlowVariant::all() {
            assert!(
                seen.insert(variant.slug()),
                "duplicate variant slug {}",
                variant.slug()
            );
        }
    }

    #[test]
    fn test_union_alias_excluded_for_owning_handles() {
        for kind in [
            DefectKind::DoubleFreeFlawedCopy,
            DefectKind::DoubleFreeFlawedAssignment,
        ] {
            let applicable = FlowVariant::applicable_to(kind);
            assert_eq!(applicable.len(), 6);
            assert!(!applicable.contains(&FlowVariant::UnionAlias));
        }
        assert_eq!(
            FlowVariant::applicable_to(DefectKind::FreeNotAtBufferStart).len(),
            7
        );
    }
}
