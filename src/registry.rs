// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scenario registry
//!
//! Enumerates every (DefectKind, applicable FlowVariant) pairing as
//! an independently invocable unit with a stable id of the form
//! `<kind_slug>__<variant_slug>`. A harness lists the scenarios,
//! invokes one per process, and observes the outcome out-of-band.

use crate::flow::FlowConfig;
use crate::kernels::{double_free, free_offset, overrun};
use crate::types::{DefectKind, FlowVariant, ScenarioInfo};

pub type ScenarioFn = fn(&FlowConfig);

/// One registered (kernel, flow variant) pairing.
pub struct Scenario {
    pub info: ScenarioInfo,
    config: FlowConfig,
    entry: ScenarioFn,
}

impl Scenario {
    /// The harness entry point: no arguments, no return value. The
    /// process may continue, corrupt state, or die in here; all three
    /// are accepted terminal outcomes.
    pub fn invoke(&self) {
        (self.entry)(&self.config)
    }
}

/// The full corpus, built in deterministic order.
pub struct Registry {
    scenarios: Vec<Scenario>,
}

impl Registry {
    pub fn build() -> Self {
        let mut scenarios = Vec::new();
        for kind in DefectKind::all() {
            for variant in FlowVariant::all() {
                let Some(entry) = entry_for(kind, variant) else {
                    continue;
                };
                scenarios.push(Scenario {
                    info: ScenarioInfo {
                        id: scenario_id(kind, variant),
                        kind,
                        variant,
                        cwe: kind.cwe(),
                        description: kind.description().to_string(),
                    },
                    // Gate values are fixed here, at registration
                    // time, not read from a process-wide global.
                    config: FlowConfig::resolved(),
                    entry,
                });
            }
        }
        Self { scenarios }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn find(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.info.id == id)
    }

    pub fn infos(&self) -> Vec<ScenarioInfo> {
        self.scenarios.iter().map(|s| s.info.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

pub fn scenario_id(kind: DefectKind, variant: FlowVariant) -> String {
    format!("{}__{}", kind.slug(), variant.slug())
}

/// Entry-point table. `None` marks pairings the corpus does not
/// contain; `FlowVariant::applicable_to` mirrors this table and the
/// tests keep the two in sync.
fn entry_for(kind: DefectKind, variant: FlowVariant) -> Option<ScenarioFn> {
    use DefectKind as K;
    use FlowVariant as V;

    let entry: ScenarioFn = match (kind, variant) {
        (K::StackOverrunAliasedStruct, V::Straightline) => overrun::straightline,
        (K::StackOverrunAliasedStruct, V::StaticPredicateGate) => overrun::static_predicate_gate,
        (K::StackOverrunAliasedStruct, V::RuntimePredicateGate) => overrun::runtime_predicate_gate,
        (K::StackOverrunAliasedStruct, V::ReferenceAlias) => overrun::reference_alias,
        (K::StackOverrunAliasedStruct, V::UnionAlias) => overrun::union_alias,
        (K::StackOverrunAliasedStruct, V::SinkFunctionIndirection) => overrun::sink_function,
        (K::StackOverrunAliasedStruct, V::SourceFunctionIndirection) => overrun::source_function,

        (K::DoubleFreeFlawedCopy, V::Straightline) => double_free::copy_straightline,
        (K::DoubleFreeFlawedCopy, V::StaticPredicateGate) => {
            double_free::copy_static_predicate_gate
        }
        (K::DoubleFreeFlawedCopy, V::RuntimePredicateGate) => {
            double_free::copy_runtime_predicate_gate
        }
        (K::DoubleFreeFlawedCopy, V::ReferenceAlias) => double_free::copy_reference_alias,
        (K::DoubleFreeFlawedCopy, V::SinkFunctionIndirection) => double_free::copy_sink_function,
        (K::DoubleFreeFlawedCopy, V::SourceFunctionIndirection) => {
            double_free::copy_source_function
        }
        (K::DoubleFreeFlawedCopy, V::UnionAlias) => return None,

        (K::DoubleFreeFlawedAssignment, V::Straightline) => double_free::assign_straightline,
        (K::DoubleFreeFlawedAssignment, V::StaticPredicateGate) => {
            double_free::assign_static_predicate_gate
        }
        (K::DoubleFreeFlawedAssignment, V::RuntimePredicateGate) => {
            double_free::assign_runtime_predicate_gate
        }
        (K::DoubleFreeFlawedAssignment, V::ReferenceAlias) => double_free::assign_reference_alias,
        (K::DoubleFreeFlawedAssignment, V::SinkFunctionIndirection) => {
            double_free::assign_sink_function
        }
        (K::DoubleFreeFlawedAssignment, V::SourceFunctionIndirection) => {
            double_free::assign_source_function
        }
        (K::DoubleFreeFlawedAssignment, V::UnionAlias) => return None,

        (K::FreeNotAtBufferStart, V::Straightline) => free_offset::straightline,
        (K::FreeNotAtBufferStart, V::StaticPredicateGate) => free_offset::static_predicate_gate,
        (K::FreeNotAtBufferStart, V::RuntimePredicateGate) => free_offset::runtime_predicate_gate,
        (K::FreeNotAtBufferStart, V::ReferenceAlias) => free_offset::reference_alias,
        (K::FreeNotAtBufferStart, V::UnionAlias) => free_offset::union_alias,
        (K::FreeNotAtBufferStart, V::SinkFunctionIndirection) => free_offset::sink_function,
        (K::FreeNotAtBufferStart, V::SourceFunctionIndirection) => free_offset::source_function,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_enumerates_the_full_corpus() {
        let registry = Registry::build();
        assert_eq!(registry.len(), 26);

        let per_kind = |kind: DefectKind| {
            registry
                .scenarios()
                .iter()
                .filter(|s| s.info.kind == kind)
                .count()
        };
        assert_eq!(per_kind(DefectKind::StackOverrunAliasedStruct), 7);
        assert_eq!(per_kind(DefectKind::DoubleFreeFlawedCopy), 6);
        assert_eq!(per_kind(DefectKind::DoubleFreeFlawedAssignment), 6);
        assert_eq!(per_kind(DefectKind::FreeNotAtBufferStart), 7);
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = Registry::build();
        let mut seen = HashSet::new();
        for scenario in registry.scenarios() {
            assert!(
                seen.insert(scenario.info.id.clone()),
                "duplicate scenario id {}",
                scenario.info.id
            );
        }
    }

    #[test]
    fn test_ids_are_stable_across_builds() {
        let first: Vec<_> = Registry::build().infos().into_iter().map(|i| i.id).collect();
        let second: Vec<_> = Registry::build().infos().into_iter().map(|i| i.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_known_ids_resolve() {
        let registry = Registry::build();
        for id in [
            "stack_overrun_aliased_struct__straightline",
            "double_free_flawed_copy__static_predicate_gate",
            "double_free_flawed_assignment__sink_function",
            "free_not_at_buffer_start__union_alias",
        ] {
            assert!(registry.find(id).is_some(), "missing scenario {}", id);
        }
        assert!(registry.find("no_such_scenario").is_none());
    }

    #[test]
    fn test_entry_table_matches_applicability() {
        for kind in DefectKind::all() {
            let applicable = FlowVariant::applicable_to(kind);
            for variant in FlowVariant::all() {
                assert_eq!(
                    entry_for(kind, variant).is_some(),
                    applicable.contains(&variant),
                    "entry table and applicability disagree on {:?}/{:?}",
                    kind,
                    variant
                );
            }
        }
    }
}
