// SPDX-License-Identifier: PMPL-1.0-or-later

//! Flow-disguise machinery shared by the kernels
//!
//! Everything a flow variant needs that is not the fault itself lives
//! here: the registration-time predicate, the opaque runtime
//! predicate, and the union used for storage aliasing. Keeping these
//! in one place guarantees every kernel's gates look identical to a
//! detector, so the only thing that differs between scenarios is the
//! fault family.

/// Per-scenario configuration, resolved once when the scenario is
/// registered rather than read from a process-wide global.
///
/// The gate value is fixed at registration time, so a
/// `StaticPredicateGate` scenario branches on a value the compiler
/// cannot fold away at the call site but which never actually varies.
#[derive(Debug, Clone, Copy)]
pub struct FlowConfig {
    gate: bool,
}

impl FlowConfig {
    /// The configuration every registered scenario receives: gates
    /// resolve to true, so each scenario's kernel is reachable.
    pub fn resolved() -> Self {
        Self { gate: true }
    }

    pub fn gate(&self) -> bool {
        self.gate
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self::resolved()
    }
}

/// Predicate for `RuntimePredicateGate` scenarios.
///
/// The return value is fixed, but `inline(never)` forces a detector
/// (and the optimizer) to cross a call edge to learn it.
#[inline(never)]
pub fn runtime_returns_true() -> bool {
    true
}

#[inline(never)]
pub fn runtime_returns_false() -> bool {
    false
}

/// Two names over one pointer-sized storage, for `UnionAlias`
/// scenarios.
///
/// Intentionally unsafe by construction: writing `first` and reading
/// `second` reinterprets the same bytes under a different name, which
/// is exactly the aliasing step the variant asks a detector to see
/// through. Only the UnionAlias entry points touch this type.
#[repr(C)]
pub union AliasPair<T: Copy> {
    pub first: T,
    pub second: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_config_opens_the_gate() {
        assert!(FlowConfig::resolved().gate());
        assert!(FlowConfig::default().gate());
    }

    #[test]
    fn test_runtime_predicates_are_fixed() {
        assert!(runtime_returns_true());
        assert!(!runtime_returns_false());
    }

    #[test]
    fn test_alias_pair_members_share_storage() {
        let value: usize = 0xDEAD_BEEF;
        let pair = AliasPair { first: value };
        // Reading the other member must observe the same bytes.
        assert_eq!(unsafe { pair.second }, value);
    }
}
