// crates/quota-ledger-core/tests/proptest_counters.rs
// ============================================================================
// Module: Counter Property-Based Tests
// Description: Property tests for reservation arithmetic invariants.
// ============================================================================

//! Property-based tests tying `covers`, `checked_sub`, `saturating_add`,
//! and `deficits` together across wide counter ranges.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use quota_ledger_core::ResourceKind;
use quota_ledger_core::ResourceSet;

/// Counter bound keeping additions far from overflow.
const MAX_COUNTER: u64 = 1 << 32;

/// Strategy producing counter sets across the full kind space.
fn resource_set_strategy() -> impl Strategy<Value = ResourceSet> {
    prop::collection::vec(0_u64..MAX_COUNTER, ResourceKind::ALL.len()).prop_map(|values| {
        let mut set = ResourceSet::new();
        for (kind, value) in ResourceKind::ALL.iter().zip(values) {
            set.set(*kind, value);
        }
        set
    })
}

proptest! {
    #[test]
    fn covers_iff_checked_sub_succeeds(
        pool in resource_set_strategy(),
        request in resource_set_strategy(),
    ) {
        prop_assert_eq!(pool.covers(&request), pool.checked_sub(&request).is_some());
    }

    #[test]
    fn subtract_then_add_is_identity(
        pool in resource_set_strategy(),
        request in resource_set_strategy(),
    ) {
        if let Some(remaining) = pool.checked_sub(&request) {
            prop_assert_eq!(remaining.saturating_add(&request), pool);
        }
    }

    #[test]
    fn deficits_empty_iff_covered(
        pool in resource_set_strategy(),
        request in resource_set_strategy(),
    ) {
        prop_assert_eq!(pool.deficits(&request).is_empty(), pool.covers(&request));
    }

    #[test]
    fn failed_subtraction_never_mutates(
        pool in resource_set_strategy(),
        request in resource_set_strategy(),
    ) {
        let before = pool;
        let _ = pool.checked_sub(&request);
        prop_assert_eq!(pool, before);
    }

    #[test]
    fn yaml_round_trip_is_identity(pool in resource_set_strategy()) {
        let encoded = serde_yaml::to_string(&pool).unwrap();
        let decoded: ResourceSet = serde_yaml::from_str(&encoded).unwrap();
        prop_assert_eq!(decoded, pool);
    }
}
