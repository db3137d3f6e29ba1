// crates/quota-ledger-core/tests/counters.rs
// ============================================================================
// Module: Counter Tests
// Description: Verifies reservation arithmetic and the YAML encoding.
// ============================================================================

//! Ensures counter arithmetic is all-or-nothing, zero request counters never
//! constrain, and the serialized field keys match the on-disk contract.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

use quota_ledger_core::ResourceKind;
use quota_ledger_core::ResourceSet;

#[test]
fn empty_set_is_covered_by_anything() {
    let pool = ResourceSet::new();
    assert!(pool.covers(&ResourceSet::new()));
    assert!(pool.is_empty());
}

#[test]
fn zero_request_counters_never_constrain() {
    let pool = ResourceSet::new().with(ResourceKind::Vpc, 1);
    let request = ResourceSet::new().with(ResourceKind::Vpc, 1);
    // Every other counter in the pool is zero yet the request is satisfied.
    assert!(pool.covers(&request));
    let remaining = pool.checked_sub(&request).unwrap();
    assert!(remaining.is_empty());
}

#[test]
fn covers_requires_every_counter() {
    let pool = ResourceSet::new().with(ResourceKind::Vpc, 4).with(ResourceKind::Eip, 1);
    let request = ResourceSet::new().with(ResourceKind::Vpc, 1).with(ResourceKind::Eip, 2);
    assert!(!pool.covers(&request));
}

#[test]
fn checked_sub_is_all_or_nothing() {
    let pool = ResourceSet::new().with(ResourceKind::Vpc, 4).with(ResourceKind::Eip, 1);
    let request = ResourceSet::new().with(ResourceKind::Vpc, 1).with(ResourceKind::Eip, 2);
    assert!(pool.checked_sub(&request).is_none());
    // The receiver is untouched.
    assert_eq!(pool.get(ResourceKind::Vpc), 4);
    assert_eq!(pool.get(ResourceKind::Eip), 1);
}

#[test]
fn checked_sub_subtracts_every_counter() {
    let pool = ResourceSet::new()
        .with(ResourceKind::Ec2Normal, 16)
        .with(ResourceKind::Vpc, 3)
        .with(ResourceKind::Ngw, 2);
    let request = ResourceSet::new()
        .with(ResourceKind::Ec2Normal, 4)
        .with(ResourceKind::Vpc, 1)
        .with(ResourceKind::Ngw, 2);
    let remaining = pool.checked_sub(&request).unwrap();
    assert_eq!(remaining.get(ResourceKind::Ec2Normal), 12);
    assert_eq!(remaining.get(ResourceKind::Vpc), 2);
    assert_eq!(remaining.get(ResourceKind::Ngw), 0);
}

#[test]
fn saturating_add_has_no_upper_clamp() {
    let pool = ResourceSet::new().with(ResourceKind::Vpc, 5);
    let request = ResourceSet::new().with(ResourceKind::Vpc, 1);
    // Documents the leak-amplification behavior: releases are not clamped
    // to the seeded maximum.
    assert_eq!(pool.saturating_add(&request).get(ResourceKind::Vpc), 6);
}

#[test]
fn deficits_report_only_short_counters() {
    let pool = ResourceSet::new().with(ResourceKind::Eip, 2).with(ResourceKind::Vpc, 9);
    let request = ResourceSet::new().with(ResourceKind::Eip, 3).with(ResourceKind::Vpc, 1);
    let deficits = pool.deficits(&request);
    assert_eq!(deficits.len(), 1);
    assert_eq!(deficits[0].kind, ResourceKind::Eip);
    assert_eq!(deficits[0].requested, 3);
    assert_eq!(deficits[0].available, 2);
    assert_eq!(deficits[0].to_string(), "eip: requested 3, available 2");
}

#[test]
fn yaml_keys_match_the_on_disk_contract() {
    let pool = ResourceSet::new()
        .with(ResourceKind::Ec2Normal, 128)
        .with(ResourceKind::ClassicLb, 20)
        .with(ResourceKind::Ec2Gpu, 8)
        .with(ResourceKind::VolumeGp2, 50)
        .with(ResourceKind::EventBridgeRules, 100);
    let encoded = serde_yaml::to_string(&pool).unwrap();
    assert!(encoded.contains("ec2-normal: 128"));
    assert!(encoded.contains("classiclb: 20"));
    assert!(encoded.contains("ec2-GPU: 8"));
    assert!(encoded.contains("volume-GP2: 50"));
    assert!(encoded.contains("eventBridge-rules: 100"));
}

#[test]
fn yaml_round_trip_is_identity() {
    let mut pool = ResourceSet::new();
    for (index, kind) in ResourceKind::ALL.iter().enumerate() {
        pool.set(*kind, u64::try_from(index).unwrap() * 7 + 1);
    }
    let encoded = serde_yaml::to_string(&pool).unwrap();
    let decoded: ResourceSet = serde_yaml::from_str(&encoded).unwrap();
    assert_eq!(decoded, pool);
}

#[test]
fn yaml_decode_rejects_unknown_counters() {
    let result: Result<ResourceSet, _> = serde_yaml::from_str("vpc: 1\nunknown-counter: 3\n");
    assert!(result.is_err());
}

#[test]
fn yaml_decode_defaults_missing_counters_to_zero() {
    let decoded: ResourceSet = serde_yaml::from_str("vpc: 2\n").unwrap();
    assert_eq!(decoded.get(ResourceKind::Vpc), 2);
    assert_eq!(decoded.get(ResourceKind::Eip), 0);
}

#[test]
fn kind_labels_equal_field_keys() {
    let labels: Vec<&str> = ResourceKind::ALL.iter().map(|kind| kind.as_str()).collect();
    assert_eq!(labels, vec![
        "ec2-normal",
        "vpc",
        "eip",
        "igw",
        "ngw",
        "classiclb",
        "ec2-GPU",
        "volume-GP2",
        "eventBridge-rules",
    ]);
}
