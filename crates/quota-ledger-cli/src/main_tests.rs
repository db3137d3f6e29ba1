// crates/quota-ledger-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument mapping and file decoding helpers.
// Purpose: Ensure CLI inputs translate correctly into engine requests.
// Dependencies: quota-ledger-cli main helpers
// ============================================================================

//! ## Overview
//! Validates the flag-to-counter mapping, worker resolution, and seed file
//! decoding used by the CLI entry point.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::Parser;
use quota_ledger_core::ResourceKind;

use super::Cli;
use super::CliError;
use super::Commands;
use super::ResourceArgs;
use super::read_pool_file;
use super::resolve_worker;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a unique temp file path for one test.
fn temp_file(label: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock drift").as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("quota-ledger-cli-{label}-{nanos}.yaml"));
    path
}

/// Best-effort removal of a test file.
fn cleanup(path: &PathBuf) {
    let _ = fs::remove_file(path);
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn resource_args_default_to_empty_set() {
    let args = ResourceArgs::default();
    assert!(args.into_set().is_empty());
}

#[test]
fn resource_args_map_every_counter() {
    let args = ResourceArgs {
        ec2_normal: 1,
        vpc: 2,
        eip: 3,
        igw: 4,
        ngw: 5,
        classic_lb: 6,
        ec2_gpu: 7,
        volume_gp2: 8,
        event_bridge_rules: 9,
    };
    let set = args.into_set();
    assert_eq!(set.get(ResourceKind::Ec2Normal), 1);
    assert_eq!(set.get(ResourceKind::Vpc), 2);
    assert_eq!(set.get(ResourceKind::Eip), 3);
    assert_eq!(set.get(ResourceKind::Igw), 4);
    assert_eq!(set.get(ResourceKind::Ngw), 5);
    assert_eq!(set.get(ResourceKind::ClassicLb), 6);
    assert_eq!(set.get(ResourceKind::Ec2Gpu), 7);
    assert_eq!(set.get(ResourceKind::VolumeGp2), 8);
    assert_eq!(set.get(ResourceKind::EventBridgeRules), 9);
}

#[test]
fn acquire_flags_parse_kebab_case_counters() {
    let cli = Cli::parse_from([
        "quota-ledger",
        "acquire",
        "--scenario",
        "upgrade",
        "--worker",
        "3",
        "--vpc",
        "2",
        "--ec2-normal",
        "8",
        "--eventbridge-rules",
        "1",
    ]);
    match cli.command {
        Commands::Acquire(command) => {
            assert_eq!(command.scenario, "upgrade");
            assert_eq!(command.worker, Some(3));
            let set = command.resources.into_set();
            assert_eq!(set.get(ResourceKind::Vpc), 2);
            assert_eq!(set.get(ResourceKind::Ec2Normal), 8);
            assert_eq!(set.get(ResourceKind::EventBridgeRules), 1);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn resolve_worker_prefers_explicit_flag() {
    let worker = resolve_worker(Some(7));
    assert_eq!(worker.as_u32(), 7);
}

#[test]
fn read_pool_file_decodes_yaml_counters() {
    let path = temp_file("pool");
    fs::write(&path, "ec2-normal: 128\nvpc: 25\n").expect("write pool file");

    let pool = read_pool_file(&path).expect("decode pool file");
    assert_eq!(pool.get(ResourceKind::Ec2Normal), 128);
    assert_eq!(pool.get(ResourceKind::Vpc), 25);
    assert_eq!(pool.get(ResourceKind::Eip), 0);

    cleanup(&path);
}

#[test]
fn read_pool_file_rejects_unknown_keys() {
    let path = temp_file("pool-unknown");
    fs::write(&path, "vpc: 1\nmystery: 2\n").expect("write pool file");

    let err = read_pool_file(&path).expect_err("expected decode failure");
    assert!(err.to_string().contains("decode"));

    cleanup(&path);
}

#[test]
fn read_pool_file_reports_missing_file() {
    let path = temp_file("pool-missing");
    let err = read_pool_file(&path).expect_err("expected read failure");
    assert!(err.to_string().contains("read"));
}

#[test]
fn cli_error_displays_message_verbatim() {
    let err = CliError::new("ledger seeded twice".to_string());
    assert_eq!(err.to_string(), "ledger seeded twice");
}
