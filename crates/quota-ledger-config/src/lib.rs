// crates/quota-ledger-config/src/lib.rs
// ============================================================================
// Module: Quota Ledger Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for quota-ledger.toml semantics.
// Dependencies: quota-ledger-core, serde, toml
// ============================================================================

//! ## Overview
//! `quota-ledger-config` defines the canonical configuration model for the
//! quota ledger tooling. Parsing is strict and validation fails closed:
//! unknown keys, out-of-range intervals, and degenerate paths are rejected
//! before any worker touches the ledger.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
