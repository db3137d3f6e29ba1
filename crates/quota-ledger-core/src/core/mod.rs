// crates/quota-ledger-core/src/core/mod.rs
// ============================================================================
// Module: Quota Ledger Core Types
// Description: Canonical counter and quota structures.
// Purpose: Provide stable, serializable types for ledger and request values.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types define the counter shape shared by the persisted ledger and
//! per-scenario requests, plus the service-quota records used to seed the
//! ledger from account limits. These types are the canonical source of truth
//! for the on-disk YAML encoding.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod counters;
pub mod quota;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use counters::Deficit;
pub use counters::ResourceKind;
pub use counters::ResourceRequest;
pub use counters::ResourceSet;
pub use counters::WorkerId;
pub use counters::format_deficits;
pub use quota::QuotaDescriptor;
pub use quota::QuotaRequestStatus;
pub use quota::ServiceQuota;
pub use quota::limited_resources;
pub use quota::seed_pool;
