// crates/quota-ledger-core/src/lib.rs
// ============================================================================
// Module: Quota Ledger Core Library
// Description: Public API surface for the quota ledger core.
// Purpose: Expose counter types, interfaces, and the reservation runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Quota Ledger core provides a cooperative reservation mechanism for shared
//! cloud capacity. Independently scheduled test workers acquire capacity
//! slots from a single persisted ledger before provisioning infrastructure
//! and release them afterward, so parallel runs never collectively exceed the
//! account's service quotas. The runtime is backend-agnostic and integrates
//! through explicit storage and lock interfaces rather than embedding file or
//! SDK details.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::LedgerLock;
pub use interfaces::LedgerStore;
pub use interfaces::LockError;
pub use interfaces::QuotaError;
pub use interfaces::QuotaSource;
pub use interfaces::RequestSink;
pub use interfaces::StoreError;
pub use runtime::AcquireError;
pub use runtime::CancelToken;
pub use runtime::InMemoryLedgerLock;
pub use runtime::InMemoryLedgerStore;
pub use runtime::InMemoryRequestSink;
pub use runtime::Ledger;
pub use runtime::ReleaseError;
pub use runtime::ReservationConfig;
pub use runtime::StaticQuotaSource;
pub use runtime::ensure_service_quotas;
