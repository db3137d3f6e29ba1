// crates/quota-ledger-core/src/runtime/mod.rs
// ============================================================================
// Module: Quota Ledger Runtime
// Description: Reservation engine and in-memory backends.
// Purpose: Provide the acquire/release loop over injected store and lock.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime implements the cooperative reservation protocol: workers poll
//! the shared ledger under an exclusive lock, subtract their request when the
//! pool covers it, and add it back on release. In-memory backends make the
//! protocol unit-testable without file I/O.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod memory;
pub mod quotas;
pub mod reservation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use memory::InMemoryLedgerLock;
pub use memory::InMemoryLedgerStore;
pub use memory::InMemoryRequestSink;
pub use memory::StaticQuotaSource;
pub use quotas::ensure_service_quotas;
pub use reservation::AcquireError;
pub use reservation::CancelToken;
pub use reservation::DEFAULT_ACQUIRE_TIMEOUT;
pub use reservation::DEFAULT_LOCK_RETRY_INTERVAL;
pub use reservation::DEFAULT_POLL_INTERVAL;
pub use reservation::DEFAULT_RELEASE_LOCK_ATTEMPTS;
pub use reservation::Ledger;
pub use reservation::ReleaseError;
pub use reservation::ReservationConfig;
