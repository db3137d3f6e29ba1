// crates/quota-ledger-core/src/interfaces/mod.rs
// ============================================================================
// Module: Quota Ledger Interfaces
// Description: Backend-agnostic interfaces for storage, locking, and quotas.
// Purpose: Define the contract surfaces used by the reservation runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the reservation runtime integrates with persistence
//! and mutual exclusion without embedding backend details. The production
//! backends are a YAML file and an OS advisory file lock; tests substitute
//! in-memory implementations so the acquire/release logic runs without file
//! I/O or real OS locks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::QuotaDescriptor;
use crate::core::QuotaRequestStatus;
use crate::core::ResourceSet;

// ============================================================================
// SECTION: Ledger Store
// ============================================================================

/// Ledger storage errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed.
    #[error("ledger store i/o error: {0}")]
    Io(String),
    /// Encoding or decoding the ledger failed.
    #[error("ledger codec error: {0}")]
    Codec(String),
    /// The stored ledger violates a structural constraint.
    #[error("invalid ledger: {0}")]
    Invalid(String),
}

/// Persistence backend for the shared ledger.
///
/// Implementations are not required to be internally synchronized; callers
/// hold the [`LedgerLock`] across every read-modify-write sequence.
pub trait LedgerStore: Send + Sync {
    /// Loads the current ledger pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the ledger cannot be read or decoded.
    fn load(&self) -> Result<ResourceSet, StoreError>;

    /// Replaces the ledger pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the ledger cannot be encoded or written.
    fn store(&self, pool: &ResourceSet) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Ledger Lock
// ============================================================================

/// Lock primitive errors.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock primitive itself failed, distinct from contention.
    #[error("ledger lock error: {0}")]
    Lock(String),
}

/// Cooperative mutual-exclusion primitive guarding the ledger.
///
/// One lock object exists per ledger path; contention is reported through
/// the `Ok(false)` return of [`LedgerLock::try_acquire`], never as an error.
pub trait LedgerLock: Send + Sync {
    /// Attempts to take the lock without blocking.
    ///
    /// Returns `Ok(true)` when the lock was taken, `Ok(false)` when another
    /// holder currently owns it.
    ///
    /// # Errors
    ///
    /// Returns [`LockError`] when the primitive fails outright.
    fn try_acquire(&self) -> Result<bool, LockError>;

    /// Releases a previously taken lock.
    ///
    /// # Errors
    ///
    /// Returns [`LockError`] when the lock was not held or release fails.
    fn release(&self) -> Result<(), LockError>;
}

// ============================================================================
// SECTION: Request Sink
// ============================================================================

/// Diagnostic sink for per-scenario resource requests.
///
/// Entries are keyed by scenario name with insert-or-overwrite semantics.
/// The sink is purely informational and is never read back for reservation
/// logic.
pub trait RequestSink: Send + Sync {
    /// Records the request a scenario asked for.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record cannot be persisted.
    fn record(&self, scenario: &str, request: &ResourceSet) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Quota Source
// ============================================================================

/// Quota source errors.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// The provider reported an error.
    #[error("quota source error: {0}")]
    Source(String),
}

/// Provider-side view of account service quotas.
///
/// Stand-in for the cloud SDK surface the suite consumes; reproducing real
/// SDK bindings is out of scope.
pub trait QuotaSource {
    /// Resolves the account's current value for a quota.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError`] when the quota cannot be fetched.
    fn current_value(&self, descriptor: &QuotaDescriptor) -> Result<u64, QuotaError>;

    /// Requests an increase toward the descriptor's desired minimum.
    ///
    /// # Errors
    ///
    /// Returns [`QuotaError`] when the request cannot be submitted.
    fn request_increase(&self, descriptor: &QuotaDescriptor)
    -> Result<QuotaRequestStatus, QuotaError>;
}
