// crates/quota-ledger-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Backends
// Description: Store, lock, sink, and quota-source implementations for tests.
// Purpose: Exercise the reservation protocol without file I/O or OS locks.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! This module provides in-memory implementations of every interface the
//! runtime consumes. They preserve the production contracts — the lock is
//! try-acquire with explicit release, the store is a dumb load/replace — so
//! protocol tests run against the same code paths as the file backends.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::core::QuotaDescriptor;
use crate::core::QuotaRequestStatus;
use crate::core::ResourceSet;
use crate::interfaces::LedgerLock;
use crate::interfaces::LedgerStore;
use crate::interfaces::LockError;
use crate::interfaces::QuotaError;
use crate::interfaces::QuotaSource;
use crate::interfaces::RequestSink;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory ledger store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedgerStore {
    /// Pool protected by a mutex.
    pool: Arc<Mutex<ResourceSet>>,
}

impl InMemoryLedgerStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a pool.
    #[must_use]
    pub fn with_pool(pool: ResourceSet) -> Self {
        Self {
            pool: Arc::new(Mutex::new(pool)),
        }
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn load(&self) -> Result<ResourceSet, StoreError> {
        let guard =
            self.pool.lock().map_err(|_| StoreError::Io("store mutex poisoned".to_string()))?;
        Ok(*guard)
    }

    fn store(&self, pool: &ResourceSet) -> Result<(), StoreError> {
        let mut guard =
            self.pool.lock().map_err(|_| StoreError::Io("store mutex poisoned".to_string()))?;
        *guard = *pool;
        Ok(())
    }
}

// ============================================================================
// SECTION: In-Memory Lock
// ============================================================================

/// In-memory try-lock with the advisory-lock contract.
///
/// # Invariants
/// - Release without a prior acquire is an error, matching misuse detection
///   the OS lock cannot provide.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedgerLock {
    /// Whether some holder currently owns the lock.
    held: Arc<AtomicBool>,
}

impl InMemoryLedgerLock {
    /// Creates an unheld lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerLock for InMemoryLedgerLock {
    fn try_acquire(&self) -> Result<bool, LockError> {
        Ok(self.held.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok())
    }

    fn release(&self) -> Result<(), LockError> {
        self.held
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| LockError::Lock("released while not held".to_string()))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: In-Memory Request Sink
// ============================================================================

/// In-memory request log keyed by scenario name.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRequestSink {
    /// Recorded requests protected by a mutex.
    entries: Arc<Mutex<BTreeMap<String, ResourceSet>>>,
}

impl InMemoryRequestSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every recorded request.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the sink mutex is poisoned.
    pub fn entries(&self) -> Result<BTreeMap<String, ResourceSet>, StoreError> {
        let guard =
            self.entries.lock().map_err(|_| StoreError::Io("sink mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

impl RequestSink for InMemoryRequestSink {
    fn record(&self, scenario: &str, request: &ResourceSet) -> Result<(), StoreError> {
        let mut guard =
            self.entries.lock().map_err(|_| StoreError::Io("sink mutex poisoned".to_string()))?;
        guard.insert(scenario.to_string(), *request);
        Ok(())
    }
}

// ============================================================================
// SECTION: Static Quota Source
// ============================================================================

/// Quota source answering from a fixed code-to-value table.
///
/// Used for offline seeding and tests; increase requests are acknowledged
/// as pending without side effects.
#[derive(Debug, Default, Clone)]
pub struct StaticQuotaSource {
    /// Quota values keyed by provider quota code.
    values: BTreeMap<String, u64>,
}

impl StaticQuotaSource {
    /// Creates a source from quota-code/value pairs.
    #[must_use]
    pub fn new(values: BTreeMap<String, u64>) -> Self {
        Self {
            values,
        }
    }
}

impl QuotaSource for StaticQuotaSource {
    fn current_value(&self, descriptor: &QuotaDescriptor) -> Result<u64, QuotaError> {
        self.values.get(&descriptor.quota_code).copied().ok_or_else(|| {
            QuotaError::Source(format!("no value for quota code {}", descriptor.quota_code))
        })
    }

    fn request_increase(
        &self,
        _descriptor: &QuotaDescriptor,
    ) -> Result<QuotaRequestStatus, QuotaError> {
        Ok(QuotaRequestStatus::Pending)
    }
}
