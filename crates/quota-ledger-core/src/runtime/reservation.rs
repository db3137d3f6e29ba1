// crates/quota-ledger-core/src/runtime/reservation.rs
// ============================================================================
// Module: Reservation Engine
// Description: Cross-process acquire/release loop over the shared ledger.
// Purpose: Guarantee all-or-nothing capacity reservation under one lock.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The engine serializes every ledger mutation behind the injected
//! [`LedgerLock`]: take the lock, load the pool, check-and-apply, write,
//! release. Acquire blocks the calling worker in a poll loop until capacity
//! appears, the deadline passes, or the caller cancels cooperatively.
//! Release retries the lock a bounded number of times and then gives up;
//! a failed release leaks quota units from the ledger until it is reseeded.
//!
//! No fairness is provided: acquisition order is whichever worker next wins
//! the lock with sufficient capacity, so a large request can starve under
//! many small concurrent ones.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use thiserror::Error;

use crate::core::ResourceSet;
use crate::core::WorkerId;
use crate::core::format_deficits;
use crate::interfaces::LedgerLock;
use crate::interfaces::LedgerStore;
use crate::interfaces::LockError;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default capacity re-check cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Default ceiling on one acquisition wait.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(6 * 60 * 60);
/// Default wait between lock attempts.
pub const DEFAULT_LOCK_RETRY_INTERVAL: Duration = Duration::from_secs(1);
/// Default bound on lock attempts during release.
pub const DEFAULT_RELEASE_LOCK_ATTEMPTS: u32 = 20;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Timing knobs for the reservation loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationConfig {
    /// Wait between capacity checks while the pool is insufficient.
    pub poll_interval: Duration,
    /// Hard ceiling on one acquisition; exceeding it is fatal to the caller.
    pub acquire_timeout: Duration,
    /// Wait between attempts to take a contended lock.
    pub lock_retry_interval: Duration,
    /// Bound on lock attempts during release before giving up.
    pub release_lock_attempts: u32,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            lock_retry_interval: DEFAULT_LOCK_RETRY_INTERVAL,
            release_lock_attempts: DEFAULT_RELEASE_LOCK_ATTEMPTS,
        }
    }
}

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Cooperative cancellation flag shared with an in-flight acquire.
///
/// Clones observe the same flag. Cancellation is checked once per loop
/// iteration, so latency is bounded by the configured intervals.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    /// Shared cancellation flag.
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a new, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to every clone of the token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`CancelToken::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Acquisition failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The deadline elapsed before capacity appeared.
    #[error(
        "worker {worker}: resource acquisition timed out after {waited_secs}s; \
         outstanding: {outstanding}"
    )]
    Timeout {
        /// Worker that gave up.
        worker: WorkerId,
        /// Seconds spent waiting.
        waited_secs: u64,
        /// Per-counter shortfall at the last observation.
        outstanding: String,
    },
    /// The caller cancelled the wait.
    #[error("worker {worker}: resource acquisition cancelled")]
    Cancelled {
        /// Worker whose wait was cancelled.
        worker: WorkerId,
    },
    /// The ledger store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The lock primitive failed.
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Release failures.
///
/// A failed release is fatal test infrastructure: the units stay missing
/// from the ledger until it is reseeded.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The lock stayed contended for every allowed attempt.
    #[error("worker {worker}: ledger lock still contended after {attempts} attempts")]
    LockContended {
        /// Worker that gave up.
        worker: WorkerId,
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// The ledger store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The lock primitive failed.
    #[error(transparent)]
    Lock(#[from] LockError),
}

// ============================================================================
// SECTION: Ledger Engine
// ============================================================================

/// Outcome of one locked reservation attempt.
#[derive(Debug)]
enum ReserveOutcome {
    /// The request was subtracted and the pool written back.
    Reserved,
    /// The pool did not cover the request; nothing was mutated.
    Insufficient(ResourceSet),
}

/// Reservation engine over an injected store and lock.
///
/// Cloning shares the same backends, matching the one-ledger-per-suite
/// model.
#[derive(Clone)]
pub struct Ledger {
    /// Persistence backend for the shared pool.
    store: Arc<dyn LedgerStore>,
    /// Mutual-exclusion primitive guarding the pool.
    lock: Arc<dyn LedgerLock>,
    /// Timing configuration.
    config: ReservationConfig,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Ledger {
    /// Creates an engine with default timing.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, lock: Arc<dyn LedgerLock>) -> Self {
        Self::with_config(store, lock, ReservationConfig::default())
    }

    /// Creates an engine with explicit timing.
    #[must_use]
    pub const fn with_config(
        store: Arc<dyn LedgerStore>,
        lock: Arc<dyn LedgerLock>,
        config: ReservationConfig,
    ) -> Self {
        Self {
            store,
            lock,
            config,
        }
    }

    /// Returns the engine's timing configuration.
    #[must_use]
    pub const fn config(&self) -> &ReservationConfig {
        &self.config
    }

    /// Writes the initial pool.
    ///
    /// Single-writer by contract: seeding must finish strictly before any
    /// worker starts acquiring, and is not itself concurrency-safe.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the pool cannot be written.
    pub fn seed(&self, pool: &ResourceSet) -> Result<(), StoreError> {
        self.store.store(pool)
    }

    /// Reads the current pool without taking the lock.
    ///
    /// The snapshot may be stale the moment it returns; it exists for
    /// status reporting, not reservation decisions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the pool cannot be read.
    pub fn snapshot(&self) -> Result<ResourceSet, StoreError> {
        self.store.load()
    }

    /// Blocks until the pool covers the request, then subtracts it.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Timeout`] when the configured ceiling elapses
    /// first, or a store/lock error when a backend fails.
    pub fn acquire(&self, request: &ResourceSet, worker: WorkerId) -> Result<(), AcquireError> {
        self.acquire_with(request, worker, &CancelToken::new())
    }

    /// Blocks like [`Ledger::acquire`] with cooperative cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Cancelled`] once the token fires, in addition
    /// to the failures of [`Ledger::acquire`].
    pub fn acquire_with(
        &self,
        request: &ResourceSet,
        worker: WorkerId,
        cancel: &CancelToken,
    ) -> Result<(), AcquireError> {
        if request.is_empty() {
            return Ok(());
        }
        let started = Instant::now();
        let mut last_observed: Option<ResourceSet> = None;
        loop {
            if cancel.is_cancelled() {
                return Err(AcquireError::Cancelled {
                    worker,
                });
            }
            if started.elapsed() >= self.config.acquire_timeout {
                let outstanding = last_observed.map_or_else(
                    || "ledger not observed, lock stayed contended".to_string(),
                    |pool| format_deficits(&pool.deficits(request)),
                );
                return Err(AcquireError::Timeout {
                    worker,
                    waited_secs: started.elapsed().as_secs(),
                    outstanding,
                });
            }
            if !self.lock.try_acquire()? {
                thread::sleep(self.config.lock_retry_interval);
                continue;
            }
            // Lock is held across the whole read-modify-write section and
            // released on every path, including store failures.
            let attempt = self.try_reserve(request);
            let unlocked = self.lock.release();
            match attempt {
                Ok(ReserveOutcome::Reserved) => {
                    unlocked?;
                    return Ok(());
                }
                Ok(ReserveOutcome::Insufficient(pool)) => {
                    unlocked?;
                    last_observed = Some(pool);
                    thread::sleep(self.config.poll_interval);
                }
                Err(err) => {
                    unlocked?;
                    return Err(AcquireError::Store(err));
                }
            }
        }
    }

    /// Adds a request's counters back into the pool.
    ///
    /// Deliberately unclamped: a release can push a counter past its seeded
    /// value when callers pair acquires and releases inconsistently.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::LockContended`] when the lock stays busy for
    /// every allowed attempt, or a store/lock error when a backend fails.
    pub fn release(&self, request: &ResourceSet, worker: WorkerId) -> Result<(), ReleaseError> {
        if request.is_empty() {
            return Ok(());
        }
        let attempts = self.config.release_lock_attempts;
        for attempt in 1..=attempts {
            if self.lock.try_acquire()? {
                let written = self
                    .store
                    .load()
                    .map(|pool| pool.saturating_add(request))
                    .and_then(|pool| self.store.store(&pool));
                let unlocked = self.lock.release();
                written?;
                unlocked?;
                return Ok(());
            }
            if attempt < attempts {
                thread::sleep(self.config.lock_retry_interval);
            }
        }
        Err(ReleaseError::LockContended {
            worker,
            attempts,
        })
    }

    /// Runs one check-and-apply attempt; the caller holds the lock.
    fn try_reserve(&self, request: &ResourceSet) -> Result<ReserveOutcome, StoreError> {
        let pool = self.store.load()?;
        match pool.checked_sub(request) {
            Some(remaining) => {
                self.store.store(&remaining)?;
                Ok(ReserveOutcome::Reserved)
            }
            None => Ok(ReserveOutcome::Insufficient(pool)),
        }
    }
}
