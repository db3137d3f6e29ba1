// crates/quota-ledger-store-file/src/lock.rs
// ============================================================================
// Module: Advisory File Lock
// Description: OS advisory lock keyed on the ledger file path.
// Purpose: Arbitrate the ledger across independent worker processes.
// Dependencies: quota-ledger-core, fs2
// ============================================================================

//! ## Overview
//! One lock object exists per ledger path. Acquisition opens the file
//! (creating it when absent) and takes an exclusive `flock`-style lock on
//! the open descriptor; contention surfaces as `Ok(false)`, never as an
//! error. The lock is cooperative: only processes that also go through this
//! lock are excluded, which is all the cross-worker protocol requires.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use fs2::FileExt;
use quota_ledger_core::interfaces::LedgerLock;
use quota_ledger_core::interfaces::LockError;

// ============================================================================
// SECTION: Advisory File Lock
// ============================================================================

/// Exclusive advisory lock on a file path.
///
/// # Invariants
/// - The handle is held for exactly the acquire-to-release window; the open
///   descriptor is dropped on release.
/// - A second `try_acquire` on the same object while held reports
///   contention instead of re-entering.
#[derive(Debug)]
pub struct AdvisoryFileLock {
    /// Path the lock is keyed on.
    path: PathBuf,
    /// Open, locked file handle while held.
    handle: Mutex<Option<File>>,
}

impl AdvisoryFileLock {
    /// Creates an unheld lock keyed on `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            handle: Mutex::new(None),
        }
    }

    /// Returns the path the lock is keyed on.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerLock for AdvisoryFileLock {
    fn try_acquire(&self) -> Result<bool, LockError> {
        let mut guard = self
            .handle
            .lock()
            .map_err(|_| LockError::Lock("lock handle mutex poisoned".to_string()))?;
        if guard.is_some() {
            return Ok(false);
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|err| LockError::Lock(format!("open {}: {err}", self.path.display())))?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                *guard = Some(file);
                Ok(true)
            }
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => Ok(false),
            Err(err) => {
                Err(LockError::Lock(format!("lock {}: {err}", self.path.display())))
            }
        }
    }

    fn release(&self) -> Result<(), LockError> {
        let mut guard = self
            .handle
            .lock()
            .map_err(|_| LockError::Lock("lock handle mutex poisoned".to_string()))?;
        let file = guard
            .take()
            .ok_or_else(|| LockError::Lock("released while not held".to_string()))?;
        file.unlock()
            .map_err(|err| LockError::Lock(format!("unlock {}: {err}", self.path.display())))
    }
}
