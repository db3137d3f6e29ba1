// crates/quota-ledger-store-file/src/sink.rs
// ============================================================================
// Module: File Request Sink
// Description: File-backed log of per-scenario resource requests.
// Purpose: Record requested resources for human diagnosis, lock-guarded.
// Dependencies: quota-ledger-core, serde_yaml
// ============================================================================

//! ## Overview
//! The request log is a YAML map from scenario name to the request that
//! scenario asked for. It is purely informational and is never read back
//! for reservation decisions, but concurrent writers still go through an
//! advisory lock so entries are not lost to interleaved read-modify-write
//! cycles.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use quota_ledger_core::ResourceSet;
use quota_ledger_core::interfaces::LedgerLock;
use quota_ledger_core::interfaces::RequestSink;
use quota_ledger_core::interfaces::StoreError;

use crate::lock::AdvisoryFileLock;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default bound on lock attempts for one record.
const DEFAULT_RECORD_LOCK_ATTEMPTS: u32 = 20;
/// Default wait between lock attempts.
const DEFAULT_RECORD_LOCK_RETRY: Duration = Duration::from_millis(100);

// ============================================================================
// SECTION: File Request Sink
// ============================================================================

/// Request log backed by one YAML file, guarded by its own advisory lock.
#[derive(Debug)]
pub struct FileRequestSink {
    /// Log file path.
    path: PathBuf,
    /// Advisory lock keyed on the log file path.
    lock: AdvisoryFileLock,
    /// Bound on lock attempts for one record.
    lock_attempts: u32,
    /// Wait between lock attempts.
    lock_retry: Duration,
}

impl FileRequestSink {
    /// Creates a sink over the log file at `path` with default lock timing.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_lock_timing(path, DEFAULT_RECORD_LOCK_ATTEMPTS, DEFAULT_RECORD_LOCK_RETRY)
    }

    /// Creates a sink with explicit lock timing.
    #[must_use]
    pub fn with_lock_timing(
        path: impl Into<PathBuf>,
        lock_attempts: u32,
        lock_retry: Duration,
    ) -> Self {
        let path = path.into();
        Self {
            lock: AdvisoryFileLock::new(path.clone()),
            path,
            lock_attempts,
            lock_retry,
        }
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full log map, treating a missing file as empty.
    fn read_entries(&self) -> Result<BTreeMap<String, ResourceSet>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(StoreError::Io(format!("read {}: {err}", self.path.display())));
            }
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_yaml::from_str(&content).map_err(|err| StoreError::Codec(err.to_string()))
    }

    /// Runs one record under the held lock.
    fn record_locked(&self, scenario: &str, request: &ResourceSet) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        entries.insert(scenario.to_string(), *request);
        let encoded =
            serde_yaml::to_string(&entries).map_err(|err| StoreError::Codec(err.to_string()))?;
        fs::write(&self.path, encoded)
            .map_err(|err| StoreError::Io(format!("write {}: {err}", self.path.display())))
    }
}

impl RequestSink for FileRequestSink {
    fn record(&self, scenario: &str, request: &ResourceSet) -> Result<(), StoreError> {
        for attempt in 1..=self.lock_attempts {
            let taken = self
                .lock
                .try_acquire()
                .map_err(|err| StoreError::Io(err.to_string()))?;
            if taken {
                let written = self.record_locked(scenario, request);
                let unlocked =
                    self.lock.release().map_err(|err| StoreError::Io(err.to_string()));
                written?;
                return unlocked;
            }
            if attempt < self.lock_attempts {
                thread::sleep(self.lock_retry);
            }
        }
        Err(StoreError::Io(format!(
            "request log {} lock still contended after {} attempts",
            self.path.display(),
            self.lock_attempts
        )))
    }
}
