// crates/quota-ledger-store-file/src/store.rs
// ============================================================================
// Module: YAML Ledger Store
// Description: Flat-file YAML persistence for the shared ledger.
// Purpose: Load and replace the pool with strict size and decode checks.
// Dependencies: quota-ledger-core, serde_yaml
// ============================================================================

//! ## Overview
//! The ledger lives in one YAML file mapping counter names to remaining
//! units. Writes truncate in place: correctness comes from the advisory
//! lock held by the caller, not from atomic-rename tricks, which would
//! change the inode the lock is keyed on. Reads fail closed on missing
//! files, oversized files, and unknown or malformed counters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use quota_ledger_core::ResourceSet;
use quota_ledger_core::interfaces::LedgerStore;
use quota_ledger_core::interfaces::StoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum ledger file size in bytes.
pub const MAX_LEDGER_FILE_SIZE: usize = 64 * 1024;
/// Filename of the seed-time artifact copy of the initial pool.
pub const INITIAL_QUOTAS_FILENAME: &str = "initial-resource-quotas.yaml";

// ============================================================================
// SECTION: YAML Ledger Store
// ============================================================================

/// Ledger store backed by one YAML file.
///
/// # Invariants
/// - The file path never changes after construction; the advisory lock is
///   keyed on the same path.
#[derive(Debug, Clone)]
pub struct YamlLedgerStore {
    /// Ledger file path.
    path: PathBuf,
}

impl YamlLedgerStore {
    /// Creates a store over the ledger file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Returns the ledger file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for YamlLedgerStore {
    fn load(&self) -> Result<ResourceSet, StoreError> {
        let bytes = fs::read(&self.path).map_err(|err| {
            StoreError::Io(format!("read {}: {err}", self.path.display()))
        })?;
        if bytes.len() > MAX_LEDGER_FILE_SIZE {
            return Err(StoreError::Invalid(format!(
                "ledger file {} exceeds {MAX_LEDGER_FILE_SIZE} bytes",
                self.path.display()
            )));
        }
        let content = std::str::from_utf8(&bytes).map_err(|_| {
            StoreError::Invalid(format!("ledger file {} must be utf-8", self.path.display()))
        })?;
        serde_yaml::from_str(content).map_err(|err| StoreError::Codec(err.to_string()))
    }

    fn store(&self, pool: &ResourceSet) -> Result<(), StoreError> {
        let encoded =
            serde_yaml::to_string(pool).map_err(|err| StoreError::Codec(err.to_string()))?;
        fs::write(&self.path, encoded).map_err(|err| {
            StoreError::Io(format!("write {}: {err}", self.path.display()))
        })
    }
}

// ============================================================================
// SECTION: Seed Artifact
// ============================================================================

/// Writes the seed-time artifact copy of the initial pool into `dir`.
///
/// The artifact is informational: later reseeds overwrite the ledger but the
/// artifact keeps the values the suite started from.
///
/// # Errors
///
/// Returns [`StoreError`] when the artifact cannot be encoded or written.
pub fn write_initial_artifact(dir: &Path, pool: &ResourceSet) -> Result<PathBuf, StoreError> {
    let encoded = serde_yaml::to_string(pool).map_err(|err| StoreError::Codec(err.to_string()))?;
    let path = dir.join(INITIAL_QUOTAS_FILENAME);
    fs::write(&path, encoded)
        .map_err(|err| StoreError::Io(format!("write {}: {err}", path.display())))?;
    Ok(path)
}
