// crates/quota-ledger-store-file/src/lib.rs
// ============================================================================
// Module: Quota Ledger File Store Library
// Description: YAML file persistence and OS advisory locking for the ledger.
// Purpose: Provide the production backends behind the core interfaces.
// Dependencies: quota-ledger-core, fs2, serde_yaml
// ============================================================================

//! ## Overview
//! Production backends for the quota ledger: a YAML file store, an OS
//! advisory file lock, and a file-backed request log. The store performs no
//! synchronization of its own; callers hold the advisory lock across every
//! read-modify-write sequence, matching the cross-process model where each
//! test worker is an independent OS process.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod lock;
pub mod sink;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use lock::AdvisoryFileLock;
pub use sink::FileRequestSink;
pub use store::INITIAL_QUOTAS_FILENAME;
pub use store::MAX_LEDGER_FILE_SIZE;
pub use store::YamlLedgerStore;
pub use store::write_initial_artifact;
