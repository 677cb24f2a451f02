//! Lock file management
//!
//! The [`Locker`] owns one lock location. It decides whether a lock is still
//! valid for a manifest by comparing manifest fingerprints, and persists new
//! locks atomically. Both the fingerprint function and the storage backend are
//! pluggable so the state machine can be driven without touching the disk.

mod fingerprint;
mod locker;
mod store;

pub use fingerprint::{ContentHash, Fingerprinter};
pub use locker::{LockState, Locker};
pub use store::{FileLockStore, LockStore, MemoryLockStore};
