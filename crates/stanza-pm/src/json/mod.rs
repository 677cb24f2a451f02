//! On-disk JSON documents: the project manifest and the lock artifact

mod lock;
mod manifest;

pub use lock::{LockEntry, LockFile, LOCK_VERSION};
pub use manifest::{Manifest, Source};
