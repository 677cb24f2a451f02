pub mod config;
pub mod error;
pub mod json;
pub mod locker;
pub mod package;
pub mod project;
pub mod repository;
pub mod solver;
pub mod util;

pub use config::{Config, ConfigSource};
pub use error::{Result, StanzaError};
pub use json::{LockEntry, LockFile, Manifest, Source};
pub use locker::{ContentHash, FileLockStore, Fingerprinter, LockState, LockStore, Locker, MemoryLockStore};
pub use package::{Dependency, Package};
pub use project::{LockOutcome, Project, ProjectBuilder};
pub use repository::{MemoryRepository, Repository};
pub use solver::{Candidate, Pool, PoolPolicy, Resolver};
pub use util::canonicalize_name;

pub use stanza_semver as semver;
