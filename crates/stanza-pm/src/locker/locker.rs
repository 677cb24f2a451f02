use std::fmt;
use std::path::PathBuf;

use super::fingerprint::{ContentHash, Fingerprinter};
use super::store::{FileLockStore, LockStore, MemoryLockStore};
use crate::config::Config;
use crate::error::{Result, StanzaError};
use crate::json::{LockEntry, LockFile, Manifest};
use crate::repository::MemoryRepository;

/// Where a project stands relative to its lock file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    /// No lock file exists
    Unlocked,
    /// A lock exists but was produced from a different manifest
    Stale(LockFile),
    /// The lock matches the current manifest
    Fresh(LockFile),
}

impl LockState {
    pub fn is_fresh(&self) -> bool {
        matches!(self, LockState::Fresh(_))
    }

    pub fn lock(&self) -> Option<&LockFile> {
        match self {
            LockState::Unlocked => None,
            LockState::Stale(lock) | LockState::Fresh(lock) => Some(lock),
        }
    }

    pub fn into_lock(self) -> Option<LockFile> {
        match self {
            LockState::Unlocked => None,
            LockState::Stale(lock) | LockState::Fresh(lock) => Some(lock),
        }
    }
}

/// Reads, validates and writes one lock file
///
/// The locker never decides what to do with a stale lock. It reports the
/// [`LockState`] and leaves re-resolution to the caller.
pub struct Locker {
    store: Box<dyn LockStore>,
    fingerprinter: Box<dyn Fingerprinter>,
}

impl Locker {
    /// Locker for the lock file at `path`, using the default fingerprint
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_store(FileLockStore::new(path))
    }

    /// Locker over an arbitrary storage backend
    pub fn with_store(store: impl LockStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            fingerprinter: Box::new(ContentHash),
        }
    }

    /// Locker that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::with_store(MemoryLockStore::new())
    }

    /// Locker for the lock file configured in `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.get_lock_file())
    }

    /// Replace the fingerprint strategy
    pub fn with_fingerprinter(mut self, fingerprinter: impl Fingerprinter + 'static) -> Self {
        self.fingerprinter = Box::new(fingerprinter);
        self
    }

    /// Human readable lock location
    pub fn location(&self) -> String {
        self.store.describe()
    }

    /// Whether a lock file exists, valid or not
    pub fn is_locked(&self) -> Result<bool> {
        Ok(self.store.load()?.is_some())
    }

    /// Read and validate the lock
    ///
    /// A missing lock is [`StanzaError::LockNotFound`]; a lock that exists but
    /// cannot be parsed is [`StanzaError::CorruptLock`].
    pub fn read(&self) -> Result<LockFile> {
        match self.store.load()? {
            Some(content) => LockFile::parse(&content, &self.location()),
            None => Err(StanzaError::LockNotFound {
                location: self.location(),
            }),
        }
    }

    pub fn fingerprint(&self, manifest: &Manifest) -> String {
        self.fingerprinter.fingerprint(manifest)
    }

    /// Whether `lock` was produced from `manifest`
    pub fn is_fresh(&self, lock: &LockFile, manifest: &Manifest) -> bool {
        self.fingerprint(manifest) == lock.manifest_fingerprint
    }

    /// Classify the current lock against `manifest`
    ///
    /// Corrupt locks are errors, not [`LockState::Unlocked`].
    pub fn state(&self, manifest: &Manifest) -> Result<LockState> {
        let lock = match self.read() {
            Ok(lock) => lock,
            Err(StanzaError::LockNotFound { .. }) => return Ok(LockState::Unlocked),
            Err(e) => return Err(e),
        };

        if self.is_fresh(&lock, manifest) {
            log::debug!("Lock file {} is up to date", self.location());
            Ok(LockState::Fresh(lock))
        } else {
            log::info!("Lock file {} is out of date with the manifest", self.location());
            Ok(LockState::Stale(lock))
        }
    }

    /// Build a lock for `entries` resolved from `manifest` and persist it
    pub fn write(&self, entries: Vec<LockEntry>, manifest: &Manifest) -> Result<LockFile> {
        let lock = LockFile::new(self.fingerprint(manifest), entries);
        self.write_lock(&lock)?;
        Ok(lock)
    }

    /// Persist an already built lock
    pub fn write_lock(&self, lock: &LockFile) -> Result<()> {
        let content = lock.to_json()?;
        self.store.store(&content)?;
        log::info!("Locked {} packages in {}", lock.packages.len(), self.location());
        Ok(())
    }

    /// Expose the packages pinned by `lock` as a repository named "locked"
    pub fn locked_repository(lock: &LockFile) -> Result<MemoryRepository> {
        MemoryRepository::with_packages("locked", lock.packages.iter().map(LockEntry::to_package))
    }
}

impl fmt::Debug for Locker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locker").field("store", &self.store).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Repository;
    use stanza_semver::{Version, VersionConstraint};

    fn manifest(dep_constraint: &str) -> Manifest {
        Manifest::new("app").with_dependency("dep", dep_constraint).unwrap()
    }

    fn entries() -> Vec<LockEntry> {
        vec![LockEntry::new("dep", Version::new(1, 4, 0), "pypi")]
    }

    /// Fingerprint made of the constraints exactly as written
    fn naive_fingerprint(manifest: &Manifest) -> String {
        manifest
            .dependencies
            .values()
            .map(|c| c.pretty().to_string())
            .collect::<Vec<_>>()
            .join(";")
    }

    #[test]
    fn test_unlocked_then_fresh() {
        let locker = Locker::in_memory();
        let manifest = manifest("^1.0");

        assert!(!locker.is_locked().unwrap());
        assert_eq!(locker.state(&manifest).unwrap(), LockState::Unlocked);
        assert!(matches!(locker.read(), Err(StanzaError::LockNotFound { .. })));

        let lock = locker.write(entries(), &manifest).unwrap();
        assert!(locker.is_locked().unwrap());
        assert_eq!(locker.state(&manifest).unwrap(), LockState::Fresh(lock));
    }

    #[test]
    fn test_constraint_change_makes_lock_stale() {
        let locker = Locker::in_memory();
        let old = manifest("^1.0");
        let new = manifest("^2.0");

        let first = locker.write(entries(), &old).unwrap();
        assert!(!locker.is_fresh(&first, &new));
        assert!(matches!(locker.state(&new).unwrap(), LockState::Stale(_)));

        let second = locker.write(vec![LockEntry::new("dep", Version::new(2, 0, 1), "pypi")], &new).unwrap();
        assert_ne!(first.manifest_fingerprint, second.manifest_fingerprint);
        assert!(locker.is_fresh(&second, &new));
        assert!(locker.state(&new).unwrap().is_fresh());
    }

    #[test]
    fn test_injected_fingerprinter() {
        let locker = Locker::in_memory().with_fingerprinter(naive_fingerprint);
        let lock = locker.write(entries(), &manifest("^1.0")).unwrap();
        assert_eq!(lock.manifest_fingerprint, "^1.0");

        let fixed = Locker::in_memory().with_fingerprinter(|_: &Manifest| "constant".to_string());
        let lock = fixed.write(entries(), &manifest("^1.0")).unwrap();
        assert!(fixed.is_fresh(&lock, &manifest("^9.0")));
    }

    #[test]
    fn test_corrupt_lock_is_not_unlocked() {
        let locker = Locker::with_store(MemoryLockStore::with_content("{ \"lock-version\": "));
        assert!(matches!(locker.read(), Err(StanzaError::CorruptLock { .. })));
        assert!(matches!(locker.state(&manifest("^1.0")), Err(StanzaError::CorruptLock { .. })));
        assert!(locker.is_locked().unwrap());
    }

    #[test]
    fn test_read_round_trip() {
        let locker = Locker::in_memory();
        let written = locker.write(entries(), &manifest("^1.0")).unwrap();
        assert_eq!(locker.read().unwrap(), written);
    }

    #[test]
    fn test_locked_repository() {
        let lock = LockFile::new(
            "f",
            vec![
                LockEntry::new("dep", Version::new(1, 4, 0), "pypi")
                    .with_dependency("sub", VersionConstraint::parse(">=2").unwrap()),
                LockEntry::new("sub", Version::new(2, 2, 0), "pypi"),
            ],
        );

        let repo = Locker::locked_repository(&lock).unwrap();
        assert_eq!(repo.name(), "locked");
        assert_eq!(repo.count(), 2);

        let found = repo.find("dep", &VersionConstraint::any());
        assert_eq!(found[0].dependencies()[0].name(), "sub");
    }
}
