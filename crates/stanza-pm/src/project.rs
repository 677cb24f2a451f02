//! Project facade tying a manifest, its lock file and a repository pool together

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::json::{LockFile, Manifest};
use crate::locker::{LockState, Locker};
use crate::repository::Repository;
use crate::solver::{Pool, Resolver};

/// Result of [`Project::lock`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOutcome {
    pub lock: LockFile,
    /// Whether a new lock was resolved and written
    pub updated: bool,
}

/// A project rooted in a directory
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    manifest: Manifest,
    config: Arc<Config>,
    locker: Locker,
    pool: Pool,
}

impl Project {
    /// Load the project in `root` with its manifest from the configured path
    pub fn load(root: impl Into<PathBuf>, config: Arc<Config>) -> Result<Self> {
        ProjectBuilder::new(root).config(config).build()
    }

    pub fn builder(root: impl Into<PathBuf>) -> ProjectBuilder {
        ProjectBuilder::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn locker(&self) -> &Locker {
        &self.locker
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut Pool {
        &mut self.pool
    }

    /// Current lock state for the loaded manifest
    pub fn lock_state(&self) -> Result<LockState> {
        self.locker.state(&self.manifest)
    }

    /// Make sure the lock matches the manifest
    ///
    /// A fresh lock is returned untouched. A missing or stale lock is
    /// re-resolved against the pool and written.
    pub fn lock(&self) -> Result<LockOutcome> {
        match self.lock_state()? {
            LockState::Fresh(lock) => Ok(LockOutcome { lock, updated: false }),
            LockState::Stale(_) => {
                log::info!("Manifest changed since {} was written, resolving again", self.locker.location());
                self.update().map(|lock| LockOutcome { lock, updated: true })
            }
            LockState::Unlocked => {
                log::info!("No lock file found, resolving dependencies");
                self.update().map(|lock| LockOutcome { lock, updated: true })
            }
        }
    }

    /// Resolve from scratch and write the lock, whatever its current state
    ///
    /// Dev-dependencies are always locked, tagged as such, so one lock serves
    /// every kind of install. Use [`LockFile::runtime_packages`] to skip them.
    pub fn update(&self) -> Result<LockFile> {
        let entries = Resolver::new(&self.pool).resolve(&self.manifest)?;
        self.locker.write(entries, &self.manifest)
    }
}

/// Builder for [`Project`]
///
/// Unset parts fall back to: a config rooted at the project directory, the
/// manifest file that config points to, a locker on the configured lock path,
/// and an empty first-match pool.
#[derive(Debug)]
pub struct ProjectBuilder {
    root: PathBuf,
    config: Option<Arc<Config>>,
    manifest: Option<Manifest>,
    locker: Option<Locker>,
    pool: Option<Pool>,
    repositories: Vec<Arc<dyn Repository>>,
}

impl ProjectBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: None,
            manifest: None,
            locker: None,
            pool: None,
            repositories: Vec::new(),
        }
    }

    pub fn config(mut self, config: Arc<Config>) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an in-memory manifest instead of reading one from disk
    pub fn manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn locker(mut self, locker: Locker) -> Self {
        self.locker = Some(locker);
        self
    }

    pub fn pool(mut self, pool: Pool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Append a repository to the pool with the lowest priority
    pub fn repository(mut self, repo: Arc<dyn Repository>) -> Self {
        self.repositories.push(repo);
        self
    }

    pub fn build(self) -> Result<Project> {
        let config = match self.config {
            Some(config) => config,
            None => Arc::new(Config::with_base_dir(&self.root)),
        };

        let manifest = match self.manifest {
            Some(manifest) => manifest,
            None => Manifest::from_file(config.get_manifest_file())?,
        };
        manifest.validate()?;

        let locker = self.locker.unwrap_or_else(|| Locker::from_config(&config));

        let mut pool = self.pool.unwrap_or_default();
        for repo in self.repositories {
            pool.add_repository(repo);
        }

        log::debug!(
            "Loaded project {} from {} ({} repositories)",
            manifest.name,
            self.root.display(),
            pool.len()
        );

        Ok(Project {
            root: self.root,
            manifest,
            config,
            locker,
            pool,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StanzaError;
    use crate::package::Package;
    use crate::repository::MemoryRepository;

    fn index() -> Arc<MemoryRepository> {
        Arc::new(
            MemoryRepository::with_packages(
                "pypi",
                vec![
                    Package::new("dep", "1.4.0").unwrap(),
                    Package::new("dep", "2.0.1").unwrap(),
                ],
            )
            .unwrap(),
        )
    }

    fn project(manifest: Manifest, locker: Locker) -> Project {
        Project::builder("/nonexistent")
            .manifest(manifest)
            .locker(locker)
            .repository(index())
            .build()
            .unwrap()
    }

    #[test]
    fn test_lock_reuses_fresh_lock() {
        let manifest = Manifest::new("app").with_dependency("dep", "^1.0").unwrap();
        let project = project(manifest, Locker::in_memory());

        let first = project.lock().unwrap();
        assert!(first.updated);
        assert_eq!(first.lock.packages[0].version().to_string(), "1.4.0");

        let second = project.lock().unwrap();
        assert!(!second.updated);
        assert_eq!(second.lock, first.lock);
    }

    #[test]
    fn test_lock_includes_dev_dependencies() {
        let repo = MemoryRepository::with_packages(
            "pypi",
            vec![Package::new("dep", "1.4.0").unwrap(), Package::new("tool", "0.9.0").unwrap()],
        )
        .unwrap();
        let manifest = Manifest::new("app")
            .with_dependency("dep", "^1.0")
            .unwrap()
            .with_dev_dependency("tool", "*")
            .unwrap();
        let project = Project::builder("/nonexistent")
            .manifest(manifest)
            .locker(Locker::in_memory())
            .repository(Arc::new(repo))
            .build()
            .unwrap();

        let lock = project.lock().unwrap().lock;
        assert!(lock.find_package("tool").unwrap().is_dev());
        assert!(!lock.find_package("dep").unwrap().is_dev());
        assert_eq!(
            lock.runtime_packages().map(|p| p.name()).collect::<Vec<_>>(),
            vec!["dep"]
        );
    }

    #[test]
    fn test_build_rejects_invalid_manifest() {
        let err = Project::builder("/nonexistent")
            .manifest(Manifest::new(""))
            .locker(Locker::in_memory())
            .build()
            .unwrap_err();
        assert!(matches!(err, StanzaError::InvalidManifest { .. }));
    }

    #[test]
    fn test_build_without_manifest_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Project::builder(dir.path()).build().unwrap_err();
        assert!(matches!(err, StanzaError::Io(_)));
    }
}
