//! In-memory repository

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use stanza_semver::VersionConstraint;

use super::traits::Repository;
use crate::error::{Result, StanzaError};
use crate::package::Package;
use crate::util::canonicalize_name;

/// Repository holding packages in memory
///
/// Packages are grouped by canonical name and kept sorted by descending
/// version. The index sits behind a lock so a repository shared through an
/// `Arc` (for example one already added to a pool) can still be populated.
#[derive(Debug)]
pub struct MemoryRepository {
    name: String,
    packages: RwLock<IndexMap<String, Vec<Arc<Package>>>>,
}

impl MemoryRepository {
    /// Create an empty repository
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            packages: RwLock::new(IndexMap::new()),
        }
    }

    /// Create a repository from a list of packages
    pub fn with_packages<I, P>(name: impl Into<String>, packages: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<Arc<Package>>,
    {
        let repo = Self::new(name);
        for package in packages {
            repo.add(package)?;
        }
        Ok(repo)
    }

    /// Add a package
    ///
    /// Adding a package identical to one already held is a no-op. Adding a
    /// package with the same name and version but different dependencies fails
    /// with [`StanzaError::DuplicatePackage`] and leaves the repository unchanged.
    pub fn add(&self, package: impl Into<Arc<Package>>) -> Result<()> {
        let package = package.into();
        let mut index = self.write();
        let versions = index.entry(package.name().to_string()).or_default();

        if let Some(existing) = versions.iter().find(|p| p.version() == package.version()) {
            if existing.same_content(&package) {
                log::debug!("{}: {} already present, skipping", self.name, package.unique_name());
                return Ok(());
            }
            return Err(StanzaError::DuplicatePackage {
                name: package.name().to_string(),
                version: package.version().to_string(),
            });
        }

        let position = versions
            .iter()
            .position(|p| p.version() < package.version())
            .unwrap_or(versions.len());
        log::trace!("{}: adding {}", self.name, package.unique_name());
        versions.insert(position, package);

        Ok(())
    }

    /// Remove a package by identity (name and version)
    ///
    /// Returns whether a package was removed.
    pub fn remove(&self, package: &Package) -> bool {
        let mut index = self.write();
        let Some(versions) = index.get_mut(package.name()) else {
            return false;
        };

        let before = versions.len();
        versions.retain(|p| p.as_ref() != package);
        let removed = versions.len() != before;

        if versions.is_empty() {
            index.shift_remove(package.name());
        }
        removed
    }

    /// Whether the repository holds no packages
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Names of all packages, in first-registration order
    pub fn package_names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Vec<Arc<Package>>>> {
        self.packages.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Vec<Arc<Package>>>> {
        self.packages.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Repository for MemoryRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, name: &str, constraint: &VersionConstraint) -> Vec<Arc<Package>> {
        let index = self.read();
        index
            .get(&canonicalize_name(name))
            .map(|versions| {
                versions
                    .iter()
                    .filter(|p| constraint.satisfies(p.version()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn packages(&self) -> Vec<Arc<Package>> {
        self.read().values().flatten().cloned().collect()
    }

    fn count(&self) -> usize {
        self.read().values().map(Vec::len).sum()
    }
}
