use std::collections::HashSet;
use std::sync::Arc;

use stanza_semver::VersionConstraint;

use crate::error::{Result, StanzaError};
use crate::package::Package;
use crate::repository::Repository;

/// How the pool combines results from several repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolPolicy {
    /// The first repository with any match supplies every candidate for a name
    #[default]
    FirstMatch,
    /// Candidates from all repositories, higher priority copies win on ties
    Merge,
}

/// A package together with the repository it was found in
#[derive(Debug, Clone)]
pub struct Candidate {
    pub package: Arc<Package>,
    pub repository: String,
}

/// Ordered set of repositories queried by priority
///
/// The first repository added has the highest priority. Repositories are
/// shared, so the same instance can sit in several pools at once.
#[derive(Debug, Clone, Default)]
pub struct Pool {
    repositories: Vec<Arc<dyn Repository>>,
    policy: PoolPolicy,
}

impl Pool {
    /// Create an empty first-match pool
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: PoolPolicy) -> Self {
        Self {
            repositories: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> PoolPolicy {
        self.policy
    }

    /// Add a repository with the lowest priority
    pub fn add_repository(&mut self, repo: Arc<dyn Repository>) {
        log::debug!("Adding repository {} at priority {}", repo.name(), self.repositories.len());
        self.repositories.push(repo);
    }

    /// Insert a repository at a specific position (0 = highest priority)
    ///
    /// Positions past the end append.
    pub fn insert_repository(&mut self, index: usize, repo: Arc<dyn Repository>) {
        let index = index.min(self.repositories.len());
        self.repositories.insert(index, repo);
    }

    /// Remove a repository by identity
    ///
    /// Returns whether it was present; removing an absent repository is a no-op.
    pub fn remove_repository<R: Repository + ?Sized>(&mut self, repo: &Arc<R>) -> bool {
        let before = self.repositories.len();
        self.repositories
            .retain(|held| !std::ptr::addr_eq(Arc::as_ptr(held), Arc::as_ptr(repo)));
        before != self.repositories.len()
    }

    /// Get a repository by name
    pub fn repository(&self, name: &str) -> Option<&Arc<dyn Repository>> {
        self.repositories.iter().find(|r| r.name() == name)
    }

    /// Repositories in priority order
    pub fn repositories(&self) -> &[Arc<dyn Repository>] {
        &self.repositories
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Find packages matching `constraint`, highest version first
    ///
    /// Fails with [`StanzaError::PackageNotFound`] when no repository matches.
    pub fn find(&self, name: &str, constraint: &VersionConstraint) -> Result<Vec<Arc<Package>>> {
        Ok(self
            .lookup(name, constraint)?
            .into_iter()
            .map(|candidate| candidate.package)
            .collect())
    }

    /// Like [`Pool::find`] but keeps track of where each package came from
    pub fn lookup(&self, name: &str, constraint: &VersionConstraint) -> Result<Vec<Candidate>> {
        let candidates = match self.policy {
            PoolPolicy::FirstMatch => self.first_match(name, constraint),
            PoolPolicy::Merge => self.merged(name, constraint),
        };

        if candidates.is_empty() {
            return Err(StanzaError::PackageNotFound {
                name: name.to_string(),
                constraint: constraint.to_string(),
            });
        }
        Ok(candidates)
    }

    /// Whether any repository can satisfy the request
    pub fn has(&self, name: &str, constraint: &VersionConstraint) -> bool {
        self.repositories.iter().any(|repo| repo.has(name, constraint))
    }

    fn first_match(&self, name: &str, constraint: &VersionConstraint) -> Vec<Candidate> {
        for repo in &self.repositories {
            let found = repo.find(name, constraint);
            if !found.is_empty() {
                log::trace!("{} ({}) resolved from {}", name, constraint, repo.name());
                return found
                    .into_iter()
                    .map(|package| Candidate {
                        package,
                        repository: repo.name().to_string(),
                    })
                    .collect();
            }
        }
        Vec::new()
    }

    fn merged(&self, name: &str, constraint: &VersionConstraint) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for repo in &self.repositories {
            for package in repo.find(name, constraint) {
                if seen.insert(package.unique_name()) {
                    candidates.push(Candidate {
                        package,
                        repository: repo.name().to_string(),
                    });
                }
            }
        }

        candidates.sort_by(|a, b| b.package.version().cmp(a.package.version()));
        candidates
    }
}
