use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use super::pool::{Candidate, Pool};
use crate::error::{Result, StanzaError};
use crate::json::{LockEntry, Manifest};
use crate::package::Dependency;

/// Requirement waiting to be resolved, with whoever declared it
struct Pending {
    dependency: Dependency,
    required_by: String,
}

/// Greedy dependency resolver
///
/// Requirements are processed breadth first, manifest dependencies before
/// transitive ones. Each name is pinned to the highest acceptable version the
/// pool offers when it is first seen; a later requirement that the pinned
/// version does not satisfy is a conflict. There is no backtracking.
#[derive(Debug)]
pub struct Resolver<'a> {
    pool: &'a Pool,
    include_dev: bool,
    prefer_stable: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(pool: &'a Pool) -> Self {
        Self {
            pool,
            include_dev: true,
            prefer_stable: true,
        }
    }

    /// Whether dev-dependencies are resolved (default: true)
    ///
    /// The manifest fingerprint always covers dev-dependencies, so entries
    /// resolved without them must not be written as a lock for that manifest.
    pub fn include_dev(mut self, include: bool) -> Self {
        self.include_dev = include;
        self
    }

    /// Skip pre-releases unless nothing else matches (default: true)
    ///
    /// Constraints that name a pre-release themselves always accept one.
    pub fn prefer_stable(mut self, prefer: bool) -> Self {
        self.prefer_stable = prefer;
        self
    }

    /// Resolve `manifest` into lock entries sorted by name
    pub fn resolve(&self, manifest: &Manifest) -> Result<Vec<LockEntry>> {
        let root = manifest.name.clone();
        let mut queue: VecDeque<Pending> = manifest
            .requirements()
            .into_iter()
            .map(|dependency| Pending {
                dependency,
                required_by: root.clone(),
            })
            .collect();
        if self.include_dev {
            queue.extend(manifest.dev_requirements().into_iter().map(|dependency| Pending {
                dependency,
                required_by: root.clone(),
            }));
        }

        let mut selected: IndexMap<String, Candidate> = IndexMap::new();

        while let Some(Pending { dependency, required_by }) = queue.pop_front() {
            if let Some(candidate) = selected.get(dependency.name()) {
                if !dependency.accepts(candidate.package.version()) {
                    return Err(StanzaError::DependencyResolution(format!(
                        "{} requires {}, but {} is already selected",
                        required_by, dependency, candidate.package
                    )));
                }
                continue;
            }

            let candidates = self.pool.lookup(dependency.name(), dependency.constraint())?;
            let chosen = self.choose(&dependency, candidates)?;
            log::debug!(
                "Selected {} from {} for {}",
                chosen.package,
                chosen.repository,
                required_by
            );

            for sub in chosen.package.dependencies() {
                queue.push_back(Pending {
                    dependency: sub.clone(),
                    required_by: chosen.package.pretty_name().to_string(),
                });
            }
            selected.insert(dependency.name().to_string(), chosen);
        }

        let runtime = runtime_closure(manifest, &selected);

        let mut entries: Vec<LockEntry> = selected
            .iter()
            .map(|(name, candidate)| {
                LockEntry::from_package(&candidate.package, candidate.repository.as_str())
                    .with_dev(!runtime.contains(name))
            })
            .collect();
        entries.sort_by_key(|entry| entry.canonical_name());

        log::info!("Resolved {} packages", entries.len());
        Ok(entries)
    }

    /// Pick from candidates sorted highest version first
    fn choose(&self, dependency: &Dependency, candidates: Vec<Candidate>) -> Result<Candidate> {
        let skip_prereleases = self.prefer_stable && !dependency.constraint().allows_prereleases();
        let index = candidates
            .iter()
            .position(|candidate| !skip_prereleases || !candidate.package.is_prerelease())
            .unwrap_or(0);

        candidates
            .into_iter()
            .nth(index)
            .ok_or_else(|| StanzaError::PackageNotFound {
                name: dependency.name().to_string(),
                constraint: dependency.constraint().to_string(),
            })
    }
}

/// Names reachable from the manifest's runtime dependencies
fn runtime_closure(manifest: &Manifest, selected: &IndexMap<String, Candidate>) -> HashSet<String> {
    let mut reachable = HashSet::new();
    let mut stack: Vec<String> = manifest
        .requirements()
        .iter()
        .map(|dep| dep.name().to_string())
        .collect();

    while let Some(name) = stack.pop() {
        if !reachable.insert(name.clone()) {
            continue;
        }
        if let Some(candidate) = selected.get(&name) {
            stack.extend(candidate.package.dependencies().iter().map(|dep| dep.name().to_string()));
        }
    }

    reachable
}
