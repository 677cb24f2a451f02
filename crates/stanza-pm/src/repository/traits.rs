use std::fmt::Debug;
use std::sync::Arc;

use stanza_semver::{Version, VersionConstraint};

use crate::package::Package;

/// Repository interface - a named, queryable package source
///
/// Implementations are pure in-memory indexes. Whatever populates them (an
/// index client, a lock file, inline definitions) runs before the pool is
/// queried.
pub trait Repository: Send + Sync + Debug {
    /// Get a unique name for this repository
    fn name(&self) -> &str;

    /// Find every version of `name` satisfying `constraint`, highest version first
    ///
    /// `name` is matched canonically. No match is an empty result, not an error.
    fn find(&self, name: &str, constraint: &VersionConstraint) -> Vec<Arc<Package>>;

    /// Check if any version of `name` satisfies `constraint`
    fn has(&self, name: &str, constraint: &VersionConstraint) -> bool {
        !self.find(name, constraint).is_empty()
    }

    /// Find an exact version of a package
    fn find_package(&self, name: &str, version: &Version) -> Option<Arc<Package>> {
        self.find(name, &VersionConstraint::any())
            .into_iter()
            .find(|pkg| pkg.version() == version)
    }

    /// Get all packages in the repository
    fn packages(&self) -> Vec<Arc<Package>>;

    /// Number of packages held
    fn count(&self) -> usize {
        self.packages().len()
    }
}
