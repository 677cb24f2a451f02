mod dependency;

pub use dependency::Dependency;

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use stanza_semver::{Stability, Version};

use crate::error::Result;
use crate::util::canonicalize_name;

/// A concrete package release
///
/// Identity is the canonical name plus the version: two packages with the same
/// name and version are equal regardless of their dependencies. Repositories
/// use [`Package::same_content`] to detect conflicting registrations.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    pretty_name: String,
    version: Version,
    dependencies: Vec<Dependency>,
}

impl Package {
    /// Create a package, parsing `version` as a semantic version
    pub fn new(name: impl Into<String>, version: &str) -> Result<Self> {
        Ok(Self::from_parts(name, Version::parse(version)?, Vec::new()))
    }

    /// Create a package from already parsed parts
    pub fn from_parts(name: impl Into<String>, version: Version, dependencies: Vec<Dependency>) -> Self {
        let pretty_name = name.into().trim().to_string();
        Self {
            name: canonicalize_name(&pretty_name),
            pretty_name,
            version,
            dependencies,
        }
    }

    /// Add a dependency, parsing `constraint`
    pub fn with_dependency(mut self, name: impl Into<String>, constraint: &str) -> Result<Self> {
        self.dependencies.push(Dependency::parse(name, constraint)?);
        Ok(self)
    }

    /// Canonical package name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package name as written
    pub fn pretty_name(&self) -> &str {
        &self.pretty_name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Declared dependencies in declaration order
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn stability(&self) -> Stability {
        self.version.stability()
    }

    pub fn is_prerelease(&self) -> bool {
        self.version.is_prerelease()
    }

    /// Unique identifier `name@version`
    pub fn unique_name(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// Compare dependency sets, ignoring declaration order and constraint spelling
    pub fn same_content(&self, other: &Package) -> bool {
        self == other && self.dependency_set() == other.dependency_set()
    }

    fn dependency_set(&self) -> BTreeSet<(&str, &str)> {
        self.dependencies
            .iter()
            .map(|dep| (dep.name(), dep.constraint().canonical()))
            .collect()
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

impl Eq for Package {}

impl Hash for Package {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.pretty_name, self.version)
    }
}
