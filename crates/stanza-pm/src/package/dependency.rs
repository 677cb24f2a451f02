use std::fmt;

use stanza_semver::{Version, VersionConstraint};

use crate::error::Result;
use crate::util::canonicalize_name;

/// A declared requirement on another package
///
/// `name` is canonicalized for lookups; `pretty_name` keeps the spelling the
/// package author used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    name: String,
    pretty_name: String,
    constraint: VersionConstraint,
}

impl Dependency {
    pub fn new(name: impl Into<String>, constraint: VersionConstraint) -> Self {
        let pretty_name = name.into().trim().to_string();
        Self {
            name: canonicalize_name(&pretty_name),
            pretty_name,
            constraint,
        }
    }

    /// Parse `constraint` and build a dependency on `name`
    pub fn parse(name: impl Into<String>, constraint: &str) -> Result<Self> {
        Ok(Self::new(name, VersionConstraint::parse(constraint)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pretty_name(&self) -> &str {
        &self.pretty_name
    }

    pub fn constraint(&self) -> &VersionConstraint {
        &self.constraint
    }

    /// Whether `version` of the named package fulfils this requirement
    pub fn accepts(&self, version: &Version) -> bool {
        self.constraint.satisfies(version)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.pretty_name, self.constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_canonicalizes_name() {
        let dep = Dependency::parse("Foo_Bar", "^1.0").unwrap();
        assert_eq!(dep.name(), "foo-bar");
        assert_eq!(dep.pretty_name(), "Foo_Bar");
        assert_eq!(dep.to_string(), "Foo_Bar (^1.0)");
    }

    #[test]
    fn test_dependency_accepts() {
        let dep = Dependency::parse("pkg", ">=1.0,<2").unwrap();
        assert!(dep.accepts(&Version::parse("1.4.0").unwrap()));
        assert!(!dep.accepts(&Version::parse("2.0.0").unwrap()));
    }

    #[test]
    fn test_dependency_invalid_constraint() {
        assert!(matches!(
            Dependency::parse("pkg", "^^1"),
            Err(crate::StanzaError::InvalidConstraint(_))
        ));
    }
}
