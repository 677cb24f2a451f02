//! Single comparator constraint such as `>=1.2.0`

use std::fmt;

use super::{ConstraintInterface, Operator};
use crate::version::Identifier;
use crate::Version;

/// A constraint comparing against one version with one operator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    operator: Operator,
    version: Version,
}

impl Constraint {
    pub fn new(operator: Operator, version: Version) -> Self {
        Constraint { operator, version }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// `X.Y.Z-0` bounds are synthesized to exclude pre-releases and do not
    /// count as the user asking for a pre-release.
    fn is_synthetic_floor(&self) -> bool {
        self.version.pre == [Identifier::Numeric(0)]
    }
}

impl ConstraintInterface for Constraint {
    fn matches(&self, version: &Version) -> bool {
        self.operator.accepts(version.cmp_precedence(&self.version))
    }

    fn clone_box(&self) -> Box<dyn ConstraintInterface> {
        Box::new(self.clone())
    }

    fn mentions_prerelease(&self) -> bool {
        self.version.is_prerelease() && !self.is_synthetic_floor()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_constraint_matching() {
        let gte = Constraint::new(Operator::GreaterThanOrEqual, v("1.0.0"));
        assert!(gte.matches(&v("1.0.0")));
        assert!(gte.matches(&v("2.3.4")));
        assert!(!gte.matches(&v("0.9.9")));
        assert!(!gte.matches(&v("1.0.0-rc.1")));

        let lt = Constraint::new(Operator::LessThan, v("2.0.0-0"));
        assert!(lt.matches(&v("1.9.9")));
        assert!(!lt.matches(&v("2.0.0-alpha")));
        assert!(!lt.matches(&v("2.0.0")));
    }

    #[test]
    fn test_equal_ignores_build_metadata() {
        let eq = Constraint::new(Operator::Equal, v("1.0.0"));
        assert!(eq.matches(&v("1.0.0+build.7")));
        assert!(!eq.matches(&v("1.0.1")));
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(Constraint::new(Operator::Equal, v("1.2.3")).to_string(), "==1.2.3");
        assert_eq!(Constraint::new(Operator::LessThan, v("2.0.0-0")).to_string(), "<2.0.0-0");
    }

    #[test]
    fn test_mentions_prerelease() {
        assert!(Constraint::new(Operator::GreaterThanOrEqual, v("1.0.0-beta")).mentions_prerelease());
        assert!(!Constraint::new(Operator::LessThan, v("2.0.0-0")).mentions_prerelease());
        assert!(!Constraint::new(Operator::Equal, v("1.0.0")).mentions_prerelease());
    }
}
