//! MatchAllConstraint - matches any version

use std::fmt;

use super::ConstraintInterface;
use crate::Version;

/// A constraint that matches any version
#[derive(Debug, Clone, Default)]
pub struct MatchAllConstraint;

impl MatchAllConstraint {
    pub fn new() -> Self {
        MatchAllConstraint
    }
}

impl ConstraintInterface for MatchAllConstraint {
    fn matches(&self, _version: &Version) -> bool {
        true
    }

    fn clone_box(&self) -> Box<dyn ConstraintInterface> {
        Box::new(self.clone())
    }

    fn is_match_all(&self) -> bool {
        true
    }
}

impl fmt::Display for MatchAllConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_all_matches_everything() {
        let match_all = MatchAllConstraint::new();
        assert!(match_all.matches(&Version::new(0, 0, 0)));
        assert!(match_all.matches(&Version::parse("9.9.9-alpha").unwrap()));
    }

    #[test]
    fn test_match_all_display() {
        assert_eq!(MatchAllConstraint::new().to_string(), "*");
    }
}
