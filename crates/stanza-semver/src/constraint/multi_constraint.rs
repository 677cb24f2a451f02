//! MultiConstraint - compound constraint combining multiple constraints

use std::fmt;

use super::{ConstraintInterface, MatchAllConstraint};
use crate::Version;

/// A constraint combining multiple constraints with AND (conjunctive) or OR (disjunctive) logic
#[derive(Debug, Clone)]
pub struct MultiConstraint {
    constraints: Vec<Box<dyn ConstraintInterface>>,
    conjunctive: bool,
}

impl MultiConstraint {
    /// Create a MultiConstraint, collapsing trivial cases
    ///
    /// An empty list matches everything and a single constraint is returned as is.
    /// A disjunction containing a match-all constraint is itself match-all.
    pub fn create(
        constraints: Vec<Box<dyn ConstraintInterface>>,
        conjunctive: bool,
    ) -> Box<dyn ConstraintInterface> {
        let mut constraints = constraints;

        if !conjunctive && constraints.iter().any(|c| c.is_match_all()) {
            return Box::new(MatchAllConstraint::new());
        }
        if conjunctive {
            constraints.retain(|c| !c.is_match_all());
        }

        match constraints.len() {
            0 => Box::new(MatchAllConstraint::new()),
            1 => constraints.remove(0),
            _ => Box::new(MultiConstraint {
                constraints,
                conjunctive,
            }),
        }
    }

    /// Get the constraints
    pub fn constraints(&self) -> &[Box<dyn ConstraintInterface>] {
        &self.constraints
    }

    /// Check if this is a conjunctive (AND) constraint
    pub fn is_conjunctive(&self) -> bool {
        self.conjunctive
    }

    /// Check if this is a disjunctive (OR) constraint
    pub fn is_disjunctive(&self) -> bool {
        !self.conjunctive
    }
}

impl ConstraintInterface for MultiConstraint {
    fn matches(&self, version: &Version) -> bool {
        if self.conjunctive {
            self.constraints.iter().all(|c| c.matches(version))
        } else {
            self.constraints.iter().any(|c| c.matches(version))
        }
    }

    fn clone_box(&self) -> Box<dyn ConstraintInterface> {
        Box::new(self.clone())
    }

    fn mentions_prerelease(&self) -> bool {
        self.constraints.iter().any(|c| c.mentions_prerelease())
    }
}

impl fmt::Display for MultiConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.conjunctive { ", " } else { " || " };
        let parts: Vec<String> = self.constraints.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(separator))
    }
}
