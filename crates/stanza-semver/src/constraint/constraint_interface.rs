//! Constraint interface trait

use crate::Version;

/// Trait for all constraint types
///
/// `Display` must produce the canonical, re-parseable form of the constraint.
pub trait ConstraintInterface: std::fmt::Debug + std::fmt::Display + Send + Sync {
    /// Check if a version satisfies this constraint
    fn matches(&self, version: &Version) -> bool;

    /// Clone this constraint into a boxed trait object
    fn clone_box(&self) -> Box<dyn ConstraintInterface>;

    /// Check if this is a MatchAllConstraint
    fn is_match_all(&self) -> bool {
        false
    }

    /// Whether any bound of this constraint names a pre-release version
    fn mentions_prerelease(&self) -> bool {
        false
    }
}

impl Clone for Box<dyn ConstraintInterface> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
