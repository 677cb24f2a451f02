//! Version comparison utilities

use crate::constraint::Operator;
use crate::Version;

/// Comparator for comparing version strings
///
/// Unparseable versions never compare successfully.
pub struct Comparator;

impl Comparator {
    /// Check if version1 > version2
    pub fn greater_than(version1: &str, version2: &str) -> bool {
        Self::compare(version1, ">", version2)
    }

    /// Check if version1 >= version2
    pub fn greater_than_or_equal_to(version1: &str, version2: &str) -> bool {
        Self::compare(version1, ">=", version2)
    }

    /// Check if version1 < version2
    pub fn less_than(version1: &str, version2: &str) -> bool {
        Self::compare(version1, "<", version2)
    }

    /// Check if version1 <= version2
    pub fn less_than_or_equal_to(version1: &str, version2: &str) -> bool {
        Self::compare(version1, "<=", version2)
    }

    /// Check if version1 == version2
    pub fn equal_to(version1: &str, version2: &str) -> bool {
        Self::compare(version1, "==", version2)
    }

    /// Check if version1 != version2
    pub fn not_equal_to(version1: &str, version2: &str) -> bool {
        Self::compare(version1, "!=", version2)
    }

    /// Compare version1 to version2 using the given operator
    pub fn compare(version1: &str, operator: &str, version2: &str) -> bool {
        let (Ok(left), Ok(right)) = (Version::parse(version1), Version::parse(version2)) else {
            return false;
        };

        match Operator::from_str(operator) {
            Ok(op) if !operator.is_empty() => op.accepts(left.cmp_precedence(&right)),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greater_than() {
        assert!(Comparator::greater_than("1.25.0", "1.24.0"));
        assert!(!Comparator::greater_than("1.25.0", "1.25.0"));
        assert!(!Comparator::greater_than("1.25.0", "1.26.0"));
        assert!(Comparator::greater_than("1.0.0", "1.0.0-rc.1"));
    }

    #[test]
    fn test_less_than() {
        assert!(!Comparator::less_than("1.25.0", "1.24.0"));
        assert!(!Comparator::less_than("1.25.0", "1.25.0"));
        assert!(Comparator::less_than("1.25.0", "1.26.0"));
        assert!(Comparator::less_than("1.0.0-alpha", "1.0.0-alpha.1"));
    }

    #[test]
    fn test_or_equal_to() {
        assert!(Comparator::greater_than_or_equal_to("1.25.0", "1.25.0"));
        assert!(!Comparator::greater_than_or_equal_to("1.25.0", "1.26.0"));
        assert!(Comparator::less_than_or_equal_to("1.25.0", "1.25.0"));
        assert!(!Comparator::less_than_or_equal_to("1.25.0", "1.24.0"));
    }

    #[test]
    fn test_equal_to_ignores_build_metadata() {
        assert!(Comparator::equal_to("1.25.0", "1.25.0"));
        assert!(Comparator::equal_to("1.25.0+linux", "v1.25.0"));
        assert!(!Comparator::equal_to("1.25.0", "1.26.0"));
        assert!(Comparator::not_equal_to("1.25.0", "1.24.0"));
        assert!(!Comparator::not_equal_to("1.25.0", "1.25.0"));
    }

    #[test]
    fn test_compare() {
        assert!(Comparator::compare("1.25.0", "=", "1.25.0"));
        assert!(Comparator::compare("1.25.0", "<>", "1.24.0"));
        assert!(!Comparator::compare("1.25.0", "<>", "1.25.0"));
        assert!(!Comparator::compare("1.25.0", "~", "1.25.0"));
        assert!(!Comparator::compare("1.25.0", "", "1.25.0"));
        assert!(!Comparator::compare("1.25", "==", "1.25.0"));
    }
}
