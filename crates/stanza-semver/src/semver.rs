//! Semver facade providing high-level version operations

use crate::{Version, VersionConstraint};

/// Main facade for semantic versioning operations
///
/// Every helper here is lenient: invalid versions or constraints are treated
/// as non-matching and skipped rather than reported.
pub struct Semver;

impl Semver {
    /// Check if a version satisfies a constraint
    pub fn satisfies(version: &str, constraints: &str) -> bool {
        match Self::parse_constraints(constraints) {
            Ok(parsed) => Self::satisfies_parsed(version, &parsed),
            Err(_) => false,
        }
    }

    /// Return all versions that satisfy the given constraints
    pub fn satisfied_by(versions: &[&str], constraints: &str) -> Vec<String> {
        let parsed = match Self::parse_constraints(constraints) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        versions
            .iter()
            .filter(|v| Self::satisfies_parsed(v, &parsed))
            .map(|v| v.to_string())
            .collect()
    }

    /// Parse constraints and return a reusable representation.
    pub fn parse_constraints(constraints: &str) -> Result<VersionConstraint, crate::VersionParserError> {
        VersionConstraint::parse(constraints)
    }

    /// Check a version against pre-parsed constraints.
    pub fn satisfies_parsed(version: &str, constraints: &VersionConstraint) -> bool {
        Version::parse(version).map_or(false, |v| constraints.satisfies(&v))
    }

    /// Sort versions in ascending order
    pub fn sort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, true)
    }

    /// Sort versions in descending order (reverse sort)
    pub fn rsort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, false)
    }

    fn usort(versions: &[&str], ascending: bool) -> Vec<String> {
        let mut parsed: Vec<(Version, usize)> = versions
            .iter()
            .enumerate()
            .filter_map(|(i, v)| Version::parse(v).ok().map(|parsed| (parsed, i)))
            .collect();

        // Stable sort keeps the input order of versions with equal precedence
        parsed.sort_by(|(a, _), (b, _)| {
            let cmp = a.cmp_precedence(b);
            if ascending {
                cmp
            } else {
                cmp.reverse()
            }
        });

        parsed.into_iter().map(|(_, i)| versions[i].to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfies_positive() {
        // Hyphen ranges
        assert!(Semver::satisfies("1.2.3", "1.0.0 - 2.0.0"));
        assert!(Semver::satisfies("2.0.0", "1.0.0 - 2.0.0"));
        assert!(Semver::satisfies("2.9.9", "1.0 - 2"));

        // Basic constraints
        assert!(Semver::satisfies("1.0.0", "1.0.0"));
        assert!(Semver::satisfies("1.2.3", "*"));
        assert!(Semver::satisfies("v1.2.3", "*"));
        assert!(Semver::satisfies("1.0.0+build.1", "==1.0.0"));

        // Greater than/less than
        assert!(Semver::satisfies("1.0.0", ">=1.0.0"));
        assert!(Semver::satisfies("1.1.0", ">1.0.0"));
        assert!(Semver::satisfies("2.0.0", "<=2.0.0"));
        assert!(Semver::satisfies("1.9999.9999", "<2.0.0"));
        assert!(Semver::satisfies("0.2.9", "<2.0.0"));
        assert!(Semver::satisfies("1.0.1", ">=  1.0.0"));
        assert!(Semver::satisfies("1.1.1", "< 1.2"));

        // Or constraints
        assert!(Semver::satisfies("1.2.4", "0.1.20 || 1.2.4"));
        assert!(Semver::satisfies("0.0.0", ">=0.2.3 || <0.0.1"));
        assert!(Semver::satisfies("0.2.4", ">=0.2.3 || <0.0.1"));

        // Wildcard
        assert!(Semver::satisfies("2.1.3", "2.x.x"));
        assert!(Semver::satisfies("1.2.3", "1.2.x"));
        assert!(Semver::satisfies("2.1.3", "1.2.x || 2.x"));
        assert!(Semver::satisfies("1.2.3", "1.2.* || 2.*"));

        // Tilde and compatible release
        assert!(Semver::satisfies("2.4.5", "~2.4"));
        assert!(Semver::satisfies("1.2.3", "~1"));
        assert!(Semver::satisfies("1.9.0", "~=1.2"));

        // Combined constraints
        assert!(Semver::satisfies("1.2.3", "~1.2.1 >=1.2.3"));
        assert!(Semver::satisfies("1.2.3", "~1.2.1 =1.2.3"));
        assert!(Semver::satisfies("1.2.3", "~1.2.1, 1.2.3"));
        assert!(Semver::satisfies("1.2.3", ">=1.2.1 1.2.3"));

        // Caret
        assert!(Semver::satisfies("1.8.1", "^1.2.3"));
        assert!(Semver::satisfies("0.1.2", "^0.1.2"));
        assert!(Semver::satisfies("0.1.2", "^0.1"));
        assert!(Semver::satisfies("1.4.2", "^1.2 ^1"));
        assert!(Semver::satisfies("0.0.1-beta", "^0.0.1-alpha"));
    }

    #[test]
    fn test_satisfies_negative() {
        assert!(!Semver::satisfies("2.2.3", "1.0.0 - 2.0.0"));
        assert!(!Semver::satisfies("1.0.1", "1.0.0"));
        assert!(!Semver::satisfies("0.1.0", ">=1.0.0"));
        assert!(!Semver::satisfies("3.0.0", "<=2.0.0"));
        assert!(!Semver::satisfies("2.0.0-rc.1", "<2.0.0"));
        assert!(!Semver::satisfies("1.2.3", "0.1.20 || 1.2.4"));
        assert!(!Semver::satisfies("0.0.3", ">=0.2.3 || <0.0.1"));
        assert!(!Semver::satisfies("3.1.3", "1.2.x || 2.x"));
        assert!(!Semver::satisfies("1.1.2", "2"));
        assert!(!Semver::satisfies("2.4.1", "2.3"));
        assert!(!Semver::satisfies("2.5.0", "~2.4"));
        assert!(!Semver::satisfies("0.2.3", "~1"));
        assert!(!Semver::satisfies("2.0.0", "~=1.2"));
        assert!(!Semver::satisfies("2.0.0-alpha", "^1.2.3"));
        assert!(!Semver::satisfies("1.2.3-beta", "^1.2.3"));
        assert!(!Semver::satisfies("1.2.2", "^1.2.3"));
        assert!(!Semver::satisfies("0.3.0", "^0.2.3"));

        // Invalid input never matches
        assert!(!Semver::satisfies("1.0", ">=0.1.0"));
        assert!(!Semver::satisfies("1.0.0", "~>1.0"));
    }

    #[test]
    fn test_satisfied_by() {
        let versions = vec!["1.0.0", "1.2.0", "1.9999.9999", "2.0.0", "2.1.0", "0.9999.9999"];
        assert_eq!(Semver::satisfied_by(&versions, "^1.0"), vec!["1.0.0", "1.2.0", "1.9999.9999"]);

        let versions2 = vec!["1.0.0", "1.1.0", "2.9999.9999", "3.0.0", "3.1.0", "4.0.0", "4.1.0"];
        assert_eq!(
            Semver::satisfied_by(&versions2, ">1.0 <3.0 || >=4.0"),
            vec!["1.1.0", "2.9999.9999", "4.0.0", "4.1.0"]
        );

        assert!(Semver::satisfied_by(&versions2, "nonsense").is_empty());
    }

    #[test]
    fn test_sort() {
        let versions = vec!["1.0.0", "0.1.0", "0.1.0", "3.2.1", "2.4.0-alpha", "2.4.0", "garbage"];
        assert_eq!(
            Semver::sort(&versions),
            vec!["0.1.0", "0.1.0", "1.0.0", "2.4.0-alpha", "2.4.0", "3.2.1"]
        );
    }

    #[test]
    fn test_rsort() {
        let versions = vec!["1.0.0", "0.1.0", "3.2.1", "2.4.0-alpha", "2.4.0"];
        assert_eq!(
            Semver::rsort(&versions),
            vec!["3.2.1", "2.4.0", "2.4.0-alpha", "1.0.0", "0.1.0"]
        );
    }

    #[test]
    fn test_parsed_constraints_reuse() {
        let parsed = Semver::parse_constraints("^1.2").unwrap();
        assert!(Semver::satisfies_parsed("1.2.3", &parsed));
        assert!(Semver::satisfies_parsed("1.9.0", &parsed));
        assert!(!Semver::satisfies_parsed("2.0.0", &parsed));
    }
}
