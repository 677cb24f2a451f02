//! Utility functions for the package manager.

use serde_json::Value;
use sha2::{Digest, Sha256};
use stanza_semver::VersionConstraint;

/// Canonicalize a package name for lookups and comparisons.
///
/// Names are lowercased and every run of `-`, `_` and `.` collapses to a
/// single `-`, so differently written names of the same package compare equal.
///
/// # Examples
///
/// ```
/// use stanza_pm::util::canonicalize_name;
///
/// assert_eq!(canonicalize_name("Requests"), "requests");
/// assert_eq!(canonicalize_name("zope.interface"), "zope-interface");
/// assert_eq!(canonicalize_name("typing__Extensions"), "typing-extensions");
/// ```
pub fn canonicalize_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                canonical.push('-');
                in_separator = true;
            }
        } else {
            canonical.extend(c.to_lowercase());
            in_separator = false;
        }
    }

    canonical
}

/// Lowercase hex SHA-256 digest of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Requirements as sorted `[name, constraint]` pairs for hashing
///
/// Names and constraints are reduced to their canonical forms. Pairs are kept
/// even when two names canonicalize alike, so no constraint is ever dropped.
pub(crate) fn canonical_requirements<'a, I>(requirements: I) -> Value
where
    I: IntoIterator<Item = (&'a String, &'a VersionConstraint)>,
{
    let mut pairs: Vec<(String, &str)> = requirements
        .into_iter()
        .map(|(name, constraint)| (canonicalize_name(name), constraint.canonical()))
        .collect();
    pairs.sort();

    Value::Array(
        pairs
            .into_iter()
            .map(|(name, constraint)| Value::Array(vec![Value::String(name), Value::String(constraint.to_string())]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_name_lowercases() {
        assert_eq!(canonicalize_name("Django"), "django");
        assert_eq!(canonicalize_name("PyYAML"), "pyyaml");
    }

    #[test]
    fn test_canonicalize_name_collapses_separators() {
        assert_eq!(canonicalize_name("foo_bar"), "foo-bar");
        assert_eq!(canonicalize_name("foo.bar"), "foo-bar");
        assert_eq!(canonicalize_name("foo-_.bar"), "foo-bar");
        assert_eq!(canonicalize_name("Foo__Bar--Baz"), "foo-bar-baz");
    }

    #[test]
    fn test_canonicalize_name_trims() {
        assert_eq!(canonicalize_name("  pkg-a "), "pkg-a");
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(sha256_hex(b"").len(), 64);
    }

    #[test]
    fn test_canonical_requirements_keeps_colliding_names() {
        let mut requirements = indexmap::IndexMap::new();
        requirements.insert("Foo".to_string(), VersionConstraint::parse("^1.0").unwrap());
        requirements.insert("foo".to_string(), VersionConstraint::parse("^2.0").unwrap());

        let value = canonical_requirements(&requirements);
        assert_eq!(
            value.to_string(),
            r#"[["foo",">=1.0.0, <2.0.0-0"],["foo",">=2.0.0, <3.0.0-0"]]"#
        );
    }
}
