//! Semantic versioning library for the stanza package manager
//!
//! This crate provides SemVer 2.0.0 version parsing, precedence ordering and
//! version constraint matching (caret, tilde, wildcard, hyphen and comparator
//! ranges combined with `,` and `||`).

pub mod constraint;
mod comparator;
mod semver;
mod version;
mod version_parser;

pub use comparator::Comparator;
pub use constraint::{Constraint, ConstraintInterface, MatchAllConstraint, MultiConstraint, Operator};
pub use semver::Semver;
pub use version::{Identifier, Stability, Version};
pub use version_parser::{VersionConstraint, VersionParser, VersionParserError};
