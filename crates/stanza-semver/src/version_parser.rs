//! Version and constraint parsing

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::constraint::{Constraint, ConstraintInterface, MatchAllConstraint, MultiConstraint, Operator};
use crate::Version;

/// Error type for version parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParserError {
    #[error("Invalid version string \"{0}\"")]
    InvalidVersion(String),
    #[error("Could not parse version constraint \"{constraint}\": {reason}")]
    InvalidConstraint { constraint: String, reason: String },
}

impl VersionParserError {
    fn constraint(constraint: &str, reason: impl Into<String>) -> Self {
        VersionParserError::InvalidConstraint {
            constraint: constraint.to_string(),
            reason: reason.into(),
        }
    }
}

lazy_static! {
    // OR constraint splitter
    static ref OR_CONSTRAINT_RE: Regex = Regex::new(r"\s*\|\|\s*").unwrap();

    // Leading operator of a single constraint term. Longer operators come first.
    static ref OPERATOR_RE: Regex = Regex::new(r"^(\^|~=|~|==|=|!=|<>|<=|>=|<|>)?\s*(.*)$").unwrap();

    // A term that is nothing but an operator, e.g. the ">=" in ">= 1.0"
    static ref BARE_OPERATOR_RE: Regex = Regex::new(r"^(\^|~=|~|==|=|!=|<>|<=|>=|<|>)$").unwrap();

    // Numeric part of a possibly partial or wildcard version
    static ref PARTIAL_RE: Regex = Regex::new(
        r"^[vV]?(\d+|[xX*])(?:\.(\d+|[xX*]))?(?:\.(\d+|[xX*]))?$"
    ).unwrap();
}

/// A version as written inside a constraint: `1`, `1.2`, `1.2.x`, `1.2.3-beta`
#[derive(Debug)]
struct PartialVersion {
    /// Numeric components written before the first wildcard
    parts: Vec<u64>,
    wildcard: bool,
    suffix: String,
}

impl PartialVersion {
    fn parse(raw: &str, constraint: &str) -> Result<Self, VersionParserError> {
        let split_at = raw.find(['-', '+']).unwrap_or(raw.len());
        let (numeric, suffix) = raw.split_at(split_at);

        let caps = PARTIAL_RE
            .captures(numeric)
            .ok_or_else(|| VersionParserError::constraint(constraint, format!("invalid version \"{}\"", raw)))?;

        let mut parts = Vec::new();
        let mut wildcard = false;
        for component in (1..=3).filter_map(|idx| caps.get(idx)) {
            let component = component.as_str();
            if matches!(component, "x" | "X" | "*") {
                wildcard = true;
                continue;
            }
            if wildcard {
                return Err(VersionParserError::constraint(
                    constraint,
                    format!("numeric component after a wildcard in \"{}\"", raw),
                ));
            }
            let value = component
                .parse()
                .map_err(|_| VersionParserError::constraint(constraint, format!("invalid version \"{}\"", raw)))?;
            parts.push(value);
        }

        if wildcard && !suffix.is_empty() {
            return Err(VersionParserError::constraint(
                constraint,
                format!("wildcard versions cannot carry a pre-release or build suffix: \"{}\"", raw),
            ));
        }

        Ok(PartialVersion {
            parts,
            wildcard,
            suffix: suffix.to_string(),
        })
    }

    fn is_complete(&self) -> bool {
        self.parts.len() == 3
    }

    /// Pad missing components with zeros and attach the suffix
    fn padded(&self, constraint: &str) -> Result<Version, VersionParserError> {
        let component = |idx: usize| self.parts.get(idx).copied().unwrap_or(0);
        let text = format!("{}.{}.{}{}", component(0), component(1), component(2), self.suffix);
        Version::parse(&text).map_err(|_| VersionParserError::constraint(constraint, format!("invalid version \"{}\"", text)))
    }

    /// Increment the component at `position`, zero the rest and return the
    /// lowest pre-release of the result
    fn bumped(&self, position: usize, constraint: &str) -> Result<Version, VersionParserError> {
        let component = |idx: usize| self.parts.get(idx).copied().unwrap_or(0);
        let next = component(position)
            .checked_add(1)
            .ok_or_else(|| VersionParserError::constraint(constraint, "version component is too large to bump"))?;
        let bumped = match position {
            0 => Version::new(next, 0, 0),
            1 => Version::new(component(0), next, 0),
            _ => Version::new(component(0), component(1), next),
        };
        Ok(bumped.floor())
    }
}

/// One AND-ed term of a constraint group before interpretation
enum Term<'a> {
    Single(&'a str),
    /// An operator written apart from its version, as in `>= 1.0`
    Split(&'a str, &'a str),
    Hyphen(&'a str, &'a str),
}

/// Parser for versions and version constraints
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionParser;

impl VersionParser {
    pub fn new() -> Self {
        VersionParser
    }

    /// Check whether a string is a valid full version
    pub fn is_valid(&self, version: &str) -> bool {
        Version::parse(version).is_ok()
    }

    /// Normalize a version string to its canonical form
    pub fn normalize(&self, version: &str) -> Result<String, VersionParserError> {
        Version::parse(version).map(|v| v.to_string())
    }

    /// Parse a constraint expression into a constraint tree
    ///
    /// OR groups are separated by `||`; inside a group terms are AND-ed and
    /// separated by commas or whitespace.
    pub fn parse_constraints(&self, constraints: &str) -> Result<Box<dyn ConstraintInterface>, VersionParserError> {
        let trimmed = constraints.trim();
        if trimmed.is_empty() {
            return Err(VersionParserError::constraint(constraints, "empty constraint"));
        }

        let or_constraints: Vec<&str> = OR_CONSTRAINT_RE.split(trimmed).collect();

        if or_constraints.first().map_or(false, |s| s.is_empty()) {
            return Err(VersionParserError::constraint(trimmed, "leading operator"));
        }
        if or_constraints.last().map_or(false, |s| s.is_empty()) {
            return Err(VersionParserError::constraint(trimmed, "trailing operator"));
        }

        let mut or_groups: Vec<Box<dyn ConstraintInterface>> = Vec::with_capacity(or_constraints.len());
        for or_constraint in or_constraints {
            let terms = self.split_and_constraints(or_constraint, trimmed)?;

            let mut constraint_objects: Vec<Box<dyn ConstraintInterface>> = Vec::new();
            for term in terms {
                let parsed = match term {
                    Term::Single(raw) => self.parse_constraint(raw, trimmed)?,
                    Term::Split(operator, version) => self.parse_operator_constraint(operator, version, trimmed)?,
                    Term::Hyphen(from, to) => self.parse_hyphen_constraint(from, to, trimmed)?,
                };
                constraint_objects.extend(parsed);
            }

            or_groups.push(MultiConstraint::create(constraint_objects, true));
        }

        Ok(MultiConstraint::create(or_groups, false))
    }

    /// Split one OR group into terms, re-attaching operators separated from
    /// their version by whitespace and recognising `a - b` hyphen ranges
    fn split_and_constraints<'a>(&self, input: &'a str, constraint: &str) -> Result<Vec<Term<'a>>, VersionParserError> {
        let tokens: Vec<&'a str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .collect();

        if tokens.is_empty() {
            return Err(VersionParserError::constraint(constraint, "empty constraint group"));
        }

        let mut terms = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i];

            if token == "-" {
                let from = match terms.pop() {
                    Some(Term::Single(from)) if !BARE_OPERATOR_RE.is_match(from) => from,
                    _ => return Err(VersionParserError::constraint(constraint, "hyphen range without a lower bound")),
                };
                let to = tokens
                    .get(i + 1)
                    .copied()
                    .ok_or_else(|| VersionParserError::constraint(constraint, "hyphen range without an upper bound"))?;
                terms.push(Term::Hyphen(from, to));
                i += 2;
                continue;
            }

            if BARE_OPERATOR_RE.is_match(token) {
                let version = tokens
                    .get(i + 1)
                    .copied()
                    .filter(|next| *next != "-" && !BARE_OPERATOR_RE.is_match(next))
                    .ok_or_else(|| VersionParserError::constraint(constraint, format!("operator \"{}\" without a version", token)))?;
                terms.push(Term::Split(token, version));
                i += 2;
                continue;
            }

            terms.push(Term::Single(token));
            i += 1;
        }

        Ok(terms)
    }

    fn parse_constraint(&self, term: &str, constraint: &str) -> Result<Vec<Box<dyn ConstraintInterface>>, VersionParserError> {
        let caps = OPERATOR_RE
            .captures(term)
            .ok_or_else(|| VersionParserError::constraint(constraint, format!("could not parse \"{}\"", term)))?;
        let operator = caps.get(1).map_or("", |m| m.as_str());
        let version = caps.get(2).map_or("", |m| m.as_str()).trim();

        if version.is_empty() {
            return Err(VersionParserError::constraint(constraint, format!("operator \"{}\" without a version", operator)));
        }

        self.parse_operator_constraint(operator, version, constraint)
    }

    fn parse_operator_constraint(
        &self,
        operator: &str,
        version: &str,
        constraint: &str,
    ) -> Result<Vec<Box<dyn ConstraintInterface>>, VersionParserError> {
        let partial = PartialVersion::parse(version, constraint)?;

        match operator {
            "^" => self.parse_caret_constraint(&partial, constraint),
            "~" => self.parse_tilde_constraint(&partial, constraint),
            "~=" => self.parse_compatible_constraint(&partial, constraint),
            _ => {
                let op = Operator::from_str(operator)
                    .map_err(|err| VersionParserError::constraint(constraint, err.to_string()))?;

                if partial.parts.is_empty() {
                    return match op {
                        Operator::Equal | Operator::GreaterThanOrEqual => Ok(vec![Box::new(MatchAllConstraint::new())]),
                        _ => Err(VersionParserError::constraint(
                            constraint,
                            format!("operator \"{}\" cannot be combined with a bare wildcard", operator),
                        )),
                    };
                }

                if partial.wildcard {
                    if op != Operator::Equal {
                        return Err(VersionParserError::constraint(
                            constraint,
                            format!("operator \"{}\" cannot be combined with a wildcard version", operator),
                        ));
                    }
                    return self.parse_x_range_constraint(&partial, constraint);
                }

                let mut bound = partial.padded(constraint)?;
                if op == Operator::LessThan && !bound.is_prerelease() {
                    bound = bound.floor();
                }
                Ok(vec![Box::new(Constraint::new(op, bound))])
            }
        }
    }

    fn reject_wildcard(&self, partial: &PartialVersion, operator: &str, constraint: &str) -> Result<(), VersionParserError> {
        if partial.wildcard {
            return Err(VersionParserError::constraint(
                constraint,
                format!("operator \"{}\" cannot be combined with a wildcard version", operator),
            ));
        }
        Ok(())
    }

    fn range(&self, low: Version, high: Version) -> Vec<Box<dyn ConstraintInterface>> {
        vec![
            Box::new(Constraint::new(Operator::GreaterThanOrEqual, low)),
            Box::new(Constraint::new(Operator::LessThan, high)),
        ]
    }

    /// `^1.2.3` allows changes that do not modify the left-most non-zero component
    fn parse_caret_constraint(&self, partial: &PartialVersion, constraint: &str) -> Result<Vec<Box<dyn ConstraintInterface>>, VersionParserError> {
        self.reject_wildcard(partial, "^", constraint)?;

        let parts = &partial.parts;
        let position = if parts[0] != 0 || parts.len() == 1 {
            0
        } else if parts[1] != 0 || parts.len() == 2 {
            1
        } else {
            2
        };

        Ok(self.range(partial.padded(constraint)?, partial.bumped(position, constraint)?))
    }

    /// `~1.2.3` and `~1.2` allow patch updates, `~1` allows minor updates
    fn parse_tilde_constraint(&self, partial: &PartialVersion, constraint: &str) -> Result<Vec<Box<dyn ConstraintInterface>>, VersionParserError> {
        self.reject_wildcard(partial, "~", constraint)?;

        let position = if partial.parts.len() == 1 { 0 } else { 1 };
        Ok(self.range(partial.padded(constraint)?, partial.bumped(position, constraint)?))
    }

    /// `~=1.2` allows anything up to the next major, `~=1.2.3` up to the next minor
    fn parse_compatible_constraint(&self, partial: &PartialVersion, constraint: &str) -> Result<Vec<Box<dyn ConstraintInterface>>, VersionParserError> {
        self.reject_wildcard(partial, "~=", constraint)?;

        if partial.parts.len() < 2 {
            return Err(VersionParserError::constraint(
                constraint,
                "\"~=\" requires at least a major and minor version",
            ));
        }

        let position = partial.parts.len() - 2;
        Ok(self.range(partial.padded(constraint)?, partial.bumped(position, constraint)?))
    }

    fn parse_x_range_constraint(&self, partial: &PartialVersion, constraint: &str) -> Result<Vec<Box<dyn ConstraintInterface>>, VersionParserError> {
        let position = partial.parts.len() - 1;
        Ok(self.range(partial.padded(constraint)?, partial.bumped(position, constraint)?))
    }

    /// `1.0 - 2.0` is inclusive; a partial upper bound includes every version it covers
    fn parse_hyphen_constraint(&self, from: &str, to: &str, constraint: &str) -> Result<Vec<Box<dyn ConstraintInterface>>, VersionParserError> {
        let low = PartialVersion::parse(from, constraint)?;
        let high = PartialVersion::parse(to, constraint)?;
        if low.wildcard || high.wildcard || low.parts.is_empty() || high.parts.is_empty() {
            return Err(VersionParserError::constraint(constraint, "hyphen ranges cannot contain wildcards"));
        }

        let lower_bound = Constraint::new(Operator::GreaterThanOrEqual, low.padded(constraint)?);
        let upper_bound = if high.is_complete() {
            Constraint::new(Operator::LessThanOrEqual, high.padded(constraint)?)
        } else {
            Constraint::new(Operator::LessThan, high.bumped(high.parts.len() - 1, constraint)?)
        };

        Ok(vec![Box::new(lower_bound), Box::new(upper_bound)])
    }
}

/// A parsed version constraint together with the text it was written as
///
/// Equality and hashing use the canonical form so that `>=1.0,<2` and
/// `>=1.0.0 <2.0.0` compare equal. `Display` and serde use the trimmed text
/// the user wrote.
#[derive(Debug, Clone)]
pub struct VersionConstraint {
    constraint: Box<dyn ConstraintInterface>,
    pretty: String,
    canonical: String,
}

impl VersionConstraint {
    pub fn parse(constraint: &str) -> Result<Self, VersionParserError> {
        let parsed = VersionParser::new().parse_constraints(constraint)?;
        let canonical = parsed.to_string();
        Ok(VersionConstraint {
            constraint: parsed,
            pretty: constraint.trim().to_string(),
            canonical,
        })
    }

    /// The constraint every version satisfies
    pub fn any() -> Self {
        VersionConstraint {
            constraint: Box::new(MatchAllConstraint::new()),
            pretty: "*".to_string(),
            canonical: "*".to_string(),
        }
    }

    pub fn satisfies(&self, version: &Version) -> bool {
        self.constraint.matches(version)
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn pretty(&self) -> &str {
        &self.pretty
    }

    pub fn is_any(&self) -> bool {
        self.constraint.is_match_all()
    }

    /// Whether the constraint explicitly names a pre-release version
    pub fn allows_prereleases(&self) -> bool {
        self.constraint.mentions_prerelease()
    }

    pub fn inner(&self) -> &dyn ConstraintInterface {
        self.constraint.as_ref()
    }
}

impl PartialEq for VersionConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for VersionConstraint {}

impl Hash for VersionConstraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty)
    }
}

impl FromStr for VersionConstraint {
    type Err = VersionParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionConstraint::parse(s)
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pretty)
    }
}

impl<'de> Deserialize<'de> for VersionConstraint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        VersionConstraint::parse(&raw).map_err(serde::de::Error::custom)
    }
}
