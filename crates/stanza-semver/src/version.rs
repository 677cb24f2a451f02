//! SemVer 2.0.0 versions and their precedence rules

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::version_parser::VersionParserError;

lazy_static! {
    // Official SemVer 2.0.0 grammar with an optional leading "v"
    static ref SEMVER_RE: Regex = Regex::new(concat!(
        r"^[vV]?(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)",
        r"(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
        r"(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$"
    )).unwrap();
}

/// Stability levels derived from a version's pre-release label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stability {
    Dev,
    Alpha,
    Beta,
    RC,
    Stable,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Dev => "dev",
            Stability::Alpha => "alpha",
            Stability::Beta => "beta",
            Stability::RC => "RC",
            Stability::Stable => "stable",
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single dot-separated pre-release identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Numeric(u64),
    AlphaNumeric(String),
}

impl Identifier {
    fn parse(part: &str) -> Result<Self, VersionParserError> {
        if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
            part.parse()
                .map(Identifier::Numeric)
                .map_err(|_| VersionParserError::InvalidVersion(part.to_string()))
        } else {
            Ok(Identifier::AlphaNumeric(part.to_string()))
        }
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(a), Identifier::Numeric(b)) => a.cmp(b),
            (Identifier::Numeric(_), Identifier::AlphaNumeric(_)) => Ordering::Less,
            (Identifier::AlphaNumeric(_), Identifier::Numeric(_)) => Ordering::Greater,
            (Identifier::AlphaNumeric(a), Identifier::AlphaNumeric(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::AlphaNumeric(s) => write!(f, "{}", s),
        }
    }
}

/// A semantic version: `MAJOR.MINOR.PATCH[-PRE][+BUILD]`
///
/// `Ord` follows SemVer precedence and falls back to comparing build metadata
/// so that ordering agrees with equality. Use [`Version::cmp_precedence`] when
/// build metadata must be ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Vec<Identifier>,
    pub build: Vec<String>,
}

impl Version {
    /// Create a release version with no pre-release or build metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            pre: Vec::new(),
            build: Vec::new(),
        }
    }

    /// Parse a full SemVer string
    pub fn parse(version: &str) -> Result<Self, VersionParserError> {
        let trimmed = version.trim();
        let caps = SEMVER_RE
            .captures(trimmed)
            .ok_or_else(|| VersionParserError::InvalidVersion(version.to_string()))?;

        let number = |idx: usize| -> Result<u64, VersionParserError> {
            caps.get(idx)
                .map_or("0", |m| m.as_str())
                .parse()
                .map_err(|_| VersionParserError::InvalidVersion(version.to_string()))
        };

        let pre = match caps.get(4) {
            Some(m) => m
                .as_str()
                .split('.')
                .map(Identifier::parse)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let build = caps
            .get(5)
            .map(|m| m.as_str().split('.').map(str::to_string).collect())
            .unwrap_or_default();

        Ok(Version {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            pre,
            build,
        })
    }

    /// The lowest possible pre-release of this version's numeric triple (`X.Y.Z-0`)
    pub fn floor(&self) -> Self {
        Version {
            major: self.major,
            minor: self.minor,
            patch: self.patch,
            pre: vec![Identifier::Numeric(0)],
            build: Vec::new(),
        }
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// Stability derived from the first pre-release identifier
    pub fn stability(&self) -> Stability {
        let label = match self.pre.first() {
            None => return Stability::Stable,
            Some(Identifier::Numeric(_)) => return Stability::Dev,
            Some(Identifier::AlphaNumeric(s)) => s.to_ascii_lowercase(),
        };

        if label.starts_with("rc") {
            Stability::RC
        } else if label.starts_with("beta") || label == "b" {
            Stability::Beta
        } else if label.starts_with("alpha") || label == "a" {
            Stability::Alpha
        } else {
            Stability::Dev
        }
    }

    /// Compare by SemVer precedence, ignoring build metadata
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_precedence(other).then_with(|| self.build.cmp(&other.build))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            let pre: Vec<String> = self.pre.iter().map(|i| i.to_string()).collect();
            write!(f, "-{}", pre.join("."))?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build.join("."))?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(serde::de::Error::custom)
    }
}
