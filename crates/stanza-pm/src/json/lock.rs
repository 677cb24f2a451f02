use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stanza_semver::{Version, VersionConstraint};

use crate::error::{Result, StanzaError};
use crate::package::{Dependency, Package};
use crate::util::{canonical_requirements, canonicalize_name, sha256_hex};

/// Lock format version written by this crate
pub const LOCK_VERSION: &str = "1.0";

/// Lock file structure (stanza.lock)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFile {
    #[serde(default = "default_readme", rename = "_readme")]
    pub readme: Vec<String>,

    #[serde(rename = "lock-version")]
    pub lock_version: String,

    /// Fingerprint of the manifest this lock was resolved from
    #[serde(rename = "manifest-fingerprint")]
    pub manifest_fingerprint: String,

    /// Locked packages, in resolution order
    pub packages: Vec<LockEntry>,
}

fn default_readme() -> Vec<String> {
    vec![
        "This file locks the dependencies of your project to a known state".to_string(),
        "It is regenerated whenever stanza.json changes".to_string(),
        "This file is @generated automatically".to_string(),
    ]
}

/// A single locked package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    name: String,
    version: Version,
    /// Name of the repository the package was resolved from
    source: String,
    #[serde(default)]
    dependencies: IndexMap<String, VersionConstraint>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    dev: bool,
    hash: String,
}

impl LockEntry {
    pub fn new(name: impl Into<String>, version: Version, source: impl Into<String>) -> Self {
        let mut entry = Self {
            name: name.into(),
            version,
            source: source.into(),
            dev: false,
            dependencies: IndexMap::new(),
            hash: String::new(),
        };
        entry.hash = entry.compute_hash();
        entry
    }

    /// Lock `package` as resolved from the repository named `source`
    pub fn from_package(package: &Package, source: impl Into<String>) -> Self {
        package
            .dependencies()
            .iter()
            .fold(Self::new(package.pretty_name(), package.version().clone(), source), |entry, dep| {
                entry.with_dependency(dep.pretty_name(), dep.constraint().clone())
            })
    }

    pub fn with_dependency(mut self, name: impl Into<String>, constraint: VersionConstraint) -> Self {
        self.dependencies.insert(name.into(), constraint);
        self.hash = self.compute_hash();
        self
    }

    /// Mark the entry as only required for development
    pub fn with_dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self.hash = self.compute_hash();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn canonical_name(&self) -> String {
        canonicalize_name(&self.name)
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_dev(&self) -> bool {
        self.dev
    }

    pub fn dependencies(&self) -> &IndexMap<String, VersionConstraint> {
        &self.dependencies
    }

    /// Stored content hash (`sha256:<hex>`)
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Hash over the entry's canonical content
    ///
    /// Names are canonicalized and dependencies sorted, so neither spelling
    /// nor declaration order changes the hash.
    pub fn compute_hash(&self) -> String {
        let mut relevant = Map::new();
        relevant.insert("dependencies".to_string(), canonical_requirements(&self.dependencies));
        relevant.insert("dev".to_string(), Value::Bool(self.dev));
        relevant.insert("name".to_string(), Value::String(self.canonical_name()));
        relevant.insert("source".to_string(), Value::String(self.source.clone()));
        relevant.insert("version".to_string(), Value::String(self.version.to_string()));

        let content = Value::Object(relevant).to_string();
        format!("sha256:{}", sha256_hex(content.as_bytes()))
    }

    /// Whether the stored hash matches the entry's content
    pub fn is_intact(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Rebuild the package this entry pins
    pub fn to_package(&self) -> Package {
        let dependencies = self
            .dependencies
            .iter()
            .map(|(name, constraint)| Dependency::new(name.as_str(), constraint.clone()))
            .collect();
        Package::from_parts(self.name.as_str(), self.version.clone(), dependencies)
    }
}

impl LockFile {
    /// Create a lock for `entries` resolved from a manifest with `fingerprint`
    pub fn new(manifest_fingerprint: impl Into<String>, packages: Vec<LockEntry>) -> Self {
        Self {
            readme: default_readme(),
            lock_version: LOCK_VERSION.to_string(),
            manifest_fingerprint: manifest_fingerprint.into(),
            packages,
        }
    }

    /// Parse a lock file, verifying its version and every entry hash
    ///
    /// `location` is only used in error messages. Anything that is not a
    /// structurally valid lock is reported as [`StanzaError::CorruptLock`].
    pub fn parse(content: &str, location: &str) -> Result<Self> {
        let corrupt = |reason: String| StanzaError::CorruptLock {
            location: location.to_string(),
            reason,
        };

        let value: Value = serde_json::from_str(content).map_err(|e| corrupt(e.to_string()))?;

        let lock_version = value
            .get("lock-version")
            .and_then(Value::as_str)
            .ok_or_else(|| corrupt("missing \"lock-version\"".to_string()))?;
        check_lock_version(lock_version)?;

        let lock: LockFile = serde_json::from_value(value).map_err(|e| corrupt(e.to_string()))?;

        for entry in &lock.packages {
            if !entry.is_intact() {
                return Err(corrupt(format!(
                    "hash mismatch for {}@{}",
                    entry.name, entry.version
                )));
            }
        }

        Ok(lock)
    }

    /// Parse a stanza.lock from a file path
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Serialize to pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Find a locked package by name
    pub fn find_package(&self, name: &str) -> Option<&LockEntry> {
        let canonical = canonicalize_name(name);
        self.packages.iter().find(|p| p.canonical_name() == canonical)
    }

    /// Locked packages needed outside development
    pub fn runtime_packages(&self) -> impl Iterator<Item = &LockEntry> {
        self.packages.iter().filter(|p| !p.dev)
    }
}

/// Accept any 1.x lock; minor versions only add optional fields
fn check_lock_version(found: &str) -> Result<()> {
    let supported_major = LOCK_VERSION.split('.').next().unwrap_or(LOCK_VERSION);
    if found.split('.').next() == Some(supported_major) {
        Ok(())
    } else {
        Err(StanzaError::UnsupportedLockVersion {
            found: found.to_string(),
        })
    }
}
