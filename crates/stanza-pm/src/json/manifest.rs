use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stanza_semver::{Version, VersionConstraint};

use crate::error::{Result, StanzaError};
use crate::package::Dependency;
use crate::util::canonicalize_name;

/// A named package source declared by the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
}

/// Raw stanza.json structure before constraints are parsed
#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: IndexMap<String, String>,
    #[serde(default)]
    sources: Vec<Source>,
    #[serde(default)]
    config: serde_json::Map<String, serde_json::Value>,
}

/// Project manifest (stanza.json)
///
/// ```json
/// {
///     "name": "my-app",
///     "dependencies": { "requests": "^2.28" },
///     "dev-dependencies": { "pytest": ">=7" },
///     "sources": [ { "name": "private", "url": "https://pkgs.example.com/simple" } ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: IndexMap<String, VersionConstraint>,

    #[serde(rename = "dev-dependencies", skip_serializing_if = "IndexMap::is_empty")]
    pub dev_dependencies: IndexMap<String, VersionConstraint>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,

    /// Consumed by [`crate::config::Config`]; never part of the fingerprint
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl Manifest {
    /// Create a manifest with no dependencies
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            description: None,
            dependencies: IndexMap::new(),
            dev_dependencies: IndexMap::new(),
            sources: Vec::new(),
            config: serde_json::Map::new(),
        }
    }

    /// Add a runtime dependency, parsing `constraint`
    pub fn with_dependency(mut self, name: impl Into<String>, constraint: &str) -> Result<Self> {
        self.dependencies.insert(name.into(), VersionConstraint::parse(constraint)?);
        Ok(self)
    }

    /// Add a development dependency, parsing `constraint`
    pub fn with_dev_dependency(mut self, name: impl Into<String>, constraint: &str) -> Result<Self> {
        self.dev_dependencies.insert(name.into(), VersionConstraint::parse(constraint)?);
        Ok(self)
    }

    /// Add a package source; sources keep declaration order
    pub fn with_source(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.sources.push(Source {
            name: name.into(),
            url: url.into(),
        });
        self
    }

    /// Parse and validate a manifest from JSON text
    pub fn from_str(content: &str) -> Result<Self> {
        let raw: RawManifest = serde_json::from_str(content).map_err(|e| StanzaError::InvalidManifest {
            message: e.to_string(),
        })?;

        let version = raw.version.as_deref().map(Version::parse).transpose()?;

        let manifest = Self {
            name: raw.name,
            version,
            description: raw.description,
            dependencies: parse_constraints(raw.dependencies)?,
            dev_dependencies: parse_constraints(raw.dev_dependencies)?,
            sources: raw.sources,
            config: raw.config,
        };

        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and parse a stanza.json file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content).map_err(|e| match e {
            StanzaError::InvalidManifest { message } => StanzaError::InvalidManifest {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// Check structural rules that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return invalid("\"name\" must not be empty");
        }

        for (section, dependencies) in [("dependencies", &self.dependencies), ("dev-dependencies", &self.dev_dependencies)] {
            let mut declared = std::collections::HashMap::new();
            for name in dependencies.keys() {
                if name.trim().is_empty() {
                    return invalid("dependency names must not be empty");
                }
                if let Some(previous) = declared.insert(canonicalize_name(name), name) {
                    return invalid(format!(
                        "\"{}\" and \"{}\" in \"{}\" name the same package",
                        previous, name, section
                    ));
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return invalid("source names must not be empty");
            }
            if !seen.insert(source.name.as_str()) {
                return invalid(format!("source \"{}\" is declared twice", source.name));
            }
            url::Url::parse(&source.url)
                .map_err(|e| StanzaError::InvalidManifest {
                    message: format!("source \"{}\" has an invalid url \"{}\": {}", source.name, source.url, e),
                })?;
        }

        Ok(())
    }

    /// Runtime dependencies as [`Dependency`] values, in declaration order
    pub fn requirements(&self) -> Vec<Dependency> {
        to_dependencies(&self.dependencies)
    }

    /// Development dependencies as [`Dependency`] values, in declaration order
    pub fn dev_requirements(&self) -> Vec<Dependency> {
        to_dependencies(&self.dev_dependencies)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn parse_constraints(raw: IndexMap<String, String>) -> Result<IndexMap<String, VersionConstraint>> {
    raw.into_iter()
        .map(|(name, constraint)| Ok((name, VersionConstraint::parse(&constraint)?)))
        .collect()
}

fn to_dependencies(map: &IndexMap<String, VersionConstraint>) -> Vec<Dependency> {
    map.iter()
        .map(|(name, constraint)| Dependency::new(name.as_str(), constraint.clone()))
        .collect()
}

fn invalid<T>(message: impl Into<String>) -> Result<T> {
    Err(StanzaError::InvalidManifest {
        message: message.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_str(
            r#"{
                "name": "my-app",
                "version": "0.1.0",
                "description": "Demo",
                "dependencies": { "Requests": "^2.28", "idna": ">=3" },
                "dev-dependencies": { "pytest": "*" },
                "sources": [
                    { "name": "private", "url": "https://pkgs.example.com/simple" },
                    { "name": "public", "url": "https://pypi.org/simple" }
                ],
                "config": { "lock-file": "custom.lock" }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.name, "my-app");
        assert_eq!(manifest.version, Some(Version::new(0, 1, 0)));
        assert_eq!(
            manifest.dependencies.keys().collect::<Vec<_>>(),
            vec!["Requests", "idna"]
        );
        assert_eq!(manifest.dependencies["Requests"].pretty(), "^2.28");
        assert_eq!(manifest.sources[0].name, "private");
        assert_eq!(manifest.config["lock-file"], "custom.lock");

        let requirements = manifest.requirements();
        assert_eq!(requirements[0].name(), "requests");
        assert_eq!(manifest.dev_requirements()[0].name(), "pytest");
    }

    #[test]
    fn test_manifest_builder() {
        let manifest = Manifest::new("my-app")
            .with_dependency("dep", "^1.0")
            .unwrap()
            .with_dev_dependency("lint", "~2.1")
            .unwrap()
            .with_source("main", "https://example.com/simple");

        assert_eq!(manifest.dependencies.len(), 1);
        assert_eq!(manifest.dev_dependencies.len(), 1);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_manifest_errors() {
        assert!(matches!(
            Manifest::from_str("{ \"name\": \"\" }"),
            Err(StanzaError::InvalidManifest { .. })
        ));
        assert!(matches!(
            Manifest::from_str("{ \"dependencies\": {} }"),
            Err(StanzaError::InvalidManifest { .. })
        ));
        assert!(matches!(
            Manifest::from_str("{ \"name\": \"app\", \"dependencies\": { \"dep\": \"^^1\" } }"),
            Err(StanzaError::InvalidConstraint(_))
        ));
        assert!(matches!(
            Manifest::from_str("{ \"name\": \"app\", \"version\": \"one\" }"),
            Err(StanzaError::InvalidVersion(_))
        ));
        assert!(matches!(
            Manifest::from_str("{ \"name\": \"app\", \"sources\": [{ \"name\": \"x\", \"url\": \"not a url\" }] }"),
            Err(StanzaError::InvalidManifest { .. })
        ));
        assert!(matches!(
            Manifest::from_str("[1, 2]"),
            Err(StanzaError::InvalidManifest { .. })
        ));
    }

    #[test]
    fn test_dependency_names_colliding_after_canonicalization() {
        let err = Manifest::from_str(r#"{ "name": "app", "dependencies": { "Foo": "^1.0", "foo": "^2.0" } }"#)
            .unwrap_err();
        assert!(matches!(err, StanzaError::InvalidManifest { ref message } if message.contains("same package")));

        let dev = Manifest::new("app")
            .with_dev_dependency("zope.interface", "*")
            .unwrap()
            .with_dev_dependency("Zope_Interface", "*")
            .unwrap();
        assert!(matches!(dev.validate(), Err(StanzaError::InvalidManifest { .. })));

        // The same package may be both a runtime and a development dependency
        let both = Manifest::new("app")
            .with_dependency("foo", "^1.0")
            .unwrap()
            .with_dev_dependency("Foo", "^1.2")
            .unwrap();
        assert!(both.validate().is_ok());
    }

    #[test]
    fn test_duplicate_source_names() {
        let manifest = Manifest::new("app")
            .with_source("main", "https://a.example.com")
            .with_source("main", "https://b.example.com");
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_to_json_round_trip() {
        let manifest = Manifest::new("app").with_dependency("dep", ">=1.0, <2").unwrap();
        let json = manifest.to_json().unwrap();
        assert_eq!(Manifest::from_str(&json).unwrap(), manifest);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stanza.json");
        std::fs::write(&path, "{ \"name\": \"app\", \"dependencies\": { \"dep\": \"1.2.3\" } }").unwrap();

        let manifest = Manifest::from_file(&path).unwrap();
        assert_eq!(manifest.dependencies["dep"].canonical(), "==1.2.3");

        assert!(matches!(
            Manifest::from_file(dir.path().join("missing.json")),
            Err(StanzaError::Io(_))
        ));
    }
}
