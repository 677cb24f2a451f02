//! Inline package definitions loaded from JSON.

use serde_json::Value;

use super::memory::MemoryRepository;
use super::traits::Repository;
use crate::error::{Result, StanzaError};
use crate::package::Package;

impl MemoryRepository {
    /// Build a repository from inline package definitions
    ///
    /// Accepts a single package object or an array of them:
    ///
    /// ```json
    /// [
    ///     { "name": "pkg-a", "version": "1.0.0", "dependencies": { "pkg-b": "^2.0" } },
    ///     { "name": "pkg-b", "version": "2.1.0" }
    /// ]
    /// ```
    pub fn from_json(name: impl Into<String>, packages: &Value) -> Result<Self> {
        let definitions = match packages {
            Value::Array(items) => items.as_slice(),
            Value::Object(_) => std::slice::from_ref(packages),
            _ => {
                return Err(StanzaError::Repository(
                    "Package definitions must be an object or array".to_string(),
                ))
            }
        };

        let repo = Self::new(name);
        for (index, definition) in definitions.iter().enumerate() {
            let package = load_package(definition).map_err(|e| match e {
                StanzaError::Repository(reason) => {
                    StanzaError::Repository(format!("Invalid package at index {}: {}", index, reason))
                }
                other => other,
            })?;
            repo.add(package)?;
        }

        log::debug!("Loaded {} inline package(s) into {}", repo.count(), repo.name());
        Ok(repo)
    }
}

/// Load a single package from JSON
fn load_package(json: &Value) -> Result<Package> {
    let name = json
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| StanzaError::Repository("Package must have a 'name' field".to_string()))?;

    let version = json
        .get("version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| StanzaError::Repository("Package must have a 'version' field".to_string()))?;

    let mut package = Package::new(name, version)?;

    match json.get("dependencies") {
        None | Some(Value::Null) => {}
        Some(Value::Object(dependencies)) => {
            for (dep_name, constraint) in dependencies {
                let constraint = constraint.as_str().ok_or_else(|| {
                    StanzaError::Repository(format!("Constraint for '{}' must be a string", dep_name))
                })?;
                package = package.with_dependency(dep_name.as_str(), constraint)?;
            }
        }
        Some(_) => {
            return Err(StanzaError::Repository(
                "'dependencies' must be an object".to_string(),
            ))
        }
    }

    Ok(package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stanza_semver::VersionConstraint;

    #[test]
    fn test_from_json_single_object() {
        let repo = MemoryRepository::from_json(
            "inline",
            &json!({ "name": "pkg-a", "version": "1.0.0", "dependencies": { "pkg-b": "^2.0" } }),
        )
        .unwrap();

        let found = repo.find("pkg-a", &VersionConstraint::any());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].dependencies()[0].name(), "pkg-b");
        assert_eq!(repo.name(), "inline");
    }

    #[test]
    fn test_from_json_array() {
        let repo = MemoryRepository::from_json(
            "inline",
            &json!([
                { "name": "pkg-a", "version": "1.0.0" },
                { "name": "pkg-a", "version": "2.0.0" },
                { "name": "pkg-b", "version": "0.1.0" }
            ]),
        )
        .unwrap();

        assert_eq!(repo.count(), 3);
        assert_eq!(repo.package_names(), vec!["pkg-a".to_string(), "pkg-b".to_string()]);
    }

    #[test]
    fn test_from_json_reports_index() {
        let err = MemoryRepository::from_json(
            "inline",
            &json!([{ "name": "pkg-a", "version": "1.0.0" }, { "version": "1.0.0" }]),
        )
        .unwrap_err();

        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            MemoryRepository::from_json("inline", &json!("pkg-a")),
            Err(StanzaError::Repository(_))
        ));
        assert!(matches!(
            MemoryRepository::from_json("inline", &json!({ "name": "pkg-a", "version": "one" })),
            Err(StanzaError::InvalidVersion(_))
        ));
        assert!(matches!(
            MemoryRepository::from_json(
                "inline",
                &json!({ "name": "pkg-a", "version": "1.0.0", "dependencies": { "b": "^^" } })
            ),
            Err(StanzaError::InvalidConstraint(_))
        ));
        assert!(matches!(
            MemoryRepository::from_json(
                "inline",
                &json!([
                    { "name": "pkg-a", "version": "1.0.0", "dependencies": { "b": "^1" } },
                    { "name": "pkg-a", "version": "1.0.0", "dependencies": { "b": "^2" } }
                ])
            ),
            Err(StanzaError::DuplicatePackage { .. })
        ));
    }
}
