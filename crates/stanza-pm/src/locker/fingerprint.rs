use serde_json::{Map, Value};

use crate::json::Manifest;
use crate::util::{canonical_requirements, canonicalize_name, sha256_hex};

/// Strategy computing the fingerprint stored in a lock file
pub trait Fingerprinter: Send + Sync {
    fn fingerprint(&self, manifest: &Manifest) -> String;
}

impl<F> Fingerprinter for F
where
    F: Fn(&Manifest) -> String + Send + Sync,
{
    fn fingerprint(&self, manifest: &Manifest) -> String {
        self(manifest)
    }
}

/// Default fingerprint: SHA-256 over the resolution-relevant manifest fields
///
/// Only the project name, dependencies, dev-dependencies and sources are
/// hashed. Names are canonicalized, constraints reduced to their canonical
/// form and maps sorted, so reformatting or reordering a manifest keeps the
/// fingerprint while any change to a constraint alters it. Source order is
/// significant and is kept as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHash;

impl ContentHash {
    /// The exact JSON text that gets hashed
    ///
    /// Keys are inserted in sorted order so the text is stable.
    pub fn relevant_content(manifest: &Manifest) -> String {
        let sources: Vec<Value> = manifest
            .sources
            .iter()
            .map(|source| {
                let mut entry = Map::new();
                entry.insert("name".to_string(), Value::String(source.name.clone()));
                entry.insert("url".to_string(), Value::String(source.url.clone()));
                Value::Object(entry)
            })
            .collect();

        let mut relevant = Map::new();
        relevant.insert("dependencies".to_string(), canonical_requirements(&manifest.dependencies));
        relevant.insert("dev-dependencies".to_string(), canonical_requirements(&manifest.dev_dependencies));
        relevant.insert("name".to_string(), Value::String(canonicalize_name(&manifest.name)));
        relevant.insert("sources".to_string(), Value::Array(sources));

        Value::Object(relevant).to_string()
    }
}

impl Fingerprinter for ContentHash {
    fn fingerprint(&self, manifest: &Manifest) -> String {
        sha256_hex(Self::relevant_content(manifest).as_bytes())
    }
}
