use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::source::{ConfigLoader, ConfigSource, RawConfig};
use crate::error::{Result, StanzaError};

/// HTTP Basic authentication credentials for a package source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpBasicAuth {
    pub username: String,
    pub password: String,
}

fn default_lock_file() -> PathBuf {
    PathBuf::from("stanza.lock")
}

fn default_manifest_file() -> PathBuf {
    PathBuf::from("stanza.json")
}

/// Immutable configuration snapshot for one session
///
/// Built once from defaults, the global config file, the project manifest and
/// the environment, then shared by reference (usually as `Arc<Config>`).
/// Nothing re-reads or re-merges the underlying sources after `build`.
#[derive(Debug, Clone)]
pub struct Config {
    home_dir: PathBuf,
    cache_dir: PathBuf,
    lock_file: PathBuf,
    manifest_file: PathBuf,
    http_basic: IndexMap<String, HttpBasicAuth>,

    base_dir: Option<PathBuf>,
    sources: HashMap<String, ConfigSource>,
}

impl Default for Config {
    fn default() -> Self {
        let loader = ConfigLoader::new(false);
        Config {
            home_dir: loader.get_stanza_home(),
            cache_dir: loader.get_cache_dir(),
            lock_file: default_lock_file(),
            manifest_file: default_manifest_file(),
            http_basic: IndexMap::new(),
            base_dir: None,
            sources: HashMap::new(),
        }
    }
}

impl Config {
    const KEYS: [&'static str; 4] = ["cache-dir", "lock-file", "manifest-file", "http-basic"];

    /// Defaults only, with relative paths resolved against `base_dir`
    pub fn with_base_dir<P: AsRef<Path>>(base_dir: P) -> Self {
        let mut config = Self::default();
        config.base_dir = Some(base_dir.as_ref().to_path_buf());
        config.mark_defaults();
        config
    }

    /// Build configuration from all sources (defaults, global, project, env)
    pub fn build<P: AsRef<Path>>(project_dir: Option<P>, use_environment: bool) -> Result<Self> {
        let loader = ConfigLoader::new(use_environment);
        let mut config = Self {
            home_dir: loader.get_stanza_home(),
            cache_dir: loader.get_cache_dir(),
            ..Self::default()
        };
        config.base_dir = project_dir.as_ref().map(|dir| dir.as_ref().to_path_buf());
        config.mark_defaults();

        // 1. Global config from <stanza home>/config.json
        let global_config = loader.load_global_config()?;
        config.merge_raw_config(global_config, ConfigSource::Global)?;

        // 2. Project manifest `config` section. The manifest location itself can
        //    only come from the layers below or the environment.
        if config.base_dir.is_some() {
            let manifest = loader
                .get_env_path("manifest-file")
                .unwrap_or_else(|| config.manifest_file.clone());
            let project_config = loader.load_project_config(config.resolve_path(&manifest))?;
            config.merge_raw_config(project_config, ConfigSource::Project)?;
        }

        // 3. Environment variable overrides
        if use_environment {
            config.apply_env_overrides(&loader)?;
        }

        Ok(config)
    }

    fn mark_defaults(&mut self) {
        for key in Self::KEYS {
            self.sources.insert(key.to_string(), ConfigSource::Default);
        }
    }

    /// Get base directory
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Get the source of a configuration value
    pub fn get_source(&self, key: &str) -> Option<&ConfigSource> {
        self.sources.get(key)
    }

    pub fn get_home_dir(&self) -> &Path {
        &self.home_dir
    }

    /// Get cache directory (resolved as absolute path)
    pub fn get_cache_dir(&self) -> PathBuf {
        self.resolve_path(&self.cache_dir)
    }

    /// Get lock file path (resolved against the project directory)
    pub fn get_lock_file(&self) -> PathBuf {
        self.resolve_path(&self.lock_file)
    }

    /// Get manifest file path (resolved against the project directory)
    pub fn get_manifest_file(&self) -> PathBuf {
        self.resolve_path(&self.manifest_file)
    }

    /// Credentials configured for a package source, if any
    pub fn credentials_for(&self, source: &str) -> Option<&HttpBasicAuth> {
        self.http_basic.get(source)
    }

    /// All configured HTTP Basic credentials, keyed by source name
    pub fn http_basic(&self) -> &IndexMap<String, HttpBasicAuth> {
        &self.http_basic
    }

    /// Resolve a path relative to base_dir if not absolute
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(ref base) = self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }

    /// Merge raw configuration from a source
    fn merge_raw_config(&mut self, raw: RawConfig, source: ConfigSource) -> Result<()> {
        if let Some(config_map) = raw.config {
            // Sorted so that errors and logs are deterministic
            let mut entries: Vec<_> = config_map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, value) in entries {
                self.merge_config_value(&key, value, source.clone())?;
            }
        }
        Ok(())
    }

    fn merge_config_value(&mut self, key: &str, value: serde_json::Value, source: ConfigSource) -> Result<()> {
        match key {
            "cache-dir" => {
                self.cache_dir = PathBuf::from(expect_string(key, &value)?);
            }
            "lock-file" => {
                self.lock_file = PathBuf::from(expect_string(key, &value)?);
            }
            "manifest-file" => {
                if source == ConfigSource::Project {
                    log::warn!("Ignoring \"manifest-file\" set inside the project manifest");
                    return Ok(());
                }
                self.manifest_file = PathBuf::from(expect_string(key, &value)?);
            }
            "http-basic" => {
                let credentials: IndexMap<String, HttpBasicAuth> = serde_json::from_value(value)
                    .map_err(|e| StanzaError::Config(format!("Invalid \"http-basic\" value: {}", e)))?;
                self.http_basic.extend(credentials);
            }
            _ => {
                log::warn!("Unknown configuration key \"{}\" from {}", key, source.as_str());
                return Ok(());
            }
        }

        log::trace!("Config {} set from {}", key, source.as_str());
        self.sources.insert(key.to_string(), source);
        Ok(())
    }

    fn apply_env_overrides(&mut self, loader: &ConfigLoader) -> Result<()> {
        for key in ["cache-dir", "lock-file", "manifest-file"] {
            if let Some(value) = loader.get_env_config(key) {
                let source = ConfigSource::Environment(ConfigLoader::env_var_name(key));
                self.merge_config_value(key, serde_json::Value::String(value), source)?;
            }
        }

        if let Some(auth) = loader.get_stanza_env("STANZA_AUTH") {
            let raw: RawConfig = serde_json::from_str(&format!("{{\"config\": {}}}", auth))
                .map_err(|e| StanzaError::Config(format!("Invalid STANZA_AUTH: {}", e)))?;
            let source = ConfigSource::Environment("STANZA_AUTH".to_string());
            if let Some(value) = raw.config.and_then(|mut map| map.remove("http-basic")) {
                self.merge_config_value("http-basic", value, source)?;
            }
        }

        Ok(())
    }
}

fn expect_string(key: &str, value: &serde_json::Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| StanzaError::Config(format!("\"{}\" must be a string", key)))
}
