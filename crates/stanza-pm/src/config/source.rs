use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};

use crate::error::{Result, StanzaError};

/// Layer a configuration value came from, lowest precedence first
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Default,
    /// `config.json` in the stanza home directory
    Global,
    /// `config` section of the project manifest
    Project,
    /// Named environment variable
    Environment(String),
}

impl ConfigSource {
    /// Label used in log messages
    pub fn as_str(&self) -> &str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::Global => "global",
            ConfigSource::Project => "project",
            ConfigSource::Environment(var) => var,
        }
    }
}

/// The `config` object of a global config file or a manifest
///
/// Every other top-level key is ignored, so a whole `stanza.json` can be read
/// through this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<HashMap<String, serde_json::Value>>,
}

/// Locates and reads the files and variables that feed a [`Config`](super::Config)
#[derive(Debug)]
pub struct ConfigLoader {
    use_environment: bool,
}

impl ConfigLoader {
    /// With `use_environment` off, every `STANZA_*` lookup reports unset
    pub fn new(use_environment: bool) -> Self {
        Self { use_environment }
    }

    /// Non-empty value of `var`, if the environment is consulted
    pub fn get_stanza_env(&self, var: &str) -> Option<String> {
        self.use_environment
            .then(|| env::var(var).ok())
            .flatten()
            .filter(|value| !value.is_empty())
    }

    /// `STANZA_HOME`, else the platform config directory, else `~/.stanza`
    pub fn get_stanza_home(&self) -> PathBuf {
        self.get_stanza_env("STANZA_HOME")
            .map(PathBuf::from)
            .or_else(|| project_dirs().map(|dirs| dirs.config_dir().to_path_buf()))
            .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().join(".stanza")))
            .unwrap_or_else(|| PathBuf::from(".stanza"))
    }

    /// `STANZA_CACHE_DIR`, else the platform cache directory, else `<home>/cache`
    pub fn get_cache_dir(&self) -> PathBuf {
        self.get_stanza_env("STANZA_CACHE_DIR")
            .map(PathBuf::from)
            .or_else(|| project_dirs().map(|dirs| dirs.cache_dir().to_path_buf()))
            .unwrap_or_else(|| self.get_stanza_home().join("cache"))
    }

    /// Read the `config` object of a JSON file
    ///
    /// An absent file yields an empty [`RawConfig`]; unreadable or malformed
    /// files are [`StanzaError::Config`].
    pub fn load_config_file<P: AsRef<Path>>(&self, path: P) -> Result<RawConfig> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(RawConfig::default()),
            Err(e) => return Err(StanzaError::Config(format!("Cannot read {}: {}", path.display(), e))),
        };

        let raw = serde_json::from_str(&contents)
            .map_err(|e| StanzaError::Config(format!("Cannot parse {}: {}", path.display(), e)))?;
        log::debug!("Read configuration from {}", path.display());
        Ok(raw)
    }

    pub fn load_global_config(&self) -> Result<RawConfig> {
        self.load_config_file(self.get_stanza_home().join("config.json"))
    }

    pub fn load_project_config<P: AsRef<Path>>(&self, manifest_path: P) -> Result<RawConfig> {
        self.load_config_file(manifest_path)
    }

    /// Environment override for a config key, e.g. `lock-file` -> `STANZA_LOCK_FILE`
    pub fn get_env_config(&self, key: &str) -> Option<String> {
        self.get_stanza_env(&Self::env_var_name(key))
    }

    pub fn get_env_path(&self, key: &str) -> Option<PathBuf> {
        self.get_env_config(key).map(PathBuf::from)
    }

    pub fn env_var_name(key: &str) -> String {
        format!("STANZA_{}", key.replace('-', "_").to_uppercase())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "stanza")
}
