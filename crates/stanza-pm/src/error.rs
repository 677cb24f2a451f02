use stanza_semver::VersionParserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StanzaError {
    // Version parsing errors
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid version constraint: {0}")]
    InvalidConstraint(String),

    // Repository errors
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Package {name}@{version} is already registered with different dependencies")]
    DuplicatePackage { name: String, version: String },

    #[error("No repository provides {name} matching \"{constraint}\"")]
    PackageNotFound { name: String, constraint: String },

    // Lock file errors
    #[error("Lock file not found at {location}")]
    LockNotFound { location: String },

    #[error("Lock file at {location} is corrupt: {reason}")]
    CorruptLock { location: String, reason: String },

    #[error("Unsupported lock file version {found}")]
    UnsupportedLockVersion { found: String },

    // Manifest errors
    #[error("Invalid stanza.json: {message}")]
    InvalidManifest { message: String },

    // Solver errors
    #[error("Could not resolve dependencies: {0}")]
    DependencyResolution(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<VersionParserError> for StanzaError {
    fn from(err: VersionParserError) -> Self {
        match err {
            VersionParserError::InvalidVersion(_) => StanzaError::InvalidVersion(err.to_string()),
            VersionParserError::InvalidConstraint { .. } => StanzaError::InvalidConstraint(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StanzaError>;
