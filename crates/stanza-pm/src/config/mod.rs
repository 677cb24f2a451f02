//! Configuration management
//!
//! Configuration is layered, later layers overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. Global `config.json` in the stanza home directory
//! 3. The project manifest's `config` section
//! 4. Environment variables (`STANZA_*`, `STANZA_AUTH` for credentials)
//!
//! The result is an immutable [`Config`] snapshot built once per session.
//!
//! # Example
//!
//! ```rust,no_run
//! use stanza_pm::config::Config;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let config = Arc::new(Config::build(Some(Path::new("/path/to/project")), true).unwrap());
//! println!("Lock file: {:?}", config.get_lock_file());
//!
//! if let Some(auth) = config.credentials_for("private") {
//!     println!("Using credentials for {}", auth.username);
//! }
//! ```

mod config;
mod source;

pub use config::{Config, HttpBasicAuth};
pub use source::{ConfigLoader, ConfigSource, RawConfig};
