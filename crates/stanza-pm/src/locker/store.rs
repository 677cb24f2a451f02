use std::fmt::Debug;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Backend holding the serialized lock
pub trait LockStore: Send + Sync + Debug {
    /// Current lock content, `None` when no lock exists
    fn load(&self) -> io::Result<Option<String>>;

    /// Replace the lock content
    ///
    /// Either the whole new content is stored or the previous content is left
    /// untouched.
    fn store(&self, content: &str) -> io::Result<()>;

    /// Human readable location used in messages
    fn describe(&self) -> String;
}

/// Lock stored in a file on disk
#[derive(Debug, Clone)]
pub struct FileLockStore {
    path: PathBuf,
}

impl FileLockStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl LockStore for FileLockStore {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn store(&self, content: &str) -> io::Result<()> {
        let dir = self.directory();
        fs::create_dir_all(&dir)?;

        // The temp file lives next to the destination so the final rename
        // stays on one filesystem. It is deleted on drop unless persisted.
        let mut temp = tempfile::Builder::new()
            .prefix(".stanza-lock-")
            .suffix(".tmp")
            .tempfile_in(&dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        log::debug!("Wrote lock file {}", self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Lock kept in memory, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryLockStore {
    content: Mutex<Option<String>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing lock content
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(Some(content.into())),
        }
    }

    /// Snapshot of the stored content
    pub fn content(&self) -> Option<String> {
        self.content.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl LockStore for MemoryLockStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.content())
    }

    fn store(&self, content: &str) -> io::Result<()> {
        *self.content.lock().unwrap_or_else(PoisonError::into_inner) = Some(content.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
