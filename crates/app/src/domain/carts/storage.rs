//! Named persistence slots for the guest cart.
//!
//! A slot holds one opaque string and is always read and written whole.

use std::{
    fmt::Debug,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use tracing::debug;

use crate::domain::carts::errors::StorageError;

/// A single named value that survives restarts.
pub trait CartSlot: Debug + Send + Sync {
    /// Current contents, `None` when nothing was ever written.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be read.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replace the contents.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be written.
    fn write(&self, contents: &str) -> Result<(), StorageError>;

    /// Forget the contents.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be modified.
    fn remove(&self) -> Result<(), StorageError>;
}

/// Slot backed by a JSON file.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a crash leaves either the old or the new list.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Slot named `name` inside `dir`.
    #[must_use]
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(format!("{name}.json")),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartSlot for FileSlot {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StorageError::Io(error)),
        }
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let staging = self.path.with_extension("json.tmp");

        fs::write(&staging, contents)?;
        fs::rename(&staging, &self.path)?;

        debug!(path = %self.path.display(), bytes = contents.len(), "cart slot rewritten");

        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => Err(StorageError::Io(error)),
            Ok(()) | Err(_) => Ok(()),
        }
    }
}

/// Slot held in memory; used for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySlot {
    contents: Mutex<Option<String>>,
}

impl MemorySlot {
    /// Slot pre-filled with `contents`.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }
}

impl CartSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn write(&self, contents: &str) -> Result<(), StorageError> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_string());

        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = None;

        Ok(())
    }
}
