//! Persistent bearer-token storage.
//!
//! DESIGN
//! ======
//! The token is the only client-side authentication signal: present means
//! "logged in" until a request proves otherwise. Nothing here inspects or
//! expires the token. `FileTokenStore` survives process restarts;
//! `MemoryTokenStore` lives as long as the process.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("token store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Storage contract for the session token.
pub trait TokenStore: Send + Sync {
    /// Persist `token`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Read the current token, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage exists but cannot be read.
    fn read(&self) -> Result<Option<String>, TokenStoreError>;

    /// Remove the token. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be removed.
    fn clear(&self) -> Result<(), TokenStoreError>;

    /// Whether a token is present. Read failures count as absent.
    fn is_present(&self) -> bool {
        matches!(self.read(), Ok(Some(_)))
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Token persisted as the sole content of a file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> TokenStoreError {
        TokenStoreError::Io { path: self.path.clone(), source }
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        write_private(&self.path, token).map_err(|e| self.io_error(e))
    }

    fn read(&self) -> Result<Option<String>, TokenStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(normalize(&raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Write `token` so the file is never readable beyond its owner, including
/// while it is being created. A file left behind with wider permissions is
/// narrowed before the token is written into it.
#[cfg(unix)]
fn write_private(path: &Path, token: &str) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(token.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, token: &str) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(token.as_bytes())
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local token slot.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(normalize(token)) }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Same reading as [`FileTokenStore`]: surrounding whitespace is dropped and
/// a blank token is absent.
fn normalize(token: &str) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.slot() = normalize(token);
        Ok(())
    }

    fn read(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.slot().clone())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "token_store_test.rs"]
mod tests;
