//! Bearer-token persistence for the remote service.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A bearer token for the remote API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("AuthToken").field(&"[REDACTED]").finish()
    }
}

impl From<String> for AuthToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for AuthToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Storage for the bearer token the sync side authenticates with.
///
/// Loading `None` means the user has not signed in; sync cycles skip their
/// network work until a token appears.
pub trait TokenStore: Clone + Send + Sync + 'static {
    fn load(&self) -> Result<Option<AuthToken>>;
    fn save(&self, token: &AuthToken) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

/// Token store backed by a small JSON file.
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
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<AuthToken>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(Error::Io(error)),
        };

        let stored: StoredToken = serde_json::from_str(&raw)?;
        let token = AuthToken::new(stored.token);
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token))
    }

    fn save(&self, token: &AuthToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&StoredToken {
            token: token.as_str().to_string(),
        })?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(Error::Io(error)),
        }
    }
}

/// In-memory token store for tests and embedded setups.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<Mutex<Option<AuthToken>>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<AuthToken>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<AuthToken>> {
        let guard = self
            .inner
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        Ok(guard.clone().filter(|token| !token.is_empty()))
    }

    fn save(&self, token: &AuthToken) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        *guard = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));

        assert!(store.load().unwrap().is_none());

        store.save(&AuthToken::new("secret-token")).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.as_str(), "secret-token");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested/deep/token.json"));

        store.save(&AuthToken::new("secret")).unwrap();
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn clear_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        store.clear().unwrap();
    }

    #[test]
    fn blank_token_loads_as_none() {
        let store = MemoryTokenStore::new();
        store.save(&AuthToken::new("   ")).unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::with_token("secret");
        assert_eq!(store.load().unwrap().unwrap().as_str(), "secret");
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AuthToken::new("very-secret-token");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("very-secret-token"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
