//! Key/value token storage.
//!
//! `TokenStore` is a pure passthrough: no validation, and an absent key is `None`
//! rather than an error. `MemoryTokenStore` backs tests and embedded use;
//! `FileTokenStore` is the durable store used by the CLI and writes every mutation
//! through to a JSON file.
//!
//! The access and refresh keys are written as two separate operations. A crash
//! between them can leave a mismatched pair; the next `is_logged_in` or refresh
//! check detects it.

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::RwLock,
};
use tracing::{debug, error, warn};

pub trait TokenStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: &str);
    fn remove(&self, name: &str);
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.read().ok()?.get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(name.to_string(), value.to_string());
        }
    }

    fn remove(&self, name: &str) {
        if let Ok(mut values) = self.values.write() {
            values.remove(name);
        }
    }
}

/// Token store persisted as a flat JSON object.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FileTokenStore {
    /// Opens the store at `path`. A missing or unreadable file is treated as empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = load(&path);
        debug!(path = %path.display(), keys = values.len(), "token store opened");
        Self {
            path,
            values: RwLock::new(values),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) {
        if let Err(err) = write_file(&self.path, values) {
            error!(path = %self.path.display(), "Failed to persist token store: {err}");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.read().ok()?.get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(name.to_string(), value.to_string());
            self.persist(&values);
        }
    }

    fn remove(&self, name: &str) {
        if let Ok(mut values) = self.values.write() {
            if values.remove(name).is_some() {
                self.persist(&values);
            }
        }
    }
}

fn load(path: &Path) -> HashMap<String, String> {
    let Ok(raw) = fs::read(path) else {
        return HashMap::new();
    };

    serde_json::from_slice(&raw).unwrap_or_else(|err| {
        warn!(path = %path.display(), "Ignoring unreadable token store: {err}");
        HashMap::new()
    })
}

fn write_file(path: &Path, values: &HashMap<String, String>) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let payload = serde_json::to_vec_pretty(values)?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(&payload)?;
    file.sync_all()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::token::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

    #[test]
    fn memory_store_absent_key_is_none() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
        store.remove(ACCESS_TOKEN_KEY);
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
    }

    #[test]
    fn memory_store_set_overwrites() {
        let store = MemoryTokenStore::new();
        store.set(ACCESS_TOKEN_KEY, "A");
        store.set(ACCESS_TOKEN_KEY, "B");
        assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("B"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.json");

        let store = FileTokenStore::open(&path);
        store.set(ACCESS_TOKEN_KEY, "A");
        store.set(REFRESH_TOKEN_KEY, "R");
        drop(store);

        let reopened = FileTokenStore::open(&path);
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY).as_deref(), Some("A"));
        assert_eq!(reopened.get(REFRESH_TOKEN_KEY).as_deref(), Some("R"));

        reopened.remove(ACCESS_TOKEN_KEY);
        let again = FileTokenStore::open(&path);
        assert_eq!(again.get(ACCESS_TOKEN_KEY), None);
        assert_eq!(again.get(REFRESH_TOKEN_KEY).as_deref(), Some("R"));
    }

    #[test]
    fn file_store_ignores_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, b"not json").unwrap();

        let store = FileTokenStore::open(&path);
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let store = FileTokenStore::open(&path);
        store.set(ACCESS_TOKEN_KEY, "A");

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
