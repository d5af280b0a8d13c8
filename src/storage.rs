use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

/// String key-value storage with browser-`localStorage` semantics.
///
/// No operation surfaces an error: reads degrade to absent and write
/// failures are swallowed after logging. The gating built on top of this
/// store is a soft business rule, not a security boundary, so availability
/// wins over strictness.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// File-backed [`Storage`] persisting a flat JSON object.
///
/// The full map is held in memory and written through on every mutation.
/// The entries are a handful of short strings, so rewriting the file is
/// cheaper than anything smarter.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading any existing entries.
    ///
    /// A missing or unreadable file starts the store empty rather than
    /// failing; the original entries are not recoverable anyway.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn load(path: &Path) -> HashMap<String, String> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) => {
                debug!(path = %path.display(), %err, "No existing store file, starting empty");
                return HashMap::new();
            }
        };

        match serde_json::from_slice(&data) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %path.display(), %err, "Store file is corrupt, starting empty");
                HashMap::new()
            }
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(path = %parent.display(), %err, "Failed to create store directory");
                return;
            }
        }

        let data = match serde_json::to_vec_pretty(entries) {
            Ok(data) => data,
            Err(err) => {
                warn!(%err, "Failed to serialize store entries");
                return;
            }
        };

        if let Err(err) = fs::write(&self.path, data) {
            warn!(path = %self.path.display(), %err, "Failed to write store file");
        }
    }
}

impl Storage for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };

        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };

        entries.insert(key.to_owned(), value.to_owned());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };

        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open(&path);
        store.set("breakeven_license_key", "BE-ABCD-1234");
        drop(store);

        let store = FileStore::open(&path);
        assert_eq!(
            store.get("breakeven_license_key").as_deref(),
            Some("BE-ABCD-1234")
        );
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nonexistent.json"));

        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"not json {").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("anything"), None);

        // And the store stays writable afterwards.
        store.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn remove_deletes_the_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json"));

        store.set("k", "v");
        store.remove("k");
        assert_eq!(store.get("k"), None);
    }
}
