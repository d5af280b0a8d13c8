use std::sync::Arc;

use crate::storage::Storage;

pub(crate) const LICENSE_KEY_ENTRY: &str = "breakeven_license_key";
pub(crate) const PRO_VALID_ENTRY: &str = "breakeven_pro_valid";

/// Persistence for the license key text and the cached validity verdict.
///
/// The cached verdict is a hint only: it can be stale relative to the
/// remote allow-list and is always reconcilable by an asynchronous
/// re-check through the validator.
#[derive(Clone)]
pub struct KeyStore {
    storage: Arc<dyn Storage>,
}

impl KeyStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The stored license key, or `None` if absent.
    pub fn key(&self) -> Option<String> {
        self.storage.get(LICENSE_KEY_ENTRY)
    }

    /// Persist a (pre-normalized) key and drop any stale cached verdict.
    ///
    /// A newly stored key is always unverified, even when it replaces a
    /// previously validated one.
    pub fn set_key(&self, key: &str) {
        self.storage.set(LICENSE_KEY_ENTRY, key);
        self.storage.set(PRO_VALID_ENTRY, "false");
    }

    /// Remove the key and the cached verdict together.
    ///
    /// Clearing one without the other would let a stale flag be read as
    /// describing no key at all.
    pub fn clear(&self) {
        self.storage.remove(LICENSE_KEY_ENTRY);
        self.storage.remove(PRO_VALID_ENTRY);
    }

    /// The cached validity verdict; absent or unreadable reads as false.
    pub fn cached_validity(&self) -> bool {
        self.storage
            .get(PRO_VALID_ENTRY)
            .is_some_and(|value| value == "true")
    }

    pub fn set_cached_validity(&self, valid: bool) {
        self.storage
            .set(PRO_VALID_ENTRY, if valid { "true" } else { "false" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStore;

    fn key_store(dir: &tempfile::TempDir) -> KeyStore {
        KeyStore::new(Arc::new(FileStore::open(dir.path().join("store.json"))))
    }

    #[test]
    fn fresh_store_has_no_key_and_no_validity() {
        let dir = tempfile::tempdir().unwrap();
        let store = key_store(&dir);

        assert_eq!(store.key(), None);
        assert!(!store.cached_validity());
    }

    #[test]
    fn set_key_resets_cached_validity() {
        let dir = tempfile::tempdir().unwrap();
        let store = key_store(&dir);

        store.set_key("BE-ABCD-1234");
        store.set_cached_validity(true);
        assert!(store.cached_validity());

        store.set_key("BE-WXYZ-9876");
        assert!(!store.cached_validity());
    }

    #[test]
    fn clear_removes_key_and_validity_together() {
        let dir = tempfile::tempdir().unwrap();
        let store = key_store(&dir);

        store.set_key("BE-ABCD-1234");
        store.set_cached_validity(true);

        store.clear();
        assert_eq!(store.key(), None);
        assert!(!store.cached_validity());
    }
}
