use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::allow_list::AllowList;
use crate::key_store::KeyStore;

/// Fired whenever the Pro verdict may have changed (key stored, key
/// cleared, or a validation succeeded). Carries no payload; subscribers
/// re-query the validator.
#[derive(Debug, Clone, Copy)]
pub struct ProStatusChanged;

/// The authoritative policy for "is this installation Pro".
///
/// Validity is a two-tier cache: [`is_valid_cached`](Self::is_valid_cached)
/// is the fast, possibly-stale local verdict, and
/// [`is_valid`](Self::is_valid) is the slow, authoritative check against
/// the remote allow-list. A cached true is trusted without re-verification
/// until the key is cleared; a cached false always triggers a real check.
pub struct LicenseValidator {
    key_store: KeyStore,
    allow_list: Arc<AllowList>,
    force_pro: bool,
    status_tx: broadcast::Sender<ProStatusChanged>,
}

impl LicenseValidator {
    pub fn new(key_store: KeyStore, allow_list: Arc<AllowList>) -> Self {
        let (status_tx, _) = broadcast::channel(16);

        Self {
            key_store,
            allow_list,
            force_pro: false,
            status_tx,
        }
    }

    /// Force the Pro verdict on regardless of any stored key.
    ///
    /// Used for preview/demo deployments; wired from `BREAKEVEN_PRO_ENABLED`.
    pub fn with_force_pro(mut self, force_pro: bool) -> Self {
        self.force_pro = force_pro;
        self
    }

    /// Subscribe to Pro status changes. Fire-and-forget on the publishing
    /// side: events sent with no live subscribers are dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<ProStatusChanged> {
        self.status_tx.subscribe()
    }

    fn notify(&self) {
        let _ = self.status_tx.send(ProStatusChanged);
    }

    /// Trim surrounding whitespace and uppercase the candidate.
    pub fn normalize(candidate: &str) -> String {
        candidate.trim().to_ascii_uppercase()
    }

    /// Whether a normalized candidate has the shape `BE-XXXX-XXXX`, with
    /// each `X` group exactly 4 ASCII alphanumerics.
    pub fn matches_format(normalized: &str) -> bool {
        let Some(groups) = normalized.strip_prefix("BE-") else {
            return false;
        };

        let groups = groups.split('-').collect::<Vec<_>>();

        let [first, second] = groups[..] else {
            return false;
        };

        [first, second].iter().all(|group| {
            group.len() == 4 && group.bytes().all(|byte| byte.is_ascii_alphanumeric())
        })
    }

    /// Lowercase-hex SHA-256 of the normalized key.
    ///
    /// Bit-exact contract with the allow-list generator: the remote
    /// document stores these digests, not plaintext keys.
    pub fn hash_key(normalized: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Normalize and store a candidate key.
    ///
    /// The stored key starts unverified even when it replaces a previously
    /// validated one; run [`is_valid`](Self::is_valid) to promote it.
    pub fn set_key(&self, candidate: &str) {
        self.key_store.set_key(&Self::normalize(candidate));
        self.notify();
    }

    /// Remove the stored key and cached verdict, and drop the memoized
    /// allow-list so the next validation re-fetches it.
    pub async fn clear_key(&self) {
        self.key_store.clear();
        self.allow_list.invalidate().await;
        self.notify();
    }

    /// Authoritative validity check for `candidate`, or for the stored key
    /// when `candidate` is `None`.
    ///
    /// Malformed input fails synchronously with no hashing or network
    /// access. When the allow-list cannot be fetched (or is empty), a
    /// format-valid key is provisionally accepted — the product favors not
    /// locking out paying users during an outage over strict enforcement.
    /// Anyone can satisfy the format without a real credential, so this is
    /// a known weak point of the trust model, preserved deliberately.
    ///
    /// A successful check persists the cached verdict and notifies
    /// subscribers.
    pub async fn is_valid(&self, candidate: Option<&str>) -> bool {
        let raw = match candidate {
            Some(candidate) => candidate.to_owned(),
            None => match self.key_store.key() {
                Some(key) => key,
                None => return false,
            },
        };

        let normalized = Self::normalize(&raw);

        if !Self::matches_format(&normalized) {
            debug!("License key rejected by format check");
            return false;
        }

        let hashes = self.allow_list.load().await;

        let valid = if hashes.is_empty() {
            warn!("License allow-list unavailable, accepting key on format alone");
            true
        } else {
            hashes.contains(&Self::hash_key(&normalized))
        };

        if valid {
            self.key_store.set_cached_validity(true);
            self.notify();
        }

        valid
    }

    /// The cached verdict only; never performs I/O. Used for immediate UI
    /// decisions while the async check is still in flight.
    pub fn is_valid_cached(&self) -> bool {
        self.key_store.cached_validity()
    }

    /// Synchronous Pro verdict: the override or the cached verdict.
    ///
    /// The no-I/O counterpart of [`is_pro`](Self::is_pro), for callers
    /// that cannot wait on the authoritative check (e.g. the export
    /// gate). Unlike [`is_valid_cached`](Self::is_valid_cached), this
    /// honors `force_pro`.
    pub fn is_pro_cached(&self) -> bool {
        self.force_pro || self.key_store.cached_validity()
    }

    /// The composite Pro verdict: cached true short-circuits, anything
    /// else runs the authoritative check.
    pub async fn is_pro(&self) -> bool {
        if self.force_pro {
            return true;
        }

        if self.is_valid_cached() {
            return true;
        }

        self.is_valid(None).await
    }
}
