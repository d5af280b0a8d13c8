use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct AllowListDocument {
    hashes: Vec<String>,
}

/// The remote set of valid license-key hashes, fetched once and memoized.
///
/// Construct one per process and share it by `Arc`; the cache lives for the
/// process lifetime unless explicitly invalidated. The mutex is held across
/// the fetch so concurrent `load` calls share a single in-flight request
/// instead of issuing duplicates.
#[derive(Debug)]
pub struct AllowList {
    endpoint: Url,
    cache: Mutex<Option<HashSet<String>>>,
}

impl AllowList {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            cache: Mutex::new(None),
        }
    }

    #[cfg(test)]
    pub(crate) fn preloaded(endpoint: Url, hashes: HashSet<String>) -> Self {
        Self {
            endpoint,
            cache: Mutex::new(Some(hashes)),
        }
    }

    /// The memoized hash set, fetching it on first need.
    ///
    /// A failed fetch (network error, non-2xx status, parse failure, or
    /// timeout) returns an empty set without memoizing it, so every later
    /// call retries — a transient outage must not permanently lock out
    /// valid keys. A successful fetch is cached even when the set is
    /// legitimately empty.
    pub async fn load(&self) -> HashSet<String> {
        let mut cache = self.cache.lock().await;

        if let Some(hashes) = cache.as_ref() {
            return hashes.clone();
        }

        match self.fetch().await {
            Ok(hashes) => {
                debug!(count = hashes.len(), "Loaded license allow-list");
                *cache = Some(hashes.clone());
                hashes
            }
            Err(err) => {
                warn!(endpoint = %self.endpoint, %err, "Failed to load license allow-list");
                HashSet::new()
            }
        }
    }

    async fn fetch(&self) -> anyhow::Result<HashSet<String>> {
        let response = timeout(FETCH_TIMEOUT, reqwest::get(self.endpoint.clone()))
            .await
            .map_err(|_| {
                anyhow::anyhow!("Allow-list fetch timed out after {FETCH_TIMEOUT:?}")
            })??
            .error_for_status()?;

        let document: AllowListDocument =
            timeout(FETCH_TIMEOUT, response.json()).await.map_err(|_| {
                anyhow::anyhow!("Allow-list response body timed out after {FETCH_TIMEOUT:?}")
            })??;

        Ok(document.hashes.into_iter().collect())
    }

    /// Forget the memoized set, forcing a re-fetch on next need.
    ///
    /// Called when a key is cleared, so a retry after a support interaction
    /// (e.g. a newly issued key) sees the current allow-list.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }
}
