use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use url::Url;

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// License allow-list endpoint
    ///
    /// A GET-only static JSON document of shape `{"hashes": [..]}`, where
    /// each entry is the lowercase-hex SHA-256 digest of a normalized
    /// valid license key.
    #[arg(
        long,
        env = "BREAKEVEN_ALLOWLIST_ENDPOINT",
        default_value = "https://breakeven.app/license/allowlist.json"
    )]
    pub allowlist_endpoint: Url,

    /// Data directory for the local store
    ///
    /// Defaults to `breakeven/` under the platform's local data directory.
    #[arg(long, env = "BREAKEVEN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Force Pro features on, bypassing license validation
    ///
    /// Used for preview and demo deployments.
    #[arg(long, env = "BREAKEVEN_PRO_ENABLED", default_value_t = false)]
    pub pro_enabled: bool,
}

impl GlobalOpts {
    /// Path of the backing store file.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        let data_dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .context("Could not determine the local data directory; pass --data-dir")?
                .join("breakeven"),
        };

        Ok(data_dir.join("store.json"))
    }
}
