//! End-to-end gating flow through the public API: a fresh install burns
//! its free exports, activates a license, and exports without limits.

use std::sync::Arc;

use url::Url;

use breakeven_core::{
    AllowList, ExportGate, ExportQuotaTracker, FileStore, KeyStore, LicenseValidator,
    FREE_EXPORT_LIMIT,
};

// Nothing listens on the discard port, so allow-list fetches fail fast and
// validation runs in degraded (format-only) mode.
fn offline_allow_list() -> Arc<AllowList> {
    Arc::new(AllowList::new(
        Url::parse("http://127.0.0.1:9/license/allowlist.json").unwrap(),
    ))
}

#[tokio::test]
async fn free_tier_install_upgrades_to_pro() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::open(dir.path().join("store.json")));

    let validator = Arc::new(LicenseValidator::new(
        KeyStore::new(storage.clone()),
        offline_allow_list(),
    ));
    let quota = ExportQuotaTracker::new(storage.clone());
    let gate = ExportGate::new(validator.clone(), quota.clone());

    // Fresh install: not Pro, full quota available.
    assert!(!validator.is_valid_cached());
    assert_eq!(gate.remaining(), FREE_EXPORT_LIMIT);

    // Burn the free quota.
    for _ in 0..FREE_EXPORT_LIMIT {
        let outcome = gate.begin_export();
        assert!(outcome.success);
        assert!(outcome.should_show_pro_modal);
    }
    assert!(gate.begin_export().blocked);

    // Activate a license (degraded-mode acceptance while offline).
    validator.set_key(" be-abcd-1234 ");
    assert!(validator.is_valid(Some("be-abcd-1234")).await);
    assert!(validator.is_valid_cached());
    assert!(validator.is_pro().await);

    // Pro exports are no longer quota-bound.
    let outcome = gate.begin_export();
    assert!(outcome.success);
    assert!(!outcome.should_show_pro_modal);

    // The verdict survives a process restart (reopen from the same path).
    let storage = Arc::new(FileStore::open(dir.path().join("store.json")));
    let validator = Arc::new(LicenseValidator::new(
        KeyStore::new(storage),
        offline_allow_list(),
    ));
    assert!(validator.is_valid_cached());

    // Clearing drops Pro immediately.
    validator.clear_key().await;
    assert!(!validator.is_valid_cached());
}
