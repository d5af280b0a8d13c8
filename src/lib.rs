//! License validation and export-quota core for BreakEven.
//!
//! BreakEven's calculators are free; Pro unlocks extra calculators and
//! unlimited exports. This crate holds the policy behind that gate:
//!
//! - [`LicenseValidator`] — key normalization, format checking, SHA-256
//!   hashing, and membership checks against a remote allow-list, with a
//!   fast cached verdict for immediate UI decisions and a slow
//!   authoritative one for everything else.
//! - [`AllowList`] — the remote hash set, fetched once per process and
//!   memoized.
//! - [`ExportQuotaTracker`] — the 5-per-calendar-month free-tier export
//!   counter, with implicit month rollover.
//! - [`ExportGate`] — the entry point export renderers call before
//!   producing output.
//!
//! The gating is a soft business rule, not a server-enforced security
//! boundary: every storage or network failure degrades to a conservative
//! default (no key, zero count, empty allow-list) instead of surfacing an
//! error, and an allow-list outage falls back to accepting format-valid
//! keys rather than locking out paying users.

pub mod allow_list;
pub mod export_gate;
pub mod export_quota;
pub mod global_opts;
pub mod key_store;
pub mod messages;
pub mod share;
pub mod storage;
pub mod validator;

pub use allow_list::AllowList;
pub use export_gate::{ExportGate, ExportOutcome};
pub use export_quota::{ExportQuotaTracker, FREE_EXPORT_LIMIT};
pub use global_opts::GlobalOpts;
pub use key_store::KeyStore;
pub use storage::{FileStore, Storage};
pub use validator::{LicenseValidator, ProStatusChanged};
