use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::storage::Storage;

pub(crate) const EXPORT_COUNT_ENTRY: &str = "breakeven_export_count";
pub(crate) const EXPORT_MONTH_ENTRY: &str = "breakeven_export_month";

/// Free-tier exports allowed per calendar month.
pub const FREE_EXPORT_LIMIT: u32 = 5;

/// Rolling monthly counter of export actions.
///
/// The counter is scoped to the current calendar month (UTC): whenever the
/// stored month key differs from the current one, the record rolls over as
/// a side effect of the read or write that notices it. There is no upper
/// clamp on the stored count; only the limit comparison matters.
#[derive(Clone)]
pub struct ExportQuotaTracker {
    storage: Arc<dyn Storage>,
}

impl ExportQuotaTracker {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// The current calendar month as `YYYY-MM`, zero-padded.
    pub fn current_month_key() -> String {
        Utc::now().format("%Y-%m").to_string()
    }

    /// The export count for the current month.
    ///
    /// Resets the stored record when the month has rolled over. Absent or
    /// unparseable state reads as 0 — storage failures never block an
    /// export.
    pub fn count(&self) -> u32 {
        let current_month = Self::current_month_key();
        let stored_month = self.storage.get(EXPORT_MONTH_ENTRY);

        if stored_month.as_deref() != Some(current_month.as_str()) {
            debug!(
                old_month = stored_month.as_deref().unwrap_or("<none>"),
                new_month = %current_month,
                "Export quota month rolled over, resetting counter"
            );

            self.storage.set(EXPORT_COUNT_ENTRY, "0");
            self.storage.set(EXPORT_MONTH_ENTRY, &current_month);
            return 0;
        }

        self.storage
            .get(EXPORT_COUNT_ENTRY)
            .and_then(|count| count.parse().ok())
            .unwrap_or(0)
    }

    /// Count one export against the current month.
    ///
    /// On rollover the count is written as 1 directly, equivalent to
    /// reset-then-increment without the double read.
    pub fn record_export(&self) {
        let current_month = Self::current_month_key();
        let stored_month = self.storage.get(EXPORT_MONTH_ENTRY);

        if stored_month.as_deref() != Some(current_month.as_str()) {
            self.storage.set(EXPORT_COUNT_ENTRY, "1");
            self.storage.set(EXPORT_MONTH_ENTRY, &current_month);
            return;
        }

        let count = self.count();
        self.storage.set(EXPORT_COUNT_ENTRY, &(count + 1).to_string());
    }

    pub fn has_reached_limit(&self) -> bool {
        self.count() >= FREE_EXPORT_LIMIT
    }

    pub fn remaining(&self) -> u32 {
        FREE_EXPORT_LIMIT.saturating_sub(self.count())
    }
}
