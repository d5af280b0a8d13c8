use std::sync::Arc;

use tracing::{debug, info};

use crate::export_quota::ExportQuotaTracker;
use crate::validator::LicenseValidator;

/// Outcome of one export attempt, as reported back to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOutcome {
    /// The renderer may produce output.
    pub success: bool,
    /// Show the upgrade nudge after a successful free-tier export.
    pub should_show_pro_modal: bool,
    /// The attempt was refused because the monthly quota is exhausted.
    pub blocked: bool,
}

impl ExportOutcome {
    fn blocked() -> Self {
        Self {
            success: false,
            should_show_pro_modal: false,
            blocked: true,
        }
    }

    fn allowed(is_pro: bool) -> Self {
        Self {
            success: true,
            should_show_pro_modal: !is_pro,
            blocked: false,
        }
    }
}

/// Gatekeeper the export renderers (PNG/PDF, external) call before
/// producing output.
///
/// Pro installations bypass the quota entirely; free-tier exports are
/// counted against the monthly cap, with the quota charged up front —
/// once per allowed attempt, never for a blocked one.
pub struct ExportGate {
    validator: Arc<LicenseValidator>,
    quota: ExportQuotaTracker,
}

impl ExportGate {
    pub fn new(validator: Arc<LicenseValidator>, quota: ExportQuotaTracker) -> Self {
        Self { validator, quota }
    }

    /// Decide whether one export may proceed, charging the quota if so.
    ///
    /// Uses the synchronous cached Pro verdict, matching the UI flow: an
    /// export button click cannot wait on a network round trip.
    pub fn begin_export(&self) -> ExportOutcome {
        if self.validator.is_pro_cached() {
            debug!("Pro installation, export quota not charged");
            return ExportOutcome::allowed(true);
        }

        if self.quota.has_reached_limit() {
            info!(
                limit = crate::export_quota::FREE_EXPORT_LIMIT,
                "Monthly export limit reached, blocking export"
            );
            return ExportOutcome::blocked();
        }

        self.quota.record_export();
        ExportOutcome::allowed(false)
    }

    pub fn remaining(&self) -> u32 {
        self.quota.remaining()
    }
}
