//! Call-to-action messages shown when free-tier limits are hit.

pub const EXPORT_LIMIT_CTA: &str = "\
╔══════════════════════════════════════════════════════════════════╗
║ MONTHLY EXPORT LIMIT REACHED                                     ║
║                                                                  ║
║ You have used all 5 free exports for this month.                 ║
║ The counter resets at the start of the next calendar month.      ║
║                                                                  ║
║ For unlimited exports, go Pro:                                   ║
║ https://breakeven.app/pro                                        ║
╚══════════════════════════════════════════════════════════════════╝";
