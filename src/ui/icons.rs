//! Terminal emoji used by the CLI commands.
//!
//! Each constant falls back to a plain-text marker on terminals without
//! emoji support.

use console::Emoji;

use crate::parser::Severity;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[WARN]");

// Health levels
pub static HEALTHY: Emoji<'_, '_> = Emoji("🟢 ", "[OK]");
pub static DEGRADED: Emoji<'_, '_> = Emoji("🟡 ", "[DEGRADED]");
pub static CRITICAL: Emoji<'_, '_> = Emoji("🔴 ", "[CRITICAL]");

// Misc
pub static ROBOT: Emoji<'_, '_> = Emoji("🤖 ", "");
pub static GLOBE: Emoji<'_, '_> = Emoji("🌐 ", "");
pub static REFRESH: Emoji<'_, '_> = Emoji("🔄 ", "[REFRESH]");
pub static FILE: Emoji<'_, '_> = Emoji("📄 ", "");

pub fn severity(severity: Severity) -> &'static Emoji<'static, 'static> {
    match severity {
        Severity::Healthy => &HEALTHY,
        Severity::Degraded => &DEGRADED,
        Severity::Critical => &CRITICAL,
    }
}
