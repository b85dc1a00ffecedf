//! Stable exit codes for keiji-seed CLI commands.

/// Every record was applied (or the command succeeded).
pub const OK: i32 = 0;
/// Fatal error before or during setup: tool not found, auth failed, bad config/manifest.
pub const FATAL: i32 = 1;
/// The run completed but at least one record failed or was skipped.
pub const PARTIAL: i32 = 2;
