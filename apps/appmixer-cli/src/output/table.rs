//! Table display helpers for CLI commands

use crate::error::{CliError, CliResult};

/// Truncate a string for table display, handling Unicode safely.
///
/// If the string exceeds `max_len` characters, it is cut and "..." appended.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// A page size of zero would return nothing.
pub fn validate_limit(limit: u32) -> CliResult<()> {
    if limit == 0 {
        return Err(CliError::Validation(
            "Limit must be at least 1.".to_string(),
        ));
    }
    Ok(())
}

/// Comma-joined list, or "-" when empty.
pub fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(",")
    }
}
