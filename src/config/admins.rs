//! Admin configuration module for loading privileged Discord user ids from the environment.
//!
//! Admins may trigger the daily suggestion run from Discord. Everyone else relies on the
//! external scheduler invoking `wardrobe-buddy daily`.

/// Parses a comma-separated id list, ignoring blanks.
#[must_use]
pub fn parse_admin_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Reads `ADMIN_USER_IDS` (comma-separated Discord user ids).
///
/// # Returns
///
/// The configured ids, or an empty list when the variable is unset.
#[must_use]
pub fn get_admin_ids() -> Vec<String> {
    std::env::var("ADMIN_USER_IDS")
        .map(|raw| parse_admin_ids(&raw))
        .unwrap_or_default()
}
