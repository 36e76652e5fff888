//! Conversions between environment variable names and flag names.
//!
//! The two directions are intended as inverses but are not exact ones: a flag
//! whose name contains a literal underscore maps to an environment name that
//! converts back with a hyphen in its place. Names restricted to ASCII
//! letters, digits and hyphens round-trip.

/// Convert `THIS_FORMAT` to `this-format`.
///
/// # Examples
///
/// ```rust
/// use envflag::naming::env_to_flag;
/// assert_eq!(env_to_flag("DATABASE_MASTER_HOST"), "database-master-host");
/// ```
#[must_use]
pub fn env_to_flag(name: &str) -> String {
    name.to_lowercase().replace('_', "-")
}

/// Convert `this-format` to `THIS_FORMAT`.
///
/// # Examples
///
/// ```rust
/// use envflag::naming::flag_to_env;
/// assert_eq!(flag_to_env("database-master-host"), "DATABASE_MASTER_HOST");
/// ```
#[must_use]
pub fn flag_to_env(name: &str) -> String {
    name.to_uppercase().replace('-', "_")
}

/// Number of characters in `name`, used for minimum length checks.
pub(crate) fn name_len(name: &str) -> usize {
    name.chars().count()
}

/// The bracketed prefix written in front of a flag's usage text.
pub(crate) fn usage_prefix(env_name: &str) -> String {
    format!("[{env_name}]")
}
