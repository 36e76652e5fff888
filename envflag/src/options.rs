//! Binder configuration.
//!
//! [`EnvFlagOptions`] is plain data: build it with the `with_*` setters or
//! deserialise it from any serde source. Every field has a default, so a
//! partial document is enough.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::EnvFlagError;

/// Minimum name length used by [`EnvFlagOptions::default`].
pub const DEFAULT_MIN_LENGTH: usize = 3;

/// Explicit environment-name to flag-name overrides.
///
/// The map is injective: each flag can be claimed by at most one environment
/// variable, which keeps the name shown in usage text unambiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct OverrideMap {
    env_to_flag: BTreeMap<String, String>,
    flag_to_env: BTreeMap<String, String>,
}

impl OverrideMap {
    /// Create an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            env_to_flag: BTreeMap::new(),
            flag_to_env: BTreeMap::new(),
        }
    }

    /// Build a map from `(env, flag)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`EnvFlagError::AmbiguousOverride`] when two environment names
    /// target the same flag.
    pub fn try_from_iter<I, K, V>(pairs: I) -> Result<Self, EnvFlagError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (env, flag) in pairs {
            map.insert(env, flag)?;
        }
        Ok(map)
    }

    /// Map environment variable `env` to flag `flag`.
    ///
    /// Re-inserting an existing environment name replaces its target.
    ///
    /// # Errors
    ///
    /// Returns [`EnvFlagError::AmbiguousOverride`] when `flag` is already
    /// claimed by a different environment name.
    pub fn insert(
        &mut self,
        env: impl Into<String>,
        flag: impl Into<String>,
    ) -> Result<(), EnvFlagError> {
        let env_name = env.into();
        let flag_name = flag.into();
        if let Some(owner) = self.flag_to_env.get(&flag_name)
            && *owner != env_name
        {
            return Err(EnvFlagError::AmbiguousOverride {
                flag: flag_name,
                first: owner.clone(),
                second: env_name,
            });
        }
        if let Some(previous) = self.env_to_flag.insert(env_name.clone(), flag_name.clone()) {
            self.flag_to_env.remove(&previous);
        }
        self.flag_to_env.insert(flag_name, env_name);
        Ok(())
    }

    /// Flag targeted by environment variable `env`, if overridden.
    #[must_use]
    pub fn flag_for(&self, env: &str) -> Option<&str> {
        self.env_to_flag.get(env).map(String::as_str)
    }

    /// Environment variable that overrides `flag`, if any.
    #[must_use]
    pub fn env_for(&self, flag: &str) -> Option<&str> {
        self.flag_to_env.get(flag).map(String::as_str)
    }

    /// Iterate `(env, flag)` pairs in environment-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.env_to_flag
            .iter()
            .map(|(env, flag)| (env.as_str(), flag.as_str()))
    }

    /// Number of overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.env_to_flag.len()
    }

    /// Whether there are no overrides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.env_to_flag.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for OverrideMap {
    type Error = EnvFlagError;

    fn try_from(value: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        Self::try_from_iter(value)
    }
}

impl From<OverrideMap> for BTreeMap<String, String> {
    fn from(value: OverrideMap) -> Self {
        value.env_to_flag
    }
}

/// Settings for an [`EnvFlag`](crate::EnvFlag) binder.
///
/// # Examples
///
/// ```rust
/// use envflag::EnvFlagOptions;
///
/// # fn main() -> Result<(), envflag::EnvFlagError> {
/// let options = EnvFlagOptions::default()
///     .with_min_length(2)
///     .with_overrides([("MH", "database-master-host")])?
///     .with_show_env_val_in_usage(false);
/// assert_eq!(options.min_length(), 2);
/// assert_eq!(options.overrides().flag_for("MH"), Some("database-master-host"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvFlagOptions {
    min_length: usize,
    overrides: OverrideMap,
    show_env_key_in_usage: bool,
    show_env_val_in_usage: bool,
    debug: bool,
}

impl Default for EnvFlagOptions {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            overrides: OverrideMap::new(),
            show_env_key_in_usage: true,
            show_env_val_in_usage: true,
            debug: false,
        }
    }
}

impl EnvFlagOptions {
    /// Names (environment or flag) shorter than `min_length` characters are
    /// ignored. This keeps short aliases such as `-mh` out of the mapping.
    #[must_use]
    pub const fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Replace the override map with `(env, flag)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`EnvFlagError::AmbiguousOverride`] when two environment names
    /// target the same flag.
    pub fn with_overrides<I, K, V>(mut self, pairs: I) -> Result<Self, EnvFlagError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides = OverrideMap::try_from_iter(pairs)?;
        Ok(self)
    }

    /// Replace the override map.
    #[must_use]
    pub fn with_override_map(mut self, overrides: OverrideMap) -> Self {
        self.overrides = overrides;
        self
    }

    /// Prefix each flag's usage with `[ENV_NAME]`.
    #[must_use]
    pub const fn with_show_env_key_in_usage(mut self, show: bool) -> Self {
        self.show_env_key_in_usage = show;
        self
    }

    /// Show injected environment values as the flag's displayed default.
    #[must_use]
    pub const fn with_show_env_val_in_usage(mut self, show: bool) -> Self {
        self.show_env_val_in_usage = show;
        self
    }

    /// Trace every mapping decision through `tracing::debug!`.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Minimum name length.
    #[must_use]
    pub const fn min_length(&self) -> usize {
        self.min_length
    }

    /// Environment-name overrides.
    #[must_use]
    pub const fn overrides(&self) -> &OverrideMap {
        &self.overrides
    }

    /// Whether usage text is prefixed with the environment name.
    #[must_use]
    pub const fn show_env_key_in_usage(&self) -> bool {
        self.show_env_key_in_usage
    }

    /// Whether injected values replace the displayed default.
    #[must_use]
    pub const fn show_env_val_in_usage(&self) -> bool {
        self.show_env_val_in_usage
    }

    /// Whether mapping decisions are traced.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }
}
