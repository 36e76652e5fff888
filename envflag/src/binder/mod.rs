//! The environment-to-flag binder.
//!
//! [`EnvFlag`] runs in three steps against a borrowed registry:
//!
//! 1. prefix each flag's usage with its environment name;
//! 2. walk the environment snapshot in order and set every flag whose
//!    environment variable is present;
//! 3. parse the command line, which overrides anything set in step 2.
//!
//! Step 2 is not atomic. When the registry rejects a value the pass stops,
//! and flags set earlier in the same pass keep their new values.

use tracing::debug;

use crate::naming::{env_to_flag, flag_to_env, name_len, usage_prefix};
use crate::{EnvFlagError, EnvFlagOptions, EnvSnapshot, FlagRegistry};

/// Emit a `debug` event only when the binder's debug option is on.
macro_rules! debug_if {
    ($binder:expr, $($arg:tt)+) => {
        if $binder.options.debug() {
            debug!($($arg)+);
        }
    };
}

/// One environment value resolved to a declared flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    env_key: String,
    flag: String,
    value: String,
}

impl Assignment {
    /// Environment variable the value came from.
    #[must_use]
    pub fn env_key(&self) -> &str {
        &self.env_key
    }

    /// Flag that receives the value.
    #[must_use]
    pub fn flag(&self) -> &str {
        &self.flag
    }

    /// Raw environment value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Applies environment variables to a [`FlagRegistry`].
///
/// `EnvFlag::default()` uses a minimum name length of 3, no overrides, and
/// shows both the environment name and the injected value in usage output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFlag {
    options: EnvFlagOptions,
}

impl EnvFlag {
    /// Create a binder with `options`.
    #[must_use]
    pub const fn new(options: EnvFlagOptions) -> Self {
        Self { options }
    }

    /// Settings in use.
    #[must_use]
    pub const fn options(&self) -> &EnvFlagOptions {
        &self.options
    }

    /// Flag name an environment variable applies to: its override if there
    /// is one, otherwise the converted name.
    #[must_use]
    pub fn flag_name_for(&self, env_key: &str) -> String {
        self.options
            .overrides()
            .flag_for(env_key)
            .map_or_else(|| env_to_flag(env_key), ToOwned::to_owned)
    }

    /// Environment name shown for a flag: the overriding variable if there is
    /// one, otherwise the converted name.
    #[must_use]
    pub fn env_name_for(&self, flag: &str) -> String {
        self.options
            .overrides()
            .env_for(flag)
            .map_or_else(|| flag_to_env(flag), ToOwned::to_owned)
    }

    /// Capture the process environment, reporting skipped entries when
    /// debugging is on.
    fn capture(&self) -> EnvSnapshot {
        EnvSnapshot::capture_with(|key| {
            debug_if!(self, env = %key, "skipping environment variable that is not UTF-8");
        })
    }

    /// Prefix the usage of every flag at least `min_length` long with
    /// `[ENV_NAME] `. Flags already carrying the prefix are left alone.
    pub fn rewrite_usage<R>(&self, registry: &mut R)
    where
        R: FlagRegistry + ?Sized,
    {
        let min_length = self.options.min_length();
        registry.visit_all(&mut |meta| {
            if name_len(meta.name()) < min_length {
                return;
            }
            let prefix = usage_prefix(&self.env_name_for(meta.name()));
            if meta.usage().starts_with(&prefix) {
                debug_if!(self, flag = meta.name(), "usage already carries the environment name");
                return;
            }
            let usage = format!("{prefix} {}", meta.usage());
            meta.set_usage(usage);
        });
    }

    /// Resolve the snapshot against the registry without changing anything.
    ///
    /// Entries with short names or without a matching flag are skipped.
    /// Assignments keep snapshot order.
    #[must_use]
    pub fn plan<R>(&self, registry: &R, env: &EnvSnapshot) -> Vec<Assignment>
    where
        R: FlagRegistry + ?Sized,
    {
        let min_length = self.options.min_length();
        env.iter()
            .filter_map(|entry| {
                let key = entry.key();
                if name_len(key) < min_length {
                    debug_if!(self, env = key, min_length, "environment name too short, skip");
                    return None;
                }
                let flag = self.flag_name_for(key);
                debug_if!(self, env = key, flag = %flag, "environment name converted");
                if !registry.contains(&flag) {
                    debug_if!(self, flag = %flag, "flag is not defined, skip");
                    return None;
                }
                Some(Assignment {
                    env_key: key.to_owned(),
                    flag,
                    value: entry.value().to_owned(),
                })
            })
            .collect()
    }

    /// Set every flag that has a matching environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`EnvFlagError::AlreadyParsed`] when the registry has parsed
    /// its arguments, or [`EnvFlagError::SetFailed`] for the first value the
    /// registry rejects. Flags set before the failure keep their values.
    pub fn inject<R>(&self, registry: &mut R, env: &EnvSnapshot) -> Result<(), EnvFlagError>
    where
        R: FlagRegistry + ?Sized,
    {
        if registry.parsed() {
            return Err(EnvFlagError::AlreadyParsed);
        }
        for assignment in self.plan(&*registry, env) {
            let Assignment { flag, value, .. } = &assignment;
            if self.options.show_env_val_in_usage()
                && let Some(meta) = registry.lookup(flag)
            {
                meta.set_default_display(value.as_str());
            }
            debug_if!(self, flag = %flag, value = %value, "set flag from environment");
            registry
                .set(flag, value)
                .map_err(|err| EnvFlagError::set_failed(flag, value, err))?;
        }
        Ok(())
    }

    /// Rewrite usage (when enabled) and inject the current process
    /// environment. Arguments are not parsed.
    ///
    /// # Errors
    ///
    /// See [`inject`](Self::inject).
    pub fn process_flag_with_env<R>(&self, registry: &mut R) -> Result<(), EnvFlagError>
    where
        R: FlagRegistry + ?Sized,
    {
        self.process_flag_with_env_from(registry, &self.capture())
    }

    /// Rewrite usage (when enabled) and inject `env`.
    ///
    /// # Errors
    ///
    /// See [`inject`](Self::inject).
    pub fn process_flag_with_env_from<R>(
        &self,
        registry: &mut R,
        env: &EnvSnapshot,
    ) -> Result<(), EnvFlagError>
    where
        R: FlagRegistry + ?Sized,
    {
        if registry.parsed() {
            return Err(EnvFlagError::AlreadyParsed);
        }
        if self.options.show_env_key_in_usage() {
            self.rewrite_usage(registry);
        }
        self.inject(registry, env)
    }

    /// Apply the current process environment, then parse `args` (without
    /// the program name) so explicit arguments take precedence.
    ///
    /// # Errors
    ///
    /// Returns the first failure: [`EnvFlagError::AlreadyParsed`],
    /// [`EnvFlagError::SetFailed`] or [`EnvFlagError::Parse`].
    pub fn parse<R, I, S>(&self, registry: &mut R, args: I) -> Result<(), EnvFlagError>
    where
        R: FlagRegistry + ?Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse_with_env(registry, &self.capture(), args)
    }

    /// Apply `env`, then parse `args`.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse).
    pub fn parse_with_env<R, I, S>(
        &self,
        registry: &mut R,
        env: &EnvSnapshot,
        args: I,
    ) -> Result<(), EnvFlagError>
    where
        R: FlagRegistry + ?Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.process_flag_with_env_from(registry, env)?;
        registry
            .parse_args(args.into_iter().map(Into::into).collect())
            .map_err(EnvFlagError::parse)
    }
}

#[cfg(test)]
mod tests;
