//! Populate command-line flags from environment variables.
//!
//! `envflag` binds environment variables such as `DATABASE_MASTER_HOST` to
//! flags such as `--database-master-host`. Values found in the environment are
//! written into the flag registry first; the command line is parsed
//! afterwards against the same registry, so explicit arguments always win.
//!
//! The registry is anything implementing [`FlagRegistry`]. Two are provided:
//! [`FlagSet`], a small typed registry with `flag`-style parsing, and
//! [`ClapRegistry`], which lets a [`clap::Command`] take part.
//!
//! ```rust
//! use envflag::{EnvFlag, EnvSnapshot, FlagSet};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut flags = FlagSet::new("demo");
//! flags.string("database-master-host", "", "Database master host")?;
//! flags.int("database-master-port", -1, "Database master port")?;
//!
//! let env = EnvSnapshot::from_lines(["DATABASE_MASTER_PORT=3306"]);
//! EnvFlag::default().parse_with_env(&mut flags, &env, ["--database-master-host=db1"])?;
//!
//! assert_eq!(flags.get::<String>("database-master-host").as_deref(), Some("db1"));
//! assert_eq!(flags.get::<i64>("database-master-port"), Some(3306));
//! # Ok(())
//! # }
//! ```

mod binder;
mod env;
mod error;
pub mod naming;
mod options;
pub mod registry;

pub use binder::{Assignment, EnvFlag};
pub use env::{EnvEntry, EnvSnapshot};
pub use error::{EnvFlagError, FlagError};
pub use options::{DEFAULT_MIN_LENGTH, EnvFlagOptions, OverrideMap};
pub use registry::{ClapRegistry, ClapRegistryError, FlagMeta, FlagRegistry, FlagSet, Value};

/// Rewrites usage, injects the process environment and parses
/// `std::env::args_os().skip(1)` using [`EnvFlag::default`].
///
/// Arguments that are not valid UTF-8 are converted lossily.
///
/// # Errors
///
/// Returns [`EnvFlagError::AlreadyParsed`] when `registry` has already parsed
/// its arguments, [`EnvFlagError::SetFailed`] when an environment value is
/// rejected, or [`EnvFlagError::Parse`] when the command line is invalid.
pub fn parse<R>(registry: &mut R) -> Result<(), EnvFlagError>
where
    R: FlagRegistry + ?Sized,
{
    let args = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned());
    EnvFlag::default().parse(registry, args)
}

/// Rewrites usage and injects the process environment using
/// [`EnvFlag::default`] without parsing any arguments.
///
/// # Errors
///
/// Returns [`EnvFlagError::AlreadyParsed`] or [`EnvFlagError::SetFailed`].
pub fn process_flag_with_env<R>(registry: &mut R) -> Result<(), EnvFlagError>
where
    R: FlagRegistry + ?Sized,
{
    EnvFlag::default().process_flag_with_env(registry)
}
