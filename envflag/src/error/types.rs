//! Primary error enums for binding and flag parsing.

use thiserror::Error;

use super::BoxError;
use crate::ClapRegistryError;

/// Errors that can occur while applying the environment to a flag registry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnvFlagError {
    /// The registry already completed its argument-parsing pass.
    ///
    /// Injecting afterwards would overwrite explicit command-line choices, so
    /// the startup sequence must be reordered.
    #[error("flags have already been parsed; apply the environment before parsing arguments")]
    AlreadyParsed,

    /// The registry rejected an environment value for a matched flag.
    ///
    /// Flags handled earlier in the same pass keep their new values.
    #[error("failed to set flag '{flag}' to {value:?} from the environment: {source}")]
    SetFailed {
        /// Name of the flag that rejected the value.
        flag: String,
        /// Raw environment value that was rejected.
        value: String,
        /// Error reported by the registry's setter.
        #[source]
        source: BoxError,
    },

    /// Argument parsing failed after the environment was applied.
    #[error("failed to parse command-line arguments: {source}")]
    Parse {
        /// Error reported by the registry's parser.
        #[source]
        source: BoxError,
    },

    /// Two environment names were mapped to the same flag.
    #[error("environment variables '{first}' and '{second}' both map to flag '{flag}'")]
    AmbiguousOverride {
        /// Flag targeted by both overrides.
        flag: String,
        /// Environment name that claimed the flag first.
        first: String,
        /// Environment name that collided with it.
        second: String,
    },
}

impl EnvFlagError {
    /// Name of the flag involved in the failure, when there is one.
    #[must_use]
    pub fn flag(&self) -> Option<&str> {
        match self {
            Self::SetFailed { flag, .. } | Self::AmbiguousOverride { flag, .. } => Some(flag),
            Self::AlreadyParsed | Self::Parse { .. } => None,
        }
    }

    /// Returns `true` when parsing stopped because the command line asked for
    /// help or version output rather than because it was invalid.
    #[must_use]
    pub fn is_display_request(&self) -> bool {
        let Self::Parse { source } = self else {
            return false;
        };
        if let Some(err) = source.downcast_ref::<FlagError>() {
            return err.is_help_request();
        }
        source
            .downcast_ref::<ClapRegistryError>()
            .is_some_and(ClapRegistryError::is_display_request)
    }

    pub(crate) fn set_failed<E>(flag: &str, value: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::SetFailed {
            flag: flag.to_owned(),
            value: value.to_owned(),
            source: Box::new(source),
        }
    }

    pub(crate) fn parse<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Parse {
            source: Box::new(source),
        }
    }
}

/// Errors raised by [`FlagSet`](crate::FlagSet).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlagError {
    /// An argument named a flag that was never defined.
    #[error("flag provided but not defined: -{name}")]
    Unknown {
        /// Name as written on the command line, without dashes.
        name: String,
    },

    /// A non-boolean flag appeared last with no value following it.
    #[error("flag needs an argument: -{name}")]
    MissingArgument {
        /// Flag that was missing its value.
        name: String,
    },

    /// An argument looked like a flag but could not be read as one.
    #[error("bad flag syntax: {arg}")]
    BadSyntax {
        /// Offending argument.
        arg: String,
    },

    /// A value could not be converted to the flag's type.
    #[error("invalid value {value:?} for flag -{name}: {source}")]
    InvalidValue {
        /// Flag receiving the value.
        name: String,
        /// Raw value that failed conversion.
        value: String,
        /// Conversion failure.
        #[source]
        source: BoxError,
    },

    /// A flag with the same name was already defined.
    #[error("flag redefined: {name}")]
    Redefined {
        /// Duplicate name.
        name: String,
    },

    /// `-h` or `-help` was given and no such flag is defined.
    #[error("help requested")]
    HelpRequested,
}

impl FlagError {
    /// Returns `true` when the error is a request for help output rather than
    /// a genuine failure.
    #[must_use]
    pub const fn is_help_request(&self) -> bool {
        matches!(self, Self::HelpRequested)
    }
}
