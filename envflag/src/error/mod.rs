//! Error types produced while binding the environment to flags.

mod types;

pub use types::{EnvFlagError, FlagError};

/// Boxed cause carried by error variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
