//! Helpers for running test bodies inside a `figment::Jail`.
//!
//! A jail restores every environment variable it sets once the closure
//! returns, which makes it a convenient sandbox for code that reads the
//! process environment directly.

use anyhow::{Result, anyhow};

/// Executes `f` inside a [`figment::Jail`] and returns the closure's output.
///
/// The jail is torn down when the closure completes, including on error.
///
/// # Errors
///
/// Returns an error if the jail cannot be created or the closure fails.
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|jail| {
        output = Some(f(jail)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Converts any displayable error into a [`figment::Error`] so it can leave a
/// [`with_jail`] closure through `?`.
#[expect(
    clippy::needless_pass_by_value,
    reason = "used as a map_err adapter, which hands over ownership"
)]
pub fn figment_error<E: ToString>(err: E) -> figment::Error {
    figment::Error::from(err.to_string())
}
