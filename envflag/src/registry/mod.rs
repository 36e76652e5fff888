//! Flag registries the binder writes into.
//!
//! A registry owns the declared flags. The binder only ever borrows it: it
//! checks which flags exist, rewrites usage text and default displays through
//! [`FlagMeta`], sets values
//! through [`FlagRegistry::set`] and finally asks it to parse the command
//! line.

mod clap_command;
mod flag_set;
mod value;

pub use clap_command::{ClapRegistry, ClapRegistryError};
pub use flag_set::FlagSet;
pub use value::Value;

/// Presentation data of a declared flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagMeta {
    name: String,
    usage: String,
    default_display: String,
}

impl FlagMeta {
    /// Describe a flag.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        usage: impl Into<String>,
        default_display: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            usage: usage.into(),
            default_display: default_display.into(),
        }
    }

    /// Flag name without leading dashes.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help text.
    #[must_use]
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Replace the help text.
    pub fn set_usage(&mut self, usage: impl Into<String>) {
        self.usage = usage.into();
    }

    /// Default value as shown in help output.
    #[must_use]
    pub fn default_display(&self) -> &str {
        &self.default_display
    }

    /// Replace the displayed default without touching the stored value.
    pub fn set_default_display(&mut self, display: impl Into<String>) {
        self.default_display = display.into();
    }
}

/// Capabilities the binder needs from a flag registry.
pub trait FlagRegistry {
    /// Failure reported by [`set`](Self::set) and
    /// [`parse_args`](Self::parse_args).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether the final argument-parsing pass has already run.
    fn parsed(&self) -> bool;

    /// Whether a flag named `name` is declared.
    fn contains(&self, name: &str) -> bool;

    /// Find a declared flag by name.
    fn lookup(&mut self, name: &str) -> Option<&mut FlagMeta>;

    /// Visit every declared flag.
    fn visit_all(&mut self, visit: &mut dyn FnMut(&mut FlagMeta));

    /// Store `value` in flag `name` using the flag's typed conversion.
    ///
    /// # Errors
    ///
    /// Returns an error when the flag is unknown or the value is rejected.
    fn set(&mut self, name: &str, value: &str) -> Result<(), Self::Error>;

    /// Parse command-line arguments (without the program name), overriding
    /// any values set so far.
    ///
    /// # Errors
    ///
    /// Returns an error when the arguments are invalid.
    fn parse_args(&mut self, args: Vec<String>) -> Result<(), Self::Error>;
}

impl<R> FlagRegistry for &mut R
where
    R: FlagRegistry + ?Sized,
{
    type Error = R::Error;

    fn parsed(&self) -> bool {
        (**self).parsed()
    }

    fn contains(&self, name: &str) -> bool {
        (**self).contains(name)
    }

    fn lookup(&mut self, name: &str) -> Option<&mut FlagMeta> {
        (**self).lookup(name)
    }

    fn visit_all(&mut self, visit: &mut dyn FnMut(&mut FlagMeta)) {
        (**self).visit_all(visit);
    }

    fn set(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set(name, value)
    }

    fn parse_args(&mut self, args: Vec<String>) -> Result<(), Self::Error> {
        (**self).parse_args(args)
    }
}
