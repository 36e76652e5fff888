//! Use a [`clap::Command`] as the flag registry.
//!
//! Every argument with a long name is a flag named after it. Values injected
//! from the environment become the argument's `default_value`, so anything
//! given explicitly on the command line still wins. Rewritten usage becomes
//! the argument's help.
//!
//! The wrapped command is kept unbuilt. Changes are applied to a fresh clone
//! whenever the command is parsed, rendered or handed back, because clap
//! indexes arguments when a command is built.

use std::ffi::OsStr;

use clap::builder::{BoolishValueParser, TypedValueParser};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, CommandFactory, FromArgMatches, Id};
use thiserror::Error;

use super::{FlagMeta, FlagRegistry};

/// Errors raised by [`ClapRegistry`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClapRegistryError {
    /// No argument has this long name.
    #[error("flag provided but not defined: --{name}")]
    UnknownFlag {
        /// Requested flag name.
        name: String,
    },

    /// Parsed values were requested before the command line was parsed.
    #[error("command-line arguments have not been parsed yet")]
    NotParsed,

    /// Clap rejected a value or the command line.
    #[error(transparent)]
    Clap(#[from] Box<clap::Error>),
}

impl ClapRegistryError {
    /// Returns `true` when clap is asking to print help or version output
    /// rather than reporting a failure.
    ///
    /// Callers usually respond with [`clap::Error::exit`] to keep the zero
    /// exit status clap uses for these requests.
    #[must_use]
    pub fn is_display_request(&self) -> bool {
        matches!(
            self,
            Self::Clap(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
        )
    }
}

#[derive(Debug, Clone)]
struct ClapFlag {
    id: Id,
    action: ArgAction,
    required: bool,
    meta: FlagMeta,
    original_usage: String,
    original_long_usage: Option<String>,
    original_default: String,
    value: Option<String>,
}

impl ClapFlag {
    fn from_arg(arg: &Arg) -> Option<Self> {
        let long = arg.get_long()?;
        let action = arg.get_action();
        if matches!(
            action,
            ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version
        ) {
            return None;
        }
        let usage = arg.get_help().map(ToString::to_string).unwrap_or_default();
        let default = arg
            .get_default_values()
            .iter()
            .map(|value| value.to_string_lossy())
            .collect::<Vec<_>>()
            .join(",");
        Some(Self {
            id: arg.get_id().clone(),
            action: action.clone(),
            required: arg.is_required_set(),
            meta: FlagMeta::new(long, usage.clone(), default.clone()),
            original_usage: usage,
            original_long_usage: arg.get_long_help().map(ToString::to_string),
            original_default: default,
            value: None,
        })
    }

    fn takes_no_value(&self) -> bool {
        matches!(
            self.action,
            ArgAction::SetTrue | ArgAction::SetFalse | ArgAction::Count
        )
    }

    /// Whether the displayed default differs from the one clap would show.
    /// Switches never show a default.
    fn default_diverges(&self) -> bool {
        let visible_default = self.value.as_deref().unwrap_or(&self.original_default);
        !self.takes_no_value() && self.meta.default_display() != visible_default
    }

    /// `[default: X]` appended to the help text in place of clap's own.
    fn default_suffix(&self) -> Option<String> {
        let display = self.meta.default_display();
        (self.default_diverges() && !display.is_empty())
            .then(|| format!(" [default: {display}]"))
    }

    /// Long help with the same rewrite the short help received.
    fn long_help(&self, suffix: Option<&str>) -> Option<String> {
        let original = self.original_long_usage.as_deref()?;
        let mut long = match self.meta.usage().strip_suffix(self.original_usage.as_str()) {
            Some(prefix) => format!("{prefix}{original}"),
            None => self.meta.usage().to_owned(),
        };
        if let Some(text) = suffix {
            long.push_str(text);
        }
        (long != original).then_some(long)
    }

    fn apply(&self, arg: Arg) -> Arg {
        let mut out = arg;
        if let Some(value) = &self.value {
            // A value from the environment satisfies a required argument.
            out = out.default_value(value.clone());
            if self.required {
                out = out.required(false);
            }
        }
        if self.default_diverges() || (self.takes_no_value() && self.value.is_some()) {
            out = out.hide_default_value(true);
        }
        let suffix = self.default_suffix();
        if let Some(long) = self.long_help(suffix.as_deref()) {
            out = out.long_help(long);
        }
        let mut help = self.meta.usage().to_owned();
        if let Some(text) = &suffix {
            help.push_str(text);
        }
        if help != self.original_usage {
            out = out.help(help);
        }
        out
    }
}

/// Flag registry backed by a [`clap::Command`].
///
/// # Examples
///
/// ```rust
/// use clap::{Arg, Command};
/// use envflag::{ClapRegistry, EnvFlag, EnvSnapshot};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let command = Command::new("demo").arg(
///     Arg::new("port")
///         .long("database-master-port")
///         .value_parser(clap::value_parser!(u16))
///         .default_value("5432"),
/// );
/// let mut registry = ClapRegistry::new(command);
/// let env = EnvSnapshot::from_lines(["DATABASE_MASTER_PORT=3306"]);
/// EnvFlag::default().parse_with_env(&mut registry, &env, Vec::<String>::new())?;
///
/// let port = registry.matches().and_then(|m| m.get_one::<u16>("port").copied());
/// assert_eq!(port, Some(3306));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClapRegistry {
    command: Command,
    flags: Vec<ClapFlag>,
    parsed: bool,
    matches: Option<ArgMatches>,
}

impl ClapRegistry {
    /// Wrap `command`.
    #[must_use]
    pub fn new(command: Command) -> Self {
        let mut built = command.clone();
        built.build();
        let flags = built.get_arguments().filter_map(ClapFlag::from_arg).collect();
        Self {
            command,
            flags,
            parsed: false,
            matches: None,
        }
    }

    /// Wrap the command generated for a `clap::Parser` type.
    #[must_use]
    pub fn for_parser<P: CommandFactory>() -> Self {
        Self::new(P::command())
    }

    /// Matches produced by the last successful parse.
    #[must_use]
    pub const fn matches(&self) -> Option<&ArgMatches> {
        self.matches.as_ref()
    }

    /// Build a typed value from the parsed matches.
    ///
    /// # Errors
    ///
    /// Returns [`ClapRegistryError::NotParsed`] before parsing, or the clap
    /// error raised while extracting `P`.
    pub fn extract<P: FromArgMatches>(&self) -> Result<P, ClapRegistryError> {
        let matches = self.matches.as_ref().ok_or(ClapRegistryError::NotParsed)?;
        P::from_arg_matches(matches).map_err(|err| ClapRegistryError::Clap(Box::new(err)))
    }

    /// Value injected into flag `name`, if any.
    #[must_use]
    pub fn injected(&self, name: &str) -> Option<&str> {
        self.find(name)?.value.as_deref()
    }

    /// Presentation data of flag `name`.
    #[must_use]
    pub fn meta(&self, name: &str) -> Option<&FlagMeta> {
        self.find(name).map(|flag| &flag.meta)
    }

    /// The wrapped command with injected defaults and rewritten help applied.
    #[must_use]
    pub fn to_command(&self) -> Command {
        self.flags
            .iter()
            .fold(self.command.clone(), |command, flag| {
                command.mut_arg(flag.id.as_str(), |arg| flag.apply(arg))
            })
    }

    /// Consume the registry, returning [`to_command`](Self::to_command).
    #[must_use]
    pub fn into_command(self) -> Command {
        self.to_command()
    }

    /// Render `--help` output for the current state.
    #[must_use]
    pub fn render_help(&self) -> String {
        self.to_command().render_help().to_string()
    }

    /// Render `--help` output for the current state using long help text.
    #[must_use]
    pub fn render_long_help(&self) -> String {
        self.to_command().render_long_help().to_string()
    }

    fn find(&self, name: &str) -> Option<&ClapFlag> {
        self.flags.iter().find(|flag| flag.meta.name() == name)
    }

    fn argv<I>(&self, args: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut argv = Vec::new();
        if !self.command.is_no_binary_name_set() {
            argv.push(self.command.get_name().to_owned());
        }
        argv.extend(args);
        argv
    }

    /// Check `value` against the argument's parser without touching the
    /// registry, returning the text to store as the default.
    fn validate(&self, flag: &ClapFlag, value: &str) -> Result<String, ClapRegistryError> {
        match flag.action {
            ArgAction::SetTrue | ArgAction::SetFalse => BoolishValueParser::new()
                .parse_ref(&self.command, None, OsStr::new(value))
                .map(|parsed| parsed.to_string())
                .map_err(|err| ClapRegistryError::Clap(Box::new(err))),
            ArgAction::Count => value
                .parse::<u8>()
                .map(|count| count.to_string())
                .map_err(|err| {
                    let message = format!(
                        "invalid value '{value}' for '--{}': {err}",
                        flag.meta.name()
                    );
                    ClapRegistryError::Clap(Box::new(clap::Error::raw(
                        ErrorKind::InvalidValue,
                        message,
                    )))
                }),
            _ => self.check_value(flag, value).map(|()| value.to_owned()),
        }
    }

    /// Parse `--name=value` against a relaxed copy of the command so only the
    /// value itself can fail.
    fn check_value(&self, flag: &ClapFlag, value: &str) -> Result<(), ClapRegistryError> {
        let mut relaxed_command = self
            .command
            .get_arguments()
            .fold(self.command.clone(), |command, arg| {
                command.mut_arg(arg.get_id().as_str(), |relaxed| relaxed.required(false))
            })
            .subcommand_required(false)
            .arg_required_else_help(false);
        let argv = self.argv([format!("--{}={value}", flag.meta.name())]);
        match relaxed_command.try_get_matches_from_mut(argv) {
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::InvalidValue | ErrorKind::ValueValidation | ErrorKind::InvalidUtf8
                ) =>
            {
                Err(ClapRegistryError::Clap(Box::new(err)))
            }
            Ok(_) | Err(_) => Ok(()),
        }
    }
}

impl FlagRegistry for ClapRegistry {
    type Error = ClapRegistryError;

    fn parsed(&self) -> bool {
        self.parsed
    }

    fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    fn lookup(&mut self, name: &str) -> Option<&mut FlagMeta> {
        self.flags
            .iter_mut()
            .find(|flag| flag.meta.name() == name)
            .map(|flag| &mut flag.meta)
    }

    fn visit_all(&mut self, visit: &mut dyn FnMut(&mut FlagMeta)) {
        for flag in &mut self.flags {
            visit(&mut flag.meta);
        }
    }

    fn set(&mut self, name: &str, value: &str) -> Result<(), ClapRegistryError> {
        let flag = self.find(name).ok_or_else(|| ClapRegistryError::UnknownFlag {
            name: name.to_owned(),
        })?;
        let stored = self.validate(flag, value)?;
        if let Some(target) = self.flags.iter_mut().find(|flag| flag.meta.name() == name) {
            target.value = Some(stored);
        }
        Ok(())
    }

    fn parse_args(&mut self, args: Vec<String>) -> Result<(), ClapRegistryError> {
        self.parsed = true;
        let argv = self.argv(args);
        let matches = self
            .to_command()
            .try_get_matches_from_mut(argv)
            .map_err(Box::new)?;
        self.matches = Some(matches);
        Ok(())
    }
}
