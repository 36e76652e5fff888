//! A typed flag registry with `flag`-package command-line grammar.
//!
//! Flags are written `-name`, `--name`, `-name=value` or `-name value`.
//! Boolean flags never consume the following argument. Parsing stops at the
//! first non-flag argument or after `--`; whatever remains is available from
//! [`FlagSet::args`].

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};

use super::{FlagMeta, FlagRegistry, Value};
use crate::FlagError;

#[derive(Debug)]
struct Flag {
    meta: FlagMeta,
    value: Box<dyn Value>,
    zero_display: String,
}

impl Flag {
    fn default_suffix(&self) -> Option<String> {
        let display = self.meta.default_display();
        if display == self.zero_display {
            return None;
        }
        Some(if self.value.quote_default() {
            format!(" (default {display:?})")
        } else {
            format!(" (default {display})")
        })
    }
}

/// Named set of typed flags.
///
/// # Examples
///
/// ```rust
/// use envflag::{FlagRegistry, FlagSet};
///
/// # fn main() -> Result<(), envflag::FlagError> {
/// let mut flags = FlagSet::new("demo");
/// flags.bool("verbose", false, "Log more")?;
/// flags.uint("workers", 4, "Worker threads")?;
/// flags.parse_args(vec!["-verbose".into(), "--workers".into(), "8".into(), "run".into()])?;
///
/// assert_eq!(flags.get::<bool>("verbose"), Some(true));
/// assert_eq!(flags.get::<u64>("workers"), Some(8));
/// assert_eq!(flags.args(), ["run"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct FlagSet {
    name: String,
    flags: BTreeMap<String, Flag>,
    actual: BTreeSet<String>,
    args: Vec<String>,
    parsed: bool,
}

impl FlagSet {
    /// Create an empty set; `name` appears in the usage header.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Name given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a flag holding `default`.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::Redefined`] when `name` is already declared.
    pub fn define<V>(&mut self, name: &str, default: V, usage: &str) -> Result<(), FlagError>
    where
        V: Value + Default,
    {
        if self.flags.contains_key(name) {
            return Err(FlagError::Redefined {
                name: name.to_owned(),
            });
        }
        let flag = Flag {
            meta: FlagMeta::new(name, usage, default.display()),
            zero_display: V::default().display(),
            value: Box::new(default),
        };
        self.flags.insert(name.to_owned(), flag);
        Ok(())
    }

    /// Declare a string flag.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::Redefined`] when `name` is already declared.
    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> Result<(), FlagError> {
        self.define(name, default.to_owned(), usage)
    }

    /// Declare a signed integer flag.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::Redefined`] when `name` is already declared.
    pub fn int(&mut self, name: &str, default: i64, usage: &str) -> Result<(), FlagError> {
        self.define(name, default, usage)
    }

    /// Declare an unsigned integer flag.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::Redefined`] when `name` is already declared.
    pub fn uint(&mut self, name: &str, default: u64, usage: &str) -> Result<(), FlagError> {
        self.define(name, default, usage)
    }

    /// Declare a floating point flag.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::Redefined`] when `name` is already declared.
    pub fn float(&mut self, name: &str, default: f64, usage: &str) -> Result<(), FlagError> {
        self.define(name, default, usage)
    }

    /// Declare a boolean flag.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::Redefined`] when `name` is already declared.
    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> Result<(), FlagError> {
        self.define(name, default, usage)
    }

    /// Current value of flag `name` when it holds a `T`.
    #[must_use]
    pub fn get<T>(&self, name: &str) -> Option<T>
    where
        T: Value + Clone,
    {
        let value: &dyn Value = &*self.flags.get(name)?.value;
        let any: &dyn Any = value;
        any.downcast_ref::<T>().cloned()
    }

    /// Current value of flag `name` rendered as text.
    #[must_use]
    pub fn value_string(&self, name: &str) -> Option<String> {
        self.flags.get(name).map(|flag| flag.value.display())
    }

    /// Presentation data of flag `name`.
    #[must_use]
    pub fn meta(&self, name: &str) -> Option<&FlagMeta> {
        self.flags.get(name).map(|flag| &flag.meta)
    }

    /// Whether flag `name` was set by the environment or the command line.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.actual.contains(name)
    }

    /// Visit flags that have been set, in name order.
    pub fn visit_set(&self, mut visit: impl FnMut(&FlagMeta)) {
        self.flags
            .iter()
            .filter(|(name, _)| self.actual.contains(*name))
            .for_each(|(_, flag)| visit(&flag.meta));
    }

    /// Arguments left over after flag parsing.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Help text for every flag, one entry per flag in name order.
    #[must_use]
    pub fn defaults(&self) -> String {
        let mut out = String::new();
        for flag in self.flags.values() {
            let type_name = flag.value.type_name();
            let mut head = format!("  -{}", flag.meta.name());
            if !type_name.is_empty() {
                head.push(' ');
                head.push_str(type_name);
            }
            out.push_str(&head);
            // Short boolean flags keep their usage on the same line.
            out.push_str(if head.len() <= 4 { "\t" } else { "\n    \t" });
            out.push_str(&flag.meta.usage().replace('\n', "\n    \t"));
            if let Some(suffix) = flag.default_suffix() {
                out.push_str(&suffix);
            }
            out.push('\n');
        }
        out
    }

    /// Full usage message: a header followed by [`defaults`](Self::defaults).
    #[must_use]
    pub fn usage(&self) -> String {
        let header = if self.name.is_empty() {
            "Usage:\n".to_owned()
        } else {
            format!("Usage of {}:\n", self.name)
        };
        header + &self.defaults()
    }

    fn set_value(&mut self, name: &str, raw: &str) -> Result<(), FlagError> {
        let flag = self.flags.get_mut(name).ok_or_else(|| FlagError::Unknown {
            name: name.to_owned(),
        })?;
        flag.value
            .set(raw)
            .map_err(|source| FlagError::InvalidValue {
                name: name.to_owned(),
                value: raw.to_owned(),
                source,
            })?;
        self.actual.insert(name.to_owned());
        Ok(())
    }

    /// Whether declared flag `name` is boolean. An undeclared `h` or `help`
    /// is a help request, with or without an attached value.
    fn is_bool_flag(&self, name: &str) -> Result<bool, FlagError> {
        match self.flags.get(name) {
            Some(flag) => Ok(flag.value.is_bool_flag()),
            None if matches!(name, "h" | "help") => Err(FlagError::HelpRequested),
            None => Err(FlagError::Unknown {
                name: name.to_owned(),
            }),
        }
    }
}

/// Strip the dashes from a flag argument, or return `None` for a positional
/// argument.
fn flag_body(arg: &str) -> Result<Option<&str>, FlagError> {
    if arg.len() < 2 {
        return Ok(None);
    }
    let Some(single) = arg.strip_prefix('-') else {
        return Ok(None);
    };
    let body = single.strip_prefix('-').unwrap_or(single);
    if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
        return Err(FlagError::BadSyntax {
            arg: arg.to_owned(),
        });
    }
    Ok(Some(body))
}

impl FlagRegistry for FlagSet {
    type Error = FlagError;

    fn parsed(&self) -> bool {
        self.parsed
    }

    fn contains(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    fn lookup(&mut self, name: &str) -> Option<&mut FlagMeta> {
        self.flags.get_mut(name).map(|flag| &mut flag.meta)
    }

    fn visit_all(&mut self, visit: &mut dyn FnMut(&mut FlagMeta)) {
        for flag in self.flags.values_mut() {
            visit(&mut flag.meta);
        }
    }

    fn set(&mut self, name: &str, value: &str) -> Result<(), FlagError> {
        self.set_value(name, value)
    }

    fn parse_args(&mut self, args: Vec<String>) -> Result<(), FlagError> {
        self.parsed = true;
        self.args.clear();
        let mut rest = args.into_iter();
        while let Some(arg) = rest.next() {
            if arg == "--" {
                break;
            }
            let Some(body) = flag_body(&arg)? else {
                self.args.push(arg);
                break;
            };
            let (name, inline) = body
                .split_once('=')
                .map_or((body, None), |(name, value)| (name, Some(value)));
            let is_bool = self.is_bool_flag(name)?;
            let value = match inline {
                Some(value) => value.to_owned(),
                None if is_bool => "true".to_owned(),
                None => rest.next().ok_or_else(|| FlagError::MissingArgument {
                    name: name.to_owned(),
                })?,
            };
            self.set_value(name, &value)?;
        }
        self.args.extend(rest);
        Ok(())
    }
}
