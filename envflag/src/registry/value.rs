//! Typed storage behind [`FlagSet`](crate::FlagSet) flags.

use std::any::Any;
use std::fmt::Debug;

use thiserror::Error;

/// A settable flag value.
///
/// Implemented for `String`, `bool` and the common integer and float types.
/// Implement it for your own type to give a flag custom parsing.
pub trait Value: Any + Debug {
    /// Replace the value by parsing `raw`.
    ///
    /// # Errors
    ///
    /// Returns the conversion failure when `raw` is not a valid value.
    fn set(&mut self, raw: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Current value rendered as text.
    fn display(&self) -> String;

    /// Short type name used in usage output; empty for booleans.
    fn type_name(&self) -> &'static str;

    /// Boolean flags may appear without a value on the command line.
    fn is_bool_flag(&self) -> bool {
        false
    }

    /// Whether defaults are quoted in usage output.
    fn quote_default(&self) -> bool {
        false
    }
}

#[derive(Debug, Error)]
#[error("expected one of 1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False")]
struct InvalidBool;

fn parse_bool(raw: &str) -> Result<bool, InvalidBool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(InvalidBool),
    }
}

impl Value for String {
    fn set(&mut self, raw: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        raw.clone_into(self);
        Ok(())
    }

    fn display(&self) -> String {
        self.clone()
    }

    fn type_name(&self) -> &'static str {
        "string"
    }

    fn quote_default(&self) -> bool {
        true
    }
}

impl Value for bool {
    fn set(&mut self, raw: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        *self = parse_bool(raw)?;
        Ok(())
    }

    fn display(&self) -> String {
        self.to_string()
    }

    fn type_name(&self) -> &'static str {
        ""
    }

    fn is_bool_flag(&self) -> bool {
        true
    }
}

macro_rules! parsed_value {
    ($($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl Value for $ty {
                fn set(&mut self, raw: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                    *self = raw.parse::<$ty>()?;
                    Ok(())
                }

                fn display(&self) -> String {
                    self.to_string()
                }

                fn type_name(&self) -> &'static str {
                    $name
                }
            }
        )+
    };
}

parsed_value!(
    i64 => "int",
    i32 => "int",
    u64 => "uint",
    u32 => "uint",
    u16 => "uint",
    usize => "uint",
    f64 => "float",
);
