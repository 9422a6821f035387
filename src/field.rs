//! Field conversion between typed values and their textual tokens.
//!
//! Every field of a record is written as one token and read back from one token.
//! Both directions live here so the encoder and decoder cannot drift apart:
//!
//! | Kind | Token |
//! |------|-------|
//! | integers | canonical decimal, optional leading `-` |
//! | floats | shortest round-trip decimal, or fixed decimals when configured |
//! | `bool` | `true` / `false` |
//! | `char` | the character itself |
//! | strings | the literal content, no quoting |

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Declared type of one record field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    Str,
    /// A [`BoundedString`](crate::BoundedString) holding at most `capacity - 1` characters.
    BoundedStr { capacity: usize },
}

impl FieldKind {
    /// Returns `true` for integer and float kinds.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        !matches!(
            self,
            FieldKind::Bool | FieldKind::Char | FieldKind::Str | FieldKind::BoundedStr { .. }
        )
    }

    /// Short lowercase name of the kind.
    ///
    /// Both string kinds are named `"string"`; the capacity of a bounded
    /// string only shows up through [`Display`](fmt::Display).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::I8 => "i8",
            FieldKind::I16 => "i16",
            FieldKind::I32 => "i32",
            FieldKind::I64 => "i64",
            FieldKind::U8 => "u8",
            FieldKind::U16 => "u16",
            FieldKind::U32 => "u32",
            FieldKind::U64 => "u64",
            FieldKind::F32 => "f32",
            FieldKind::F64 => "f64",
            FieldKind::Char => "char",
            FieldKind::Str | FieldKind::BoundedStr { .. } => "string",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::BoundedStr { capacity } => write!(f, "string({})", capacity),
            _ => f.write_str(self.as_str()),
        }
    }
}

/// Appends the token of a float field.
pub(crate) fn push_float<F: fmt::Display>(out: &mut String, value: F, precision: Option<usize>) {
    match precision {
        Some(precision) => out.push_str(&format!("{:.*}", precision, value)),
        None => out.push_str(&value.to_string()),
    }
}

/// Parses an integer token with a bounds-checked conversion to the declared width.
///
/// The token is ASCII digits with an optional leading `-`; a leading `+` is
/// rejected. Leading zeros and `-0` are accepted and read as their numeric value.
pub(crate) fn parse_int<T: FromStr>(field: usize, token: &str, kind: FieldKind) -> Result<T> {
    if token.starts_with('+') {
        return Err(Error::parse(field, token, kind));
    }
    token.parse().map_err(|_| Error::parse(field, token, kind))
}

/// Parses a float token as written by [`push_float`].
pub(crate) fn parse_float<T: FromStr>(field: usize, token: &str, kind: FieldKind) -> Result<T> {
    token.parse().map_err(|_| Error::parse(field, token, kind))
}

pub(crate) fn parse_bool(field: usize, token: &str) -> Result<bool> {
    match token {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::parse(field, token, FieldKind::Bool)),
    }
}

pub(crate) fn parse_char(field: usize, token: &str) -> Result<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(Error::parse(field, token, FieldKind::Char)),
    }
}
