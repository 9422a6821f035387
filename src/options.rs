//! Configuration options for the delimited record format.
//!
//! - [`RecordOptions`]: Main configuration struct
//! - [`Delimiter`]: The single character separating field tokens on a line
//!
//! ## Examples
//!
//! ```rust
//! use serde_delimited::{to_string_with_options, Delimiter, RecordOptions};
//!
//! let options = RecordOptions::new().with_delimiter(Delimiter::SEMICOLON);
//! let line = to_string_with_options(&(1, "one"), options).unwrap();
//! assert_eq!(line, "1;one\n");
//!
//! let options = RecordOptions::new().with_float_precision(2);
//! let line = to_string_with_options(&(1, 2.5f32), options).unwrap();
//! assert_eq!(line, "1|2.50\n");
//! ```

use crate::{Error, Result};
use std::fmt;

/// The line terminator written after every record.
pub const LINE_TERMINATOR: char = '\n';

/// Delimiter placed between the field tokens of one record.
///
/// Any character except a line terminator (`\n`, `\r`) is allowed. The format has no
/// escaping, so the delimiter should not occur inside string fields.
///
/// # Examples
///
/// ```rust
/// use serde_delimited::Delimiter;
///
/// assert_eq!(Delimiter::default(), Delimiter::PIPE);
/// assert_eq!(Delimiter::new(':').unwrap().as_char(), ':');
/// assert!(Delimiter::new('\n').is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Delimiter(char);

impl Delimiter {
    pub const PIPE: Delimiter = Delimiter('|');
    pub const COMMA: Delimiter = Delimiter(',');
    pub const TAB: Delimiter = Delimiter('\t');
    pub const SEMICOLON: Delimiter = Delimiter(';');

    /// Creates a delimiter, rejecting line terminator characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDelimiter`] for `\n` and `\r`.
    pub fn new(ch: char) -> Result<Self> {
        match ch {
            '\n' | '\r' => Err(Error::InvalidDelimiter(ch)),
            _ => Ok(Delimiter(ch)),
        }
    }

    #[must_use]
    pub const fn as_char(&self) -> char {
        self.0
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Delimiter::PIPE
    }
}

impl TryFrom<char> for Delimiter {
    type Error = Error;

    fn try_from(ch: char) -> Result<Self> {
        Delimiter::new(ch)
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration options for encoding and decoding records.
///
/// The same options must be used to read a file as were used to write it.
///
/// # Examples
///
/// ```rust
/// use serde_delimited::{Delimiter, RecordOptions};
///
/// let options = RecordOptions::new()
///     .with_delimiter(Delimiter::TAB)
///     .with_float_precision(3);
/// assert_eq!(options.delimiter, Delimiter::TAB);
/// assert_eq!(options.float_precision, Some(3));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordOptions {
    pub delimiter: Delimiter,
    /// Fixed number of decimals for float fields.
    ///
    /// `None` renders the shortest text that parses back to the same value.
    pub float_precision: Option<usize>,
}

impl RecordOptions {
    /// Creates default options (`|` delimiter, shortest round-trip floats).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delimiter between field tokens.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Renders float fields with exactly `precision` decimals.
    ///
    /// This is lossy: decoding recovers the value only to that precision.
    #[must_use]
    pub fn with_float_precision(mut self, precision: usize) -> Self {
        self.float_precision = Some(precision);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_terminators() {
        assert!(matches!(
            Delimiter::new('\r'),
            Err(Error::InvalidDelimiter('\r'))
        ));
        assert!(Delimiter::try_from('\n').is_err());
        assert_eq!(Delimiter::try_from(',').unwrap(), Delimiter::COMMA);
    }

    #[test]
    fn test_defaults() {
        let options = RecordOptions::new();
        assert_eq!(options.delimiter.as_char(), '|');
        assert_eq!(options.float_precision, None);
        assert_eq!(Delimiter::TAB.to_string(), "\t");
    }
}
