//! Error types for delimited record encoding and decoding.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: the underlying stream failed, surfaced verbatim
//! - **End of input**: no more records; the normal way a read loop stops
//! - **Truncated records**: the line ended before every field was read
//! - **Parse errors**: a field token could not be converted to its declared type
//! - **Shape errors**: the record type is not a flat tuple of scalar fields
//!
//! ## Examples
//!
//! ```rust
//! use serde_delimited::{from_str, Error};
//!
//! let result: Result<(i32, f32, String), Error> = from_str("abc|45.8|x\n");
//!
//! match result {
//!     Err(Error::Parse { field, token, .. }) => {
//!         assert_eq!(field, 0);
//!         assert_eq!(token, "abc");
//!     }
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use crate::field::FieldKind;
use std::{fmt, io};
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or decoding records.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The stream held no bytes before the first field of a record.
    ///
    /// This is the normal end of a record file, not a corruption.
    #[error("end of input")]
    EndOfInput,

    /// The line ended before field `field` of a record with `arity` fields could be read.
    #[error("truncated record: field {field} of {arity} is missing")]
    TruncatedRecord { field: usize, arity: usize },

    /// A field token could not be converted to its declared type.
    #[error("cannot parse field {field} as {expected}: {token:?}")]
    Parse {
        field: usize,
        token: String,
        expected: FieldKind,
    },

    /// The bytes of a line are not valid UTF-8.
    #[error("field {field} is not valid UTF-8")]
    InvalidUtf8 { field: usize },

    /// Input passed to [`from_str`](crate::from_str) continues past the first record.
    #[error("trailing characters after the record terminator")]
    TrailingCharacters,

    /// A strict bounded string construction received more characters than it can hold.
    #[error("string of {len} characters exceeds capacity {capacity} (at most {} characters)", .capacity.saturating_sub(1))]
    CapacityExceeded { capacity: usize, len: usize },

    /// The delimiter collides with the line terminator.
    #[error("invalid delimiter {0:?}: must not be a line terminator")]
    InvalidDelimiter(char),

    /// The record type is not a flat sequence of scalar fields.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a parse error for the token at `field`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_delimited::{Error, FieldKind};
    ///
    /// let err = Error::parse(2, "x1", FieldKind::I32);
    /// assert!(err.to_string().contains("field 2"));
    /// ```
    pub fn parse(field: usize, token: &str, expected: FieldKind) -> Self {
        Error::Parse {
            field,
            token: token.to_string(),
            expected,
        }
    }

    /// Creates a truncated record error.
    pub fn truncated(field: usize, arity: usize) -> Self {
        Error::TruncatedRecord { field, arity }
    }

    /// Creates an unsupported type error for shapes that do not fit on one line.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Returns `true` for the end-of-input condition that terminates a read loop.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_delimited::{from_reader, Error};
    ///
    /// let err = from_reader::<_, (i32, String)>(&b""[..]).unwrap_err();
    /// assert!(err.is_eof());
    /// ```
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::EndOfInput)
    }

    /// Index of the field the error refers to, when there is one.
    #[must_use]
    pub fn field(&self) -> Option<usize> {
        match self {
            Error::TruncatedRecord { field, .. }
            | Error::Parse { field, .. }
            | Error::InvalidUtf8 { field } => Some(*field),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
