//! # serde_delimited
//!
//! A Serde-compatible format that stores fixed-schema records as delimited text, one
//! record per line.
//!
//! ## The Format
//!
//! ```text
//! 23|45.8|prueba
//! 30|70.965|test con espacios
//! ```
//!
//! - One record per line, terminated by `\n`
//! - Fields joined by a single delimiter character, `|` by default
//! - No header, no record count, no quoting or escaping
//!
//! The shape of a record (field count, order and types) is its Rust type, so it is
//! fixed at compile time and identical for every line of a file.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_delimited::{from_str, to_string, BoundedString};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Sample {
//!     dato1: i32,
//!     dato2: f32,
//!     cadena: BoundedString<20>,
//! }
//!
//! let sample = Sample { dato1: 23, dato2: 45.8, cadena: BoundedString::new("prueba") };
//!
//! let line = to_string(&sample).unwrap();
//! assert_eq!(line, "23|45.8|prueba\n");
//!
//! let back: Sample = from_str(&line).unwrap();
//! assert_eq!(sample, back);
//! ```
//!
//! ## Reading a File Back
//!
//! [`RecordReader`] stops cleanly at the end of the stream; [`Error::EndOfInput`] is
//! the signal, not a failure:
//!
//! ```rust
//! use serde_delimited::RecordReader;
//!
//! let data = "1|uno\n2|dos\n";
//! let mut reader: RecordReader<_, (u32, String)> = RecordReader::new(data.as_bytes());
//! while let Some(record) = reader.next() {
//!     let (id, name) = record.unwrap();
//!     assert!(id > 0 && !name.is_empty());
//! }
//! ```
//!
//! ## Limits
//!
//! There is no escaping: a string field containing the delimiter or a line break
//! corrupts the field boundaries of its line. The encoder logs a warning through
//! `tracing` when it writes such a value, but writes it unchanged.
//!
//! Strings stored in a [`BoundedString`] are truncated to their capacity. Truncation
//! is reported by [`BoundedString::was_truncated`] and logged.

pub mod bounded;
pub mod de;
pub mod error;
pub mod field;
pub mod io;
pub mod options;
pub mod schema;
pub mod ser;

pub use bounded::BoundedString;
pub use de::Deserializer;
pub use error::{Error, Result};
pub use field::FieldKind;
pub use io::{RecordReader, RecordWriter};
pub use options::{Delimiter, RecordOptions, LINE_TERMINATOR};
pub use schema::{schema, FieldSpec, Schema};
pub use ser::Serializer;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

/// Encode a record as one line, terminator included.
///
/// # Examples
///
/// ```rust
/// use serde_delimited::to_string;
///
/// assert_eq!(to_string(&(1, -2.5, "x y")).unwrap(), "1|-2.5|x y\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if the value is not a struct or tuple of scalar fields.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, RecordOptions::default())
}

/// Encode a record as one line with custom options.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if the value is not a struct or tuple of scalar fields.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: RecordOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new(options);
    value.serialize(&mut serializer)?;
    Ok(serializer.into_inner())
}

/// Encode a record and write its line to `writer`.
///
/// The line is written with a single `write_all` once it is complete; the writer is
/// not flushed.
///
/// # Examples
///
/// ```rust
/// use serde_delimited::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &(23, 45.8f32, "prueba")).unwrap();
/// assert_eq!(buffer, b"23|45.8|prueba\n");
/// ```
///
/// # Errors
///
/// Returns an error if the record cannot be encoded or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, RecordOptions::default())
}

/// Encode a record and write its line to `writer` with custom options.
///
/// # Errors
///
/// Returns an error if the record cannot be encoded or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: RecordOptions) -> Result<()>
where
    W: Write,
    T: ?Sized + Serialize,
{
    let line = to_string_with_options(value, options)?;
    writer.write_all(line.as_bytes())?;
    Ok(())
}

/// Decode a record from a string holding exactly one line.
///
/// # Examples
///
/// ```rust
/// use serde_delimited::from_str;
///
/// let (id, name): (u32, String) = from_str("30|test con espacios\n").unwrap();
/// assert_eq!(id, 30);
/// assert_eq!(name, "test con espacios");
/// ```
///
/// # Errors
///
/// Returns [`Error::EndOfInput`] for an empty string, [`Error::TruncatedRecord`] if
/// the line is incomplete, [`Error::Parse`] if a field does not convert, and
/// [`Error::TrailingCharacters`] if anything follows the line terminator.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'a, T>(s: &'a str) -> Result<T>
where
    T: Deserialize<'a>,
{
    from_str_with_options(s, RecordOptions::default())
}

/// Decode a record from a string holding exactly one line, with custom options.
///
/// # Errors
///
/// See [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<'a, T>(s: &'a str, options: RecordOptions) -> Result<T>
where
    T: Deserialize<'a>,
{
    if s.is_empty() {
        return Err(Error::EndOfInput);
    }
    let (line, rest) = match s.find(LINE_TERMINATOR) {
        Some(pos) => s.split_at(pos + LINE_TERMINATOR.len_utf8()),
        None => (s, ""),
    };

    let mut deserializer = Deserializer::from_line(line, options);
    let value = T::deserialize(&mut deserializer)?;
    if !rest.is_empty() {
        return Err(Error::TrailingCharacters);
    }
    Ok(value)
}

/// Read one line from `reader` and decode it as a record.
///
/// Consumes exactly one line, so calling it repeatedly on the same reader walks a
/// record file. See [`RecordReader`] for a typed loop.
///
/// # Examples
///
/// ```rust
/// use serde_delimited::{from_reader, Error};
///
/// let mut input = &b"23|45.8|prueba\n"[..];
/// let first: (i32, f32, String) = from_reader(&mut input).unwrap();
/// assert_eq!(first.0, 23);
///
/// let end = from_reader::<_, (i32, f32, String)>(&mut input).unwrap_err();
/// assert!(matches!(end, Error::EndOfInput));
/// ```
///
/// # Errors
///
/// Returns [`Error::EndOfInput`] if the stream is already exhausted, [`Error::Io`] if
/// reading fails, and the decode errors of [`from_str`] otherwise.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: BufRead,
    T: DeserializeOwned,
{
    from_reader_with_options(reader, RecordOptions::default())
}

/// Read one line from `reader` and decode it as a record, with custom options.
///
/// # Errors
///
/// See [`from_reader`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader_with_options<R, T>(mut reader: R, options: RecordOptions) -> Result<T>
where
    R: BufRead,
    T: DeserializeOwned,
{
    let mut buf = Vec::new();
    if !de::read_line(&mut reader, &mut buf)? {
        return Err(Error::EndOfInput);
    }
    de::from_line_bytes(&buf, &options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        dato1: i32,
        dato2: f32,
        cadena: BoundedString<20>,
    }

    #[test]
    fn test_serialize_deserialize_sample() {
        let sample = Sample {
            dato1: 30,
            dato2: 70.965,
            cadena: BoundedString::new("test con espacios"),
        };
        let line = to_string(&sample).unwrap();
        assert_eq!(line, "30|70.965|test con espacios\n");
        let back: Sample = from_str(&line).unwrap();
        assert_eq!(sample, back);
    }

    #[test]
    fn test_empty_input_is_end_of_input() {
        assert!(matches!(from_str::<Sample>(""), Err(Error::EndOfInput)));
        assert!(matches!(
            from_reader::<_, Sample>(&b""[..]),
            Err(Error::EndOfInput)
        ));
    }

    #[test]
    fn test_trailing_characters() {
        assert!(matches!(
            from_str::<Sample>("1|2|a\n3|4|b\n"),
            Err(Error::TrailingCharacters)
        ));
    }

    #[test]
    fn test_from_reader_consumes_one_line() {
        let mut input = &b"1|1.5|a\n2|2.5|b\n"[..];
        let first: Sample = from_reader(&mut input).unwrap();
        let second: Sample = from_reader(&mut input).unwrap();
        assert_eq!(first.dato1, 1);
        assert_eq!(second.cadena, "b");
        assert!(from_reader::<_, Sample>(&mut input).unwrap_err().is_eof());
    }

    #[test]
    fn test_float_precision_option() {
        let options = RecordOptions::new().with_float_precision(1);
        let line = to_string_with_options(&(30, 70.965f32), options.clone()).unwrap();
        assert_eq!(line, "30|71.0\n");
        let (_, value): (i32, f32) = from_str_with_options(&line, options).unwrap();
        assert_eq!(value, 71.0);
    }
}
