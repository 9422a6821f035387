//! Record deserialization.
//!
//! This module provides the [`Deserializer`] that rebuilds one record from one line.
//!
//! ## Scanning
//!
//! Decoding a record with `N` fields walks a small state machine:
//!
//! - `Field(i)` for `i < N - 1`: the token is everything up to the next delimiter
//! - `Field(N - 1)`: the token is everything up to the line terminator, delimiters included
//! - `Done`: all fields were converted and the record is built
//!
//! Each token is converted to the declared type of its field as soon as it is cut,
//! so the first malformed field aborts the record. No partially built record is
//! ever returned.
//!
//! ## Usage
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_delimited::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Reading { sensor: u32, value: f64, label: String }
//!
//! let reading: Reading = from_str("7|-1.25|north wall\n").unwrap();
//! assert_eq!(reading, Reading { sensor: 7, value: -1.25, label: "north wall".to_string() });
//! ```

use crate::bounded::BOUNDED_STRING_TOKEN;
use crate::field::{self, FieldKind};
use crate::options::LINE_TERMINATOR;
use crate::schema::schema;
use crate::{Error, RecordOptions, Result};
use serde::de::{self, DeserializeOwned};
use std::io::BufRead;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Expect {
    Field(usize),
    Done,
}

/// The record deserializer.
///
/// Reads one line, terminator included. Created via [`Deserializer::from_line`].
pub struct Deserializer<'de> {
    rest: &'de str,
    options: RecordOptions,
    state: Expect,
    arity: usize,
}

impl<'de> Deserializer<'de> {
    /// Creates a deserializer over a single line.
    ///
    /// `line` must hold at most one line terminator, as its last character. A line
    /// without the terminator decodes as a truncated record.
    pub fn from_line(line: &'de str, options: RecordOptions) -> Self {
        Deserializer {
            rest: line,
            options,
            state: Expect::Field(0),
            arity: 0,
        }
    }

    /// Cuts the token of the field the scanner currently expects.
    fn next_token(&mut self) -> Result<(usize, &'de str)> {
        let index = match self.state {
            Expect::Field(index) => index,
            Expect::Done => {
                return Err(Error::custom("all record fields were already read"));
            }
        };

        let token = if index + 1 < self.arity {
            let delimiter = self.options.delimiter.as_char();
            match self.rest.find(delimiter) {
                Some(pos) => {
                    let token = &self.rest[..pos];
                    self.rest = &self.rest[pos + delimiter.len_utf8()..];
                    self.state = Expect::Field(index + 1);
                    token
                }
                None => return Err(Error::truncated(index + 1, self.arity)),
            }
        } else {
            match self.rest.strip_suffix(LINE_TERMINATOR) {
                Some(token) => {
                    self.rest = "";
                    self.state = Expect::Done;
                    token
                }
                None => return Err(Error::truncated(index, self.arity)),
            }
        };

        Ok((index, token))
    }

    fn record<V>(&mut self, name: &str, arity: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if arity == 0 {
            return Err(Error::unsupported_type(&format!(
                "record `{}` has no fields",
                name
            )));
        }
        if self.state != Expect::Field(0) || self.arity != 0 {
            return Err(Error::unsupported_type(&format!(
                "record `{}` is nested inside another record",
                name
            )));
        }
        self.arity = arity;

        let value = visitor.visit_seq(RecordAccess { de: self })?;
        if self.state != Expect::Done {
            return Err(Error::custom(format!(
                "record `{}` did not consume all {} fields",
                name, arity
            )));
        }
        Ok(value)
    }

    fn not_a_record(what: &str) -> Error {
        Error::unsupported_type(&format!(
            "{} cannot be read as a record; use a struct or tuple of scalar fields",
            what
        ))
    }
}

/// Reads one raw line, terminator included, into `buf`.
///
/// Returns `false` when the stream was already exhausted.
pub(crate) fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<bool> {
    buf.clear();
    let read = reader.read_until(b'\n', buf)?;
    Ok(read > 0)
}

/// Decodes a record from the raw bytes of one line.
pub(crate) fn from_line_bytes<T>(bytes: &[u8], options: &RecordOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    let line = match std::str::from_utf8(bytes) {
        Ok(line) => line,
        Err(e) => {
            // Every delimiter before the bad byte closes one field, except that the
            // final field swallows the rest of the line
            let valid = std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default();
            let closed = valid.matches(options.delimiter.as_char()).count();
            let last = schema::<T>()?.arity().saturating_sub(1);
            return Err(Error::InvalidUtf8 {
                field: closed.min(last),
            });
        }
    };
    let mut deserializer = Deserializer::from_line(line, options.clone());
    T::deserialize(&mut deserializer)
}

macro_rules! record_only {
    ($($method:ident => $what:expr),* $(,)?) => {
        $(
            fn $method<V>(self, _visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                Err(Deserializer::not_a_record($what))
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = Error;

    record_only! {
        deserialize_any => "a self-describing value",
        deserialize_bool => "a bare bool",
        deserialize_i8 => "a bare integer",
        deserialize_i16 => "a bare integer",
        deserialize_i32 => "a bare integer",
        deserialize_i64 => "a bare integer",
        deserialize_u8 => "a bare integer",
        deserialize_u16 => "a bare integer",
        deserialize_u32 => "a bare integer",
        deserialize_u64 => "a bare integer",
        deserialize_f32 => "a bare float",
        deserialize_f64 => "a bare float",
        deserialize_char => "a bare char",
        deserialize_str => "a bare string",
        deserialize_string => "a bare string",
        deserialize_bytes => "a byte slice",
        deserialize_byte_buf => "a byte buffer",
        deserialize_option => "an option",
        deserialize_unit => "a unit value",
        deserialize_seq => "a sequence",
        deserialize_map => "a map",
        deserialize_identifier => "an identifier",
        deserialize_ignored_any => "an ignored value",
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Deserializer::not_a_record(&format!("unit struct `{}`", name)))
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.record("tuple", len, visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == BOUNDED_STRING_TOKEN {
            return Err(Deserializer::not_a_record("a bare string"));
        }
        self.record(name, len, visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.record(name, fields.len(), visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Deserializer::not_a_record(&format!("enum `{}`", name)))
    }
}

struct RecordAccess<'a, 'de> {
    de: &'a mut Deserializer<'de>,
}

impl<'a, 'de> de::SeqAccess<'de> for RecordAccess<'a, 'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        if self.de.state == Expect::Done {
            return Ok(None);
        }
        let (index, token) = self.de.next_token()?;
        seed.deserialize(FieldDeserializer { token, index })
            .map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        match self.de.state {
            Expect::Field(index) => Some(self.de.arity - index),
            Expect::Done => Some(0),
        }
    }
}

/// Converts one token into the type its field declares.
struct FieldDeserializer<'de> {
    token: &'de str,
    index: usize,
}

impl<'de> FieldDeserializer<'de> {
    fn not_a_field(&self, what: &str) -> Error {
        Error::unsupported_type(&format!(
            "field {} is {}; record fields must be scalars",
            self.index, what
        ))
    }
}

macro_rules! parse_int {
    ($($method:ident => $visit:ident, $ty:ty, $kind:expr),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                visitor.$visit(field::parse_int::<$ty>(self.index, self.token, $kind)?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for FieldDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        // Tokens carry no type information of their own
        visitor.visit_borrowed_str(self.token)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bool(field::parse_bool(self.index, self.token)?)
    }

    parse_int! {
        deserialize_i8 => visit_i8, i8, FieldKind::I8,
        deserialize_i16 => visit_i16, i16, FieldKind::I16,
        deserialize_i32 => visit_i32, i32, FieldKind::I32,
        deserialize_i64 => visit_i64, i64, FieldKind::I64,
        deserialize_u8 => visit_u8, u8, FieldKind::U8,
        deserialize_u16 => visit_u16, u16, FieldKind::U16,
        deserialize_u32 => visit_u32, u32, FieldKind::U32,
        deserialize_u64 => visit_u64, u64, FieldKind::U64,
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f32(field::parse_float(self.index, self.token, FieldKind::F32)?)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f64(field::parse_float(self.index, self.token, FieldKind::F64)?)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_char(field::parse_char(self.index, self.token)?)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.token)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.token.to_owned())
    }

    fn deserialize_bytes<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_field("a byte slice"))
    }

    fn deserialize_byte_buf<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_field("a byte buffer"))
    }

    fn deserialize_option<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_field("an option"))
    }

    fn deserialize_unit<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_field("a unit value"))
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_field(&format!("unit struct `{}`", name)))
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_field("a sequence"))
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_field("a tuple"))
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == BOUNDED_STRING_TOKEN {
            return visitor.visit_borrowed_str(self.token);
        }
        Err(self.not_a_field(&format!("struct `{}`", name)))
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_field("a map"))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_field(&format!("struct `{}`", name)))
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_field(&format!("enum `{}`", name)))
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.token)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_str, from_str_with_options, BoundedString, Delimiter};
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Sample {
        dato1: i32,
        dato2: f32,
        cadena: BoundedString<20>,
    }

    #[test]
    fn test_sample_line() {
        let sample: Sample = from_str("23|45.8|prueba\n").unwrap();
        assert_eq!(sample.dato1, 23);
        assert_eq!(sample.dato2, 45.8);
        assert_eq!(sample.cadena, "prueba");
    }

    #[test]
    fn test_last_field_keeps_delimiters() {
        let (id, rest): (u8, String) = from_str("4|a|b|c\n").unwrap();
        assert_eq!(id, 4);
        assert_eq!(rest, "a|b|c");
    }

    #[test]
    fn test_borrowed_str_fields() {
        #[derive(Deserialize)]
        struct View<'a> {
            id: u32,
            name: &'a str,
        }

        let view: View = from_str("9|nine\n").unwrap();
        assert_eq!(view.id, 9);
        assert_eq!(view.name, "nine");
    }

    #[test]
    fn test_missing_terminator_is_truncated() {
        let err = from_str::<Sample>("23|45.8|prueba").unwrap_err();
        assert!(matches!(err, Error::TruncatedRecord { field: 2, arity: 3 }));
    }

    #[test]
    fn test_missing_delimiters_are_truncated() {
        let err = from_str::<Sample>("23|45.8").unwrap_err();
        assert!(matches!(err, Error::TruncatedRecord { field: 2, arity: 3 }));

        let err = from_str::<Sample>("23\n").unwrap_err();
        assert!(matches!(err, Error::TruncatedRecord { field: 1, arity: 3 }));
    }

    #[test]
    fn test_first_bad_field_wins() {
        let err = from_str::<Sample>("1|x|y\n").unwrap_err();
        match err {
            Error::Parse {
                field,
                token,
                expected,
            } => {
                assert_eq!(field, 1);
                assert_eq!(token, "x");
                assert_eq!(expected, FieldKind::F32);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_comma_delimiter() {
        let options = RecordOptions::new().with_delimiter(Delimiter::COMMA);
        let (a, b, c): (bool, char, i16) = from_str_with_options("true,z,-300\n", options).unwrap();
        assert!(a);
        assert_eq!(b, 'z');
        assert_eq!(c, -300);
    }

    #[test]
    fn test_multibyte_delimiter() {
        let options = RecordOptions::new().with_delimiter(Delimiter::new('§').unwrap());
        let (a, b): (u32, String) = from_str_with_options("12§doce\n", options).unwrap();
        assert_eq!(a, 12);
        assert_eq!(b, "doce");
    }

    #[test]
    fn test_invalid_utf8_names_field() {
        let bytes = b"1|\xff|x\n";
        let err = from_line_bytes::<(i32, String, String)>(bytes, &RecordOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUtf8 { field: 1 }));
    }

    #[test]
    fn test_invalid_utf8_in_last_field_with_delimiters() {
        let bytes = b"1|a|b|\xff\n";
        let err = from_line_bytes::<(i32, String)>(bytes, &RecordOptions::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidUtf8 { field: 1 }));
    }

    #[test]
    fn test_bounded_string_field() {
        let (id, name): (u8, BoundedString<4>) = from_str("3|abcdef\n").unwrap();
        assert_eq!(id, 3);
        assert_eq!(name, "abc");
        assert!(name.was_truncated());
    }

    #[test]
    fn test_rejects_non_records() {
        assert!(matches!(
            from_str::<i32>("1\n"),
            Err(Error::UnsupportedType(_))
        ));
        assert!(matches!(
            from_str::<(i32, Option<i32>)>("1|2\n"),
            Err(Error::UnsupportedType(_))
        ));
    }
}
