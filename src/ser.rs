//! Record serialization.
//!
//! This module provides the [`Serializer`] that renders one record as one line:
//! every field becomes a token, tokens are joined with the configured delimiter,
//! and a single `\n` terminates the line.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde::Serialize;
//! use serde_delimited::to_string;
//!
//! #[derive(Serialize)]
//! struct Reading { sensor: u32, value: f64, label: String }
//!
//! let reading = Reading { sensor: 7, value: -1.25, label: "north wall".to_string() };
//! assert_eq!(to_string(&reading).unwrap(), "7|-1.25|north wall\n");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use serde::Serialize;
//! use serde_delimited::{RecordOptions, Serializer};
//!
//! let mut serializer = Serializer::new(RecordOptions::new());
//! (1u8, true, 'x').serialize(&mut serializer).unwrap();
//! assert_eq!(serializer.into_inner(), "1|true|x\n");
//! ```
//!
//! ## Record Shape
//!
//! A record is a struct, tuple struct or tuple whose fields are all scalars
//! (integers, floats, `bool`, `char`, strings). Anything else is rejected with
//! [`Error::UnsupportedType`] before a single byte is produced.

use crate::field;
use crate::options::LINE_TERMINATOR;
use crate::{Error, RecordOptions, Result};
use serde::{ser, Serialize};

/// The record serializer.
///
/// Accumulates exactly one line in memory. Created via [`Serializer::new`].
pub struct Serializer {
    output: String,
    options: RecordOptions,
    field: usize,
}

impl Serializer {
    pub fn new(options: RecordOptions) -> Self {
        // Records are short; one allocation usually covers a whole line
        Serializer {
            output: String::with_capacity(64),
            options,
            field: 0,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    fn begin_field(&mut self) -> usize {
        if self.field > 0 {
            self.output.push(self.options.delimiter.as_char());
        }
        let index = self.field;
        self.field += 1;
        index
    }

    fn not_a_record(what: &str) -> Error {
        Error::unsupported_type(&format!(
            "{} cannot be written as a record; use a struct or tuple of scalar fields",
            what
        ))
    }
}

impl<'a> ser::Serializer for &'a mut Serializer {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = ser::Impossible<(), Error>;
    type SerializeTuple = RecordSerializer<'a>;
    type SerializeTupleStruct = RecordSerializer<'a>;
    type SerializeTupleVariant = ser::Impossible<(), Error>;
    type SerializeMap = ser::Impossible<(), Error>;
    type SerializeStruct = RecordSerializer<'a>;
    type SerializeStructVariant = ser::Impossible<(), Error>;

    fn serialize_bool(self, _v: bool) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare bool"))
    }

    fn serialize_i8(self, _v: i8) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare integer"))
    }

    fn serialize_i16(self, _v: i16) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare integer"))
    }

    fn serialize_i32(self, _v: i32) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare integer"))
    }

    fn serialize_i64(self, _v: i64) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare integer"))
    }

    fn serialize_u8(self, _v: u8) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare integer"))
    }

    fn serialize_u16(self, _v: u16) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare integer"))
    }

    fn serialize_u32(self, _v: u32) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare integer"))
    }

    fn serialize_u64(self, _v: u64) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare integer"))
    }

    fn serialize_f32(self, _v: f32) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare float"))
    }

    fn serialize_char(self, _v: char) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare char"))
    }

    fn serialize_str(self, _v: &str) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a bare string"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a byte slice"))
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("an option"))
    }

    fn serialize_some<T>(self, _value: &T) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        Err(Serializer::not_a_record("an option"))
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Err(Serializer::not_a_record("a unit value"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Self::Ok> {
        Err(Serializer::not_a_record(&format!("unit struct `{}`", name)))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok> {
        Err(Serializer::not_a_record(&format!("enum `{}`", name)))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        Err(Serializer::not_a_record(&format!("enum `{}`", name)))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Serializer::not_a_record("a sequence"))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        RecordSerializer::begin(self, "tuple", len)
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        RecordSerializer::begin(self, name, len)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Serializer::not_a_record(&format!("enum `{}`", name)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Serializer::not_a_record("a map"))
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        RecordSerializer::begin(self, name, len)
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Serializer::not_a_record(&format!("enum `{}`", name)))
    }
}

/// Writes the fields of one record, delimiter-separated, then the terminator.
pub struct RecordSerializer<'a> {
    ser: &'a mut Serializer,
    name: &'static str,
}

impl<'a> RecordSerializer<'a> {
    fn begin(ser: &'a mut Serializer, name: &'static str, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::unsupported_type(&format!(
                "record `{}` has no fields",
                name
            )));
        }
        if !ser.output.is_empty() {
            return Err(Error::unsupported_type(&format!(
                "record `{}` written to a serializer that already holds a line",
                name
            )));
        }
        Ok(RecordSerializer { ser, name })
    }

    fn field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let index = self.ser.begin_field();
        value.serialize(FieldSerializer {
            ser: &mut *self.ser,
            index,
        })
    }

    fn finish(self) -> Result<()> {
        self.ser.output.push(LINE_TERMINATOR);
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for RecordSerializer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a> ser::SerializeTupleStruct for RecordSerializer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a> ser::SerializeStruct for RecordSerializer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, _key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(value)
    }

    fn skip_field(&mut self, key: &'static str) -> Result<()> {
        // A skipped field would shift every following token one slot to the left
        Err(Error::unsupported_type(&format!(
            "field `{}` of record `{}` is conditionally skipped; record arity must be fixed",
            key, self.name
        )))
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

/// Renders a single scalar field token.
struct FieldSerializer<'a> {
    ser: &'a mut Serializer,
    index: usize,
}

impl<'a> FieldSerializer<'a> {
    fn not_a_field(&self, what: &str) -> Error {
        Error::unsupported_type(&format!(
            "field {} is {}; record fields must be scalars",
            self.index, what
        ))
    }

    fn push_display<T: ToString>(self, value: T) -> Result<()> {
        self.ser.output.push_str(&value.to_string());
        Ok(())
    }

    fn push_float<F: std::fmt::Display>(self, value: F) -> Result<()> {
        field::push_float(&mut self.ser.output, value, self.ser.options.float_precision);
        Ok(())
    }
}

impl<'a> ser::Serializer for FieldSerializer<'a> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = ser::Impossible<(), Error>;
    type SerializeTuple = ser::Impossible<(), Error>;
    type SerializeTupleStruct = ser::Impossible<(), Error>;
    type SerializeTupleVariant = ser::Impossible<(), Error>;
    type SerializeMap = ser::Impossible<(), Error>;
    type SerializeStruct = ser::Impossible<(), Error>;
    type SerializeStructVariant = ser::Impossible<(), Error>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        self.ser.output.push_str(if v { "true" } else { "false" });
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok> {
        self.push_display(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok> {
        self.push_display(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok> {
        self.push_display(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok> {
        self.push_display(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok> {
        self.push_display(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok> {
        self.push_display(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok> {
        self.push_display(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok> {
        self.push_display(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        self.push_float(v)
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        self.push_float(v)
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        let mut buf = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        let delimiter = self.ser.options.delimiter.as_char();
        if v.contains(delimiter) || v.contains(LINE_TERMINATOR) {
            // No escaping exists; the line will not decode to the same record
            tracing::warn!(
                field = self.index,
                delimiter = %delimiter,
                "string field contains the delimiter or a line terminator"
            );
        }
        self.ser.output.push_str(v);
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok> {
        Err(self.not_a_field("a byte slice"))
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Err(self.not_a_field("an option"))
    }

    fn serialize_some<T>(self, _value: &T) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        Err(self.not_a_field("an option"))
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Err(self.not_a_field("a unit value"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Self::Ok> {
        Err(self.not_a_field(&format!("unit struct `{}`", name)))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Self::Ok> {
        Err(self.not_a_field(&format!("enum `{}`", name)))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        Err(self.not_a_field(&format!("enum `{}`", name)))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(self.not_a_field("a sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(self.not_a_field("a tuple"))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(self.not_a_field(&format!("struct `{}`", name)))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.not_a_field(&format!("enum `{}`", name)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(self.not_a_field("a map"))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(self.not_a_field(&format!("struct `{}`", name)))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.not_a_field(&format!("enum `{}`", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{to_string, to_string_with_options, BoundedString, Delimiter};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Sample {
        dato1: i32,
        dato2: f32,
        cadena: BoundedString<20>,
    }

    #[test]
    fn test_sample_line() {
        let sample = Sample {
            dato1: 23,
            dato2: 45.8,
            cadena: BoundedString::new("prueba"),
        };
        assert_eq!(to_string(&sample).unwrap(), "23|45.8|prueba\n");
    }

    #[test]
    fn test_tuple_struct_and_newtype_fields() {
        #[derive(Serialize)]
        struct Meters(u16);

        #[derive(Serialize)]
        struct Span(Meters, Meters, char);

        let line = to_string(&Span(Meters(3), Meters(40), 'm')).unwrap();
        assert_eq!(line, "3|40|m\n");
    }

    #[test]
    fn test_custom_delimiter() {
        let options = RecordOptions::new().with_delimiter(Delimiter::TAB);
        let line = to_string_with_options(&(-1i64, false, "a b"), options).unwrap();
        assert_eq!(line, "-1\tfalse\ta b\n");
    }

    #[test]
    fn test_rejects_bare_scalar() {
        assert!(matches!(to_string(&5i32), Err(Error::UnsupportedType(_))));
        assert!(matches!(
            to_string(&vec![1, 2]),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_rejects_nested_fields() {
        #[derive(Serialize)]
        struct Inner {
            a: i32,
        }

        #[derive(Serialize)]
        struct Outer {
            id: i32,
            inner: Inner,
        }

        let err = to_string(&Outer {
            id: 1,
            inner: Inner { a: 2 },
        })
        .unwrap_err();
        assert!(err.to_string().contains("field 1"));

        assert!(to_string(&(1, Some(2))).is_err());
        assert!(to_string(&(1, vec![2])).is_err());
    }

    #[test]
    fn test_rejects_skipped_fields() {
        #[derive(Serialize)]
        struct Sparse {
            id: i32,
            #[serde(skip_serializing_if = "String::is_empty")]
            note: String,
        }

        let sparse = Sparse {
            id: 1,
            note: String::new(),
        };
        assert!(matches!(
            to_string(&sparse),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_rejects_empty_record() {
        assert!(to_string(&()).is_err());
    }

    #[test]
    fn test_delimiter_in_string_is_written_verbatim() {
        let line = to_string(&(1, "a|b")).unwrap();
        assert_eq!(line, "1|a|b\n");
    }
}
