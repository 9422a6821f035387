//! Record schema introspection.
//!
//! A record's schema is its Rust type: field count and order come from the struct
//! or tuple definition and never change between lines of a file. [`schema`] makes
//! that shape visible at runtime by driving the type's `Deserialize` impl against
//! a probe that answers every field with a placeholder and notes which type the
//! field asked for.
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_delimited::{schema, BoundedString, FieldKind};
//!
//! #[derive(Deserialize)]
//! struct Sample { dato1: i32, dato2: f32, cadena: BoundedString<20> }
//!
//! let schema = schema::<Sample>().unwrap();
//! assert_eq!(schema.name(), "Sample");
//! assert_eq!(schema.arity(), 3);
//! assert_eq!(schema.field(1).unwrap().kind(), FieldKind::F32);
//! assert_eq!(schema.field(2).unwrap().name(), Some("cadena"));
//! assert_eq!(schema.field(2).unwrap().kind(), FieldKind::BoundedStr { capacity: 20 });
//! ```

use crate::bounded::BOUNDED_STRING_TOKEN;
use crate::field::FieldKind;
use crate::{Error, Result};
use serde::de::{self, DeserializeOwned};

/// One field of a record schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    name: Option<&'static str>,
    kind: FieldKind,
}

impl FieldSpec {
    /// Field name, for records declared as structs with named fields.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

/// The fixed shape of a record type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldSpec>,
}

impl Schema {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of fields, and so of tokens on every line.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn field(&self, index: usize) -> Option<&FieldSpec> {
        self.fields.get(index)
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn kinds(&self) -> impl Iterator<Item = FieldKind> + '_ {
        self.fields.iter().map(FieldSpec::kind)
    }
}

/// Returns the schema of record type `T`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if `T` is not a struct, tuple struct or tuple
/// of scalar fields, or if a field does not declare a concrete type.
pub fn schema<T>() -> Result<Schema>
where
    T: DeserializeOwned,
{
    let mut probe = RecordProbe { schema: None };
    T::deserialize(&mut probe)?;
    probe
        .schema
        .ok_or_else(|| Error::unsupported_type("type did not describe a record"))
}

struct RecordProbe {
    schema: Option<Schema>,
}

impl RecordProbe {
    fn record<'de, V>(
        &mut self,
        name: &'static str,
        names: Option<&'static [&'static str]>,
        arity: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if arity == 0 {
            return Err(Error::unsupported_type(&format!(
                "record `{}` has no fields",
                name
            )));
        }
        let mut kinds = Vec::with_capacity(arity);
        let value = visitor.visit_seq(ProbeAccess {
            kinds: &mut kinds,
            arity,
        })?;
        let fields = kinds
            .into_iter()
            .enumerate()
            .map(|(index, kind)| FieldSpec {
                name: names.and_then(|names| names.get(index).copied()),
                kind,
            })
            .collect();
        self.schema = Some(Schema { name, fields });
        Ok(value)
    }

    fn not_a_record(what: &str) -> Error {
        Error::unsupported_type(&format!("{} is not a record", what))
    }
}

impl<'de> de::Deserializer<'de> for &mut RecordProbe {
    type Error = Error;

    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(RecordProbe::not_a_record("a self-describing value"))
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
        self.record("tuple", None, len, visitor)
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
            return Err(RecordProbe::not_a_record("a bare string"));
        }
        self.record(name, None, len, visitor)
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
        self.record(name, Some(fields), fields.len(), visitor)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct seq map enum identifier ignored_any
    }
}

struct ProbeAccess<'a> {
    kinds: &'a mut Vec<FieldKind>,
    arity: usize,
}

impl<'a, 'de> de::SeqAccess<'de> for ProbeAccess<'a> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        if self.kinds.len() == self.arity {
            return Ok(None);
        }
        let index = self.kinds.len();
        seed.deserialize(KindProbe {
            kinds: &mut *self.kinds,
            index,
        })
        .map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.arity - self.kinds.len())
    }
}

/// Records the declared kind of one field and answers with a placeholder.
struct KindProbe<'a> {
    kinds: &'a mut Vec<FieldKind>,
    index: usize,
}

impl<'a> KindProbe<'a> {
    fn declare(self, kind: FieldKind) {
        self.kinds.push(kind);
    }

    fn not_a_field(&self, what: &str) -> Error {
        Error::unsupported_type(&format!(
            "field {} is {}; record fields must be scalars",
            self.index, what
        ))
    }
}

macro_rules! probe_scalar {
    ($($method:ident => $kind:expr, $visit:ident($placeholder:expr)),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                self.declare($kind);
                visitor.$visit($placeholder)
            }
        )*
    };
}

impl<'a, 'de> de::Deserializer<'de> for KindProbe<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.not_a_field("not a concretely typed value"))
    }

    // Placeholders stay inside every integer type's valid range, non-zero included
    probe_scalar! {
        deserialize_bool => FieldKind::Bool, visit_bool(false),
        deserialize_i8 => FieldKind::I8, visit_i8(1),
        deserialize_i16 => FieldKind::I16, visit_i16(1),
        deserialize_i32 => FieldKind::I32, visit_i32(1),
        deserialize_i64 => FieldKind::I64, visit_i64(1),
        deserialize_u8 => FieldKind::U8, visit_u8(1),
        deserialize_u16 => FieldKind::U16, visit_u16(1),
        deserialize_u32 => FieldKind::U32, visit_u32(1),
        deserialize_u64 => FieldKind::U64, visit_u64(1),
        deserialize_f32 => FieldKind::F32, visit_f32(0.0),
        deserialize_f64 => FieldKind::F64, visit_f64(0.0),
        deserialize_char => FieldKind::Char, visit_char(' '),
        deserialize_str => FieldKind::Str, visit_borrowed_str(""),
        deserialize_string => FieldKind::Str, visit_string(String::new()),
        deserialize_identifier => FieldKind::Str, visit_borrowed_str(""),
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.declare(FieldKind::Str);
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
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
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name == BOUNDED_STRING_TOKEN {
            self.declare(FieldKind::BoundedStr { capacity: len });
            return visitor.visit_borrowed_str("");
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
}
