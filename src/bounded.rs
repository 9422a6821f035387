//! Fixed-capacity string fields.
//!
//! [`BoundedString<N>`] stores at most `N - 1` characters: one slot of the capacity is
//! reserved for a terminator, matching the fixed character buffers older record files
//! were written from. Longer input is truncated, never rejected, except through the
//! strict [`TryFrom`] constructor. Truncation is lossy, so it is always observable:
//! [`BoundedString::was_truncated`] reports it and a `tracing` warning is emitted.
//!
//! ```rust
//! use serde_delimited::BoundedString;
//!
//! let short: BoundedString<8> = BoundedString::new("prueba");
//! assert!(!short.was_truncated());
//!
//! let long: BoundedString<8> = BoundedString::new("test con espacios");
//! assert_eq!(long.as_str(), "test co");
//! assert!(long.was_truncated());
//! ```

use crate::{Error, Result};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

/// Name a [`BoundedString`] passes to `deserialize_tuple_struct`, with its capacity
/// as the length. The record decoder and the schema reader both recognise it.
pub(crate) const BOUNDED_STRING_TOKEN: &str = "$serde_delimited::BoundedString";

/// A string field with a fixed capacity of `N` including the terminator slot.
#[derive(Clone, Default)]
pub struct BoundedString<const N: usize> {
    value: String,
    truncated: bool,
}

impl<const N: usize> BoundedString<N> {
    /// Declared capacity, terminator slot included.
    pub const CAPACITY: usize = N;

    /// Maximum number of characters the field holds.
    pub const MAX_CHARS: usize = N.saturating_sub(1);

    /// Creates a bounded string, truncating to [`Self::MAX_CHARS`] characters.
    pub fn new(s: &str) -> Self {
        match s.char_indices().nth(Self::MAX_CHARS) {
            None => BoundedString {
                value: s.to_string(),
                truncated: false,
            },
            Some((cut, _)) => {
                tracing::warn!(
                    capacity = N,
                    len = s.chars().count(),
                    "string field truncated to fit its capacity"
                );
                BoundedString {
                    value: s[..cut].to_string(),
                    truncated: true,
                }
            }
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns `true` if characters were dropped when this value was built or decoded.
    #[must_use]
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.value
    }
}

impl<const N: usize> TryFrom<&str> for BoundedString<N> {
    type Error = Error;

    /// Strict construction: fails instead of truncating.
    fn try_from(s: &str) -> Result<Self> {
        let len = s.chars().count();
        if len > Self::MAX_CHARS {
            return Err(Error::CapacityExceeded { capacity: N, len });
        }
        Ok(BoundedString {
            value: s.to_string(),
            truncated: false,
        })
    }
}

impl<const N: usize> From<BoundedString<N>> for String {
    fn from(s: BoundedString<N>) -> Self {
        s.value
    }
}

impl<const N: usize> Deref for BoundedString<N> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.value
    }
}

impl<const N: usize> AsRef<str> for BoundedString<N> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

// Equality is over content only; the truncation flag is provenance, not value.
impl<const N: usize> PartialEq for BoundedString<N> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<const N: usize> Eq for BoundedString<N> {}

impl<const N: usize> PartialEq<str> for BoundedString<N> {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl<const N: usize> PartialEq<&str> for BoundedString<N> {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

impl<const N: usize> fmt::Debug for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.value, f)
    }
}

impl<const N: usize> fmt::Display for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<const N: usize> Serialize for BoundedString<N> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, const N: usize> Deserialize<'de> for BoundedString<N> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_tuple_struct(BOUNDED_STRING_TOKEN, N, BoundedStringVisitor::<N>)
    }
}

struct BoundedStringVisitor<const N: usize>;

impl<'de, const N: usize> de::Visitor<'de> for BoundedStringVisitor<N> {
    type Value = BoundedString<N>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a string of at most {} characters", N.saturating_sub(1))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(BoundedString::new(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_exactly() {
        let s: BoundedString<4> = BoundedString::new("abc");
        assert_eq!(s, "abc");
        assert!(!s.was_truncated());
    }

    #[test]
    fn test_truncates_to_capacity_minus_one() {
        let s: BoundedString<4> = BoundedString::new("abcd");
        assert_eq!(s.as_str(), "abc");
        assert!(s.was_truncated());
        assert_eq!(BoundedString::<4>::MAX_CHARS, 3);
    }

    #[test]
    fn test_truncation_counts_chars() {
        let s: BoundedString<3> = BoundedString::new("ñañ");
        assert_eq!(s.as_str(), "ña");
        assert!(s.was_truncated());
    }

    #[test]
    fn test_zero_capacity_holds_nothing() {
        let s: BoundedString<0> = BoundedString::new("x");
        assert_eq!(s.as_str(), "");
        assert!(s.was_truncated());
    }

    #[test]
    fn test_strict_construction() {
        assert!(BoundedString::<20>::try_from("prueba").is_ok());
        match BoundedString::<5>::try_from("prueba") {
            Err(Error::CapacityExceeded { capacity, len }) => {
                assert_eq!(capacity, 5);
                assert_eq!(len, 6);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_equality_ignores_flag() {
        let a: BoundedString<4> = BoundedString::new("abcz");
        let b: BoundedString<4> = BoundedString::try_from("abc").unwrap();
        assert_eq!(a, b);
    }
}
