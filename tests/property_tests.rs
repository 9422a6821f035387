//! Property-based tests for the round-trip guarantee.
//!
//! Strings are drawn without the delimiter and the line terminator, the only inputs
//! the format cannot carry.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_delimited::{from_str, to_string, BoundedString};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Sample {
    dato1: i32,
    dato2: f32,
    cadena: BoundedString<20>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Wide {
    a: i8,
    b: u64,
    c: bool,
    d: char,
    e: f64,
    f: String,
}

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {:?}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn field_text() -> impl Strategy<Value = String> {
    "[^|\n]{0,40}"
}

proptest! {
    #[test]
    fn prop_sample(dato1 in any::<i32>(), dato2 in any::<f32>(), cadena in field_text()) {
        prop_assume!(!dato2.is_nan());
        let sample = Sample { dato1, dato2, cadena: BoundedString::new(&cadena) };
        prop_assert!(roundtrip(&sample));
    }

    #[test]
    fn prop_wide(
        a in any::<i8>(),
        b in any::<u64>(),
        c in any::<bool>(),
        d in any::<char>().prop_filter("no delimiter or newline", |ch| *ch != '|' && *ch != '\n'),
        e in any::<f64>(),
        f in field_text(),
    ) {
        prop_assume!(!e.is_nan());
        let wide = Wide { a, b, c, d, e, f };
        prop_assert!(roundtrip(&wide));
    }

    #[test]
    fn prop_last_field_may_hold_delimiters(id in any::<u32>(), tail in "[^\n]{0,40}") {
        prop_assert!(roundtrip(&(id, tail)));
    }

    #[test]
    fn prop_bounded_string_never_exceeds_capacity(s in "\\PC{0,60}") {
        let bounded: BoundedString<20> = BoundedString::new(&s);
        prop_assert!(bounded.chars().count() <= 19);
        prop_assert_eq!(bounded.was_truncated(), s.chars().count() > 19);
        prop_assert!(s.starts_with(bounded.as_str()));
    }
}
