//! Build-time discovery of a Rust type's deserializable fields.
//!
//! Driving `T::deserialize` against [`FieldProbe`] makes a derived struct
//! impl call `deserialize_struct` with its declared field list; the probe
//! smuggles that list out through its error type without ever constructing a
//! `T`. Non-struct types answer `None` and skip member validation.

use serde::de::DeserializeOwned;
use serde::de::Visitor;
use serde::forward_to_deserialize_any;
use std::fmt;

pub(crate) fn struct_fields<T: DeserializeOwned>() -> Option<&'static [&'static str]> {
    match T::deserialize(FieldProbe) {
        Err(ProbeError::Fields(fields)) => Some(fields),
        _ => None,
    }
}

struct FieldProbe;

#[derive(Debug)]
enum ProbeError {
    Fields(&'static [&'static str]),
    NotAStruct,
    Custom(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Fields(fields) => write!(f, "captured fields {fields:?}"),
            ProbeError::NotAStruct => f.write_str("not a struct"),
            ProbeError::Custom(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ProbeError {}

impl serde::de::Error for ProbeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ProbeError::Custom(msg.to_string())
    }
}

impl<'de> serde::Deserializer<'de> for FieldProbe {
    type Error = ProbeError;

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Err(ProbeError::Fields(fields))
    }

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(ProbeError::NotAStruct)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct Person {
        name: String,
        age: i32,
    }

    #[test]
    fn captures_a_derived_structs_field_list() {
        assert_eq!(struct_fields::<Person>(), Some(&["name", "age"][..]));
    }

    #[test]
    fn non_structs_answer_none() {
        assert_eq!(struct_fields::<HashMap<String, i32>>(), None);
        assert_eq!(struct_fields::<Vec<String>>(), None);
        assert_eq!(struct_fields::<i64>(), None);
    }
}
