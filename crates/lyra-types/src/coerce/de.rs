//! The serde deserializers that materialize coerced input maps into bound
//! Rust types.
//!
//! [`StructDeserializer`] drives every field the target type declares:
//! present entries deserialize through [`ValueDeserializer`], absent or null
//! entries through [`DefaultDeserializer`], which produces the member type's
//! default (0, false, empty string, `None`, empty collection). Field lookup
//! is case-insensitive.

use crate::error::CoercionError;
use crate::InputValue;
use indexmap::IndexMap;
use serde::de::value::StrDeserializer;
use serde::de::DeserializeSeed;
use serde::de::IntoDeserializer;
use serde::de::Visitor;
use serde::forward_to_deserialize_any;
use serde::Deserializer;

/// Deserializes a target type from a coerced member-name-keyed map.
pub(crate) struct StructDeserializer<'de> {
    map: &'de IndexMap<String, InputValue>,
}

impl<'de> StructDeserializer<'de> {
    pub(crate) fn new(map: &'de IndexMap<String, InputValue>) -> Self {
        Self { map }
    }
}

impl<'de> Deserializer<'de> for StructDeserializer<'de> {
    type Error = CoercionError;

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_map(StructAccess {
            map: self.map,
            fields,
            index: 0,
            current: None,
        })
    }

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_map(ObjectAccess {
            iter: self.map.iter(),
            value: None,
        })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

/// MapAccess over the target's declared field list, not the supplied keys:
/// every declared field is visited exactly once. Once the field list is
/// exhausted, any supplied key that matched no field is an error — a member
/// mapping pointing at nothing must not drop its value silently.
struct StructAccess<'de> {
    map: &'de IndexMap<String, InputValue>,
    fields: &'static [&'static str],
    index: usize,
    current: Option<&'static str>,
}

impl<'de> serde::de::MapAccess<'de> for StructAccess<'de> {
    type Error = CoercionError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        match self.fields.get(self.index) {
            Some(&field) => {
                self.index += 1;
                self.current = Some(field);
                seed.deserialize(StrDeserializer::new(field)).map(Some)
            }
            None => {
                let unmatched = self.map.keys().find(|key| {
                    !self
                        .fields
                        .iter()
                        .any(|field| field.eq_ignore_ascii_case(key))
                });
                if let Some(member) = unmatched {
                    return Err(CoercionError::UnmatchedMember {
                        member: member.clone(),
                    });
                }
                Ok(None)
            }
        }
    }

    fn next_value_seed<S: DeserializeSeed<'de>>(
        &mut self,
        seed: S,
    ) -> Result<S::Value, Self::Error> {
        let Some(field) = self.current.take() else {
            return Err(CoercionError::Message(
                "value requested before key".to_owned(),
            ));
        };
        let supplied = self
            .map
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(field))
            .map(|(_, value)| value);
        match supplied {
            // Explicit null binds the member default, same as absence.
            Some(value) if !value.is_null() => seed.deserialize(ValueDeserializer { value }),
            _ => seed.deserialize(DefaultDeserializer),
        }
    }
}

/// Deserializes one coerced [`InputValue`].
pub(crate) struct ValueDeserializer<'de> {
    pub(crate) value: &'de InputValue,
}

impl<'de> Deserializer<'de> for ValueDeserializer<'de> {
    type Error = CoercionError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.value {
            InputValue::Null => visitor.visit_unit(),
            InputValue::Variable(name) => Err(CoercionError::UnresolvedVariable {
                name: name.to_string(),
            }),
            InputValue::Int(i) => visitor.visit_i32(*i),
            InputValue::Long(l) => visitor.visit_i64(*l),
            InputValue::Decimal(d) => match rust_decimal::prelude::ToPrimitive::to_f64(d) {
                Some(v) => visitor.visit_f64(v),
                None => visitor.visit_str(&d.to_string()),
            },
            InputValue::BigInt(b) => match i64::try_from(b.clone()) {
                Ok(v) => visitor.visit_i64(v),
                Err(_) => visitor.visit_str(&b.to_string()),
            },
            InputValue::Float(v) => visitor.visit_f64(v.0),
            InputValue::String(s) => visitor.visit_str(s),
            InputValue::Boolean(b) => visitor.visit_bool(*b),
            InputValue::Enum(name) => visitor.visit_str(name.as_str()),
            InputValue::List(items) => visitor.visit_seq(SeqAccess { iter: items.iter() }),
            InputValue::Object(map) => visitor.visit_map(ObjectAccess {
                iter: map.iter(),
                value: None,
            }),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        if self.value.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.value {
            InputValue::Object(map) => visitor.visit_map(StructAccess {
                map,
                fields,
                index: 0,
                current: None,
            }),
            other => Err(CoercionError::Message(format!(
                "expected an input object, found {}",
                other.describe()
            ))),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.value {
            InputValue::Enum(name) => visitor.visit_enum(name.as_str().into_deserializer()),
            InputValue::String(s) => visitor.visit_enum(s.as_str().into_deserializer()),
            other => Err(CoercionError::Message(format!(
                "expected an enum value, found {}",
                other.describe()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map
        identifier ignored_any
    }
}

struct SeqAccess<'de> {
    iter: std::slice::Iter<'de, InputValue>,
}

impl<'de> serde::de::SeqAccess<'de> for SeqAccess<'de> {
    type Error = CoercionError;

    fn next_element_seed<S: DeserializeSeed<'de>>(
        &mut self,
        seed: S,
    ) -> Result<Option<S::Value>, Self::Error> {
        self.iter
            .next()
            .map(|value| seed.deserialize(ValueDeserializer { value }))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// MapAccess over an object's supplied entries, for map-shaped targets.
struct ObjectAccess<'de> {
    iter: indexmap::map::Iter<'de, String, InputValue>,
    value: Option<&'de InputValue>,
}

impl<'de> serde::de::MapAccess<'de> for ObjectAccess<'de> {
    type Error = CoercionError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(StrDeserializer::new(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<S: DeserializeSeed<'de>>(
        &mut self,
        seed: S,
    ) -> Result<S::Value, Self::Error> {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer { value }),
            None => Err(CoercionError::Message(
                "value requested before key".to_owned(),
            )),
        }
    }
}

/// Produces the default of whatever type asks to be deserialized.
pub(crate) struct DefaultDeserializer;

macro_rules! default_number {
    ($($method:ident => $visit:ident($value:expr),)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                visitor.$visit($value)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for DefaultDeserializer {
    type Error = CoercionError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_bool(false)
    }

    default_number! {
        deserialize_i8 => visit_i8(0),
        deserialize_i16 => visit_i16(0),
        deserialize_i32 => visit_i32(0),
        deserialize_i64 => visit_i64(0),
        deserialize_i128 => visit_i128(0),
        deserialize_u8 => visit_u8(0),
        deserialize_u16 => visit_u16(0),
        deserialize_u32 => visit_u32(0),
        deserialize_u64 => visit_u64(0),
        deserialize_u128 => visit_u128(0),
        deserialize_f32 => visit_f32(0.0),
        deserialize_f64 => visit_f64(0.0),
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_none()
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_str("")
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_str("")
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_char('\0')
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_bytes(&[])
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_bytes(&[])
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(EmptyAccess)
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(EmptyAccess)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(EmptyAccess)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_map(EmptyAccess)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_map(EmptyAccess)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        Err(CoercionError::Message(format!(
            "enum `{name}` has no default; a value must be supplied"
        )))
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        unit unit_struct identifier
    }
}

struct EmptyAccess;

impl<'de> serde::de::SeqAccess<'de> for EmptyAccess {
    type Error = CoercionError;

    fn next_element_seed<S: DeserializeSeed<'de>>(
        &mut self,
        _seed: S,
    ) -> Result<Option<S::Value>, Self::Error> {
        Ok(None)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(0)
    }
}

impl<'de> serde::de::MapAccess<'de> for EmptyAccess {
    type Error = CoercionError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        _seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        Ok(None)
    }

    fn next_value_seed<S: DeserializeSeed<'de>>(
        &mut self,
        _seed: S,
    ) -> Result<S::Value, Self::Error> {
        Err(CoercionError::Message(
            "value requested before key".to_owned(),
        ))
    }
}
