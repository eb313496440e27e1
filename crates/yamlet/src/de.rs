//! serde::Deserializer implementation backed by a parsed [`Value`]

use serde::de::{self, DeserializeOwned, IntoDeserializer, MapAccess, SeqAccess};

use crate::value::Value;
use crate::{Error, Result};

#[derive(Debug)]
pub struct DeError {
    msg: String,
}

impl core::fmt::Display for DeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.msg)
    }
}
impl de::Error for DeError {
    fn custom<T: core::fmt::Display>(t: T) -> Self {
        DeError {
            msg: format!("{}", t),
        }
    }
}
impl core::error::Error for DeError {}

pub struct Deserializer {
    value: Value,
}

impl Deserializer {
    pub fn from_value(value: Value) -> Self {
        Self { value }
    }
}

struct SeqAccessor {
    elems: std::vec::IntoIter<Value>,
}

impl<'de> SeqAccess<'de> for SeqAccessor {
    type Error = DeError;
    fn next_element_seed<T>(&mut self, seed: T) -> core::result::Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.elems.next() {
            Some(v) => seed.deserialize(Deserializer { value: v }).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.elems.len())
    }
}

struct MapAccessor {
    entries: std::vec::IntoIter<(String, Value)>,
    next_val: Option<Value>,
}

impl<'de> MapAccess<'de> for MapAccessor {
    type Error = DeError;
    fn next_key_seed<K>(&mut self, seed: K) -> core::result::Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((key, val)) => {
                self.next_val = Some(val);
                seed.deserialize(key.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> core::result::Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let v = self.next_val.take().unwrap_or(Value::Null);
        seed.deserialize(Deserializer { value: v })
    }
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = DeError;

    fn deserialize_any<V>(self, visitor: V) -> core::result::Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Int(i) => visitor.visit_i64(i),
            Value::Float(f) => visitor.visit_f64(f),
            Value::Str(s) => visitor.visit_string(s),
            Value::Sequence(arr) => visitor.visit_seq(SeqAccessor {
                elems: arr.into_iter(),
            }),
            Value::Mapping(obj) => visitor.visit_map(MapAccessor {
                entries: obj.into_iter(),
                next_val: None,
            }),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> core::result::Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> core::result::Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Str(s) => visitor.visit_enum(s.into_deserializer()),
            other => Err(de::Error::custom(format!(
                "expected a unit variant name, found {}",
                other.type_name()
            ))),
        }
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 char str string bytes byte_buf
        unit unit_struct newtype_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

pub fn from_value<T: DeserializeOwned>(v: Value) -> Result<T> {
    T::deserialize(Deserializer::from_value(v)).map_err(|e: DeError| Error::Message(e.msg))
}
