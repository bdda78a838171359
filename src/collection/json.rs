//! JSON interop for collection trees.
//!
//! `Value` serializes through serde the same way [`Value::to_plain`] shapes
//! it: keyed containers become maps with stringified keys, everything else
//! ordered becomes a sequence. JSON documents convert into persistent
//! containers (`Map` for objects, `List` for arrays), which makes fixtures
//! easy to build.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::{List, Map, SeqKind, Value};

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Map(m) => {
                let mut out = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m.iter() {
                    out.serialize_entry(&k.to_key_string(), v)?;
                }
                out.end()
            }
            Value::Object(o) => {
                let mut out = serializer.serialize_map(Some(o.len()))?;
                for (k, v) in o.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Seq(s) if s.kind() == SeqKind::Keyed => {
                let mut out = serializer.serialize_map(Some(s.len()))?;
                for (k, v) in s.iter() {
                    out.serialize_entry(&k.to_key_string(), v)?;
                }
                out.end()
            }
            Value::Seq(s) => collect_seq(serializer, s.len(), s.values()),
            Value::List(l) => collect_seq(serializer, l.len(), l.iter()),
            Value::Set(s) => collect_seq(serializer, s.len(), s.iter()),
            Value::Array(a) => collect_seq(serializer, a.len(), a.iter()),
        }
    }
}

fn collect_seq<'a, S, I>(serializer: S, len: usize, items: I) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    I: Iterator<Item = &'a Value>,
{
    let mut out = serializer.serialize_seq(Some(len))?;
    for item in items {
        out.serialize_element(item)?;
    }
    out.end()
}

impl Value {
    /// Converts a JSON document into a persistent tree.
    ///
    /// Integers that fit `i64` become [`Value::Int`], other numbers
    /// [`Value::Float`].
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::from(s.as_str()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect::<List>())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .iter()
                    .map(|(k, v)| (Value::from(k.as_str()), Value::from_json(v)))
                    .collect::<Map>(),
            ),
        }
    }

    /// Serializes the tree into a JSON document.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by `serde_json`.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(&json)
    }
}
