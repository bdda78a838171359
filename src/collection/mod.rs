//! Persistent collection model.
//!
//! This module provides the container tree the memoizing transformer works
//! on. Containers are immutable and structurally shared: every "update"
//! returns a new container whose untouched children are the same handles as
//! before. Each container is backed by a single `Arc` allocation whose address
//! is its [`Identity`].
//!
//! # Overview
//!
//! | Variant  | Shape                              | Linearizes as |
//! |----------|------------------------------------|---------------|
//! | `Map`    | persistent keyed map               | keyed         |
//! | `List`   | persistent indexed list            | indexed       |
//! | `Set`    | persistent set                     | set           |
//! | `Seq`    | linearized entry sequence          | its own kind  |
//! | `Array`  | plain ordered array                | indexed       |
//! | `Object` | plain string-keyed record          | keyed         |
//!
//! Scalars (`Null`, `Bool`, `Int`, `Float`, `Str`) carry no identity.
//!
//! # Linearize and reassemble
//!
//! Every container can be turned into a [`Seq`] of entries (`to_seq`,
//! `to_keyed_seq`, `value_seq`) and rebuilt into any container kind
//! (`to_array`, `to_object`, `to_list`, `to_map`). [`Value::try_map_values`]
//! maps entry values while keeping the container's kind. These are the
//! operations the [`transform`](crate::transform) module composes.
//!
//! # Examples
//!
//! ```rust
//! use immutable_memo::collection::{List, Map, Value};
//!
//! let tree = Value::from(Map::from_iter([
//!     ("a", Value::from(Map::from_iter([("v", 1)]))),
//!     ("b", Value::from(Map::from_iter([("v", 2)]))),
//! ]));
//!
//! let values = tree.value_seq().unwrap();
//! assert_eq!(values.len(), 2);
//!
//! let plain = tree.to_plain();
//! assert_eq!(plain.get("a").and_then(|a| a.get("v")), Some(&Value::Int(1)));
//! assert!(List::from_iter([1, 2]).get(0).is_some());
//! ```

mod error;
mod identity;
mod list;
mod map;
mod plain;
mod seq;
mod set;

#[cfg(feature = "serialization")]
mod json;

pub use error::{CollectionError, Result};
pub use identity::{Identity, WeakKey};
pub use list::List;
pub use map::Map;
pub use plain::{Array, Object};
pub use seq::{Seq, SeqKind};
pub use set::Set;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use seq::index_entries;

/// Kind tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Absent value.
    Null,
    /// Boolean scalar.
    Bool,
    /// Integer scalar.
    Int,
    /// Floating point scalar.
    Float,
    /// String scalar.
    Str,
    /// Persistent keyed map.
    Map,
    /// Persistent list.
    List,
    /// Persistent set.
    Set,
    /// Entry sequence.
    Seq,
    /// Plain array.
    Array,
    /// Plain record.
    Object,
}

impl ValueKind {
    /// Lowercase name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
            ValueKind::Map => "map",
            ValueKind::List => "list",
            ValueKind::Set => "set",
            ValueKind::Seq => "seq",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of a collection tree.
///
/// Equality and hashing are structural. Floats compare by bit pattern, so
/// `NaN` equals itself and `0.0` differs from `-0.0`. Map, set and record
/// equality ignore entry order.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating point scalar.
    Float(f64),
    /// String scalar.
    Str(Arc<str>),
    /// Persistent keyed map.
    Map(Map),
    /// Persistent list.
    List(List),
    /// Persistent set.
    Set(Set),
    /// Entry sequence.
    Seq(Seq),
    /// Plain array.
    Array(Array),
    /// Plain record.
    Object(Object),
}

impl Value {
    /// Kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Map(_) => ValueKind::Map,
            Value::List(_) => ValueKind::List,
            Value::Set(_) => ValueKind::Set,
            Value::Seq(_) => ValueKind::Seq,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for container variants.
    #[inline]
    pub fn is_collection(&self) -> bool {
        self.identity().is_some()
    }

    /// Identity of the backing allocation, `None` for scalars.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Value::Map(m) => Some(m.identity()),
            Value::List(l) => Some(l.identity()),
            Value::Set(s) => Some(s.identity()),
            Value::Seq(s) => Some(s.identity()),
            Value::Array(a) => Some(a.identity()),
            Value::Object(o) => Some(o.identity()),
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => {
                None
            }
        }
    }

    /// Non-owning handle to the backing allocation, `None` for scalars.
    pub fn weak_key(&self) -> Option<WeakKey> {
        match self {
            Value::Map(m) => Some(m.weak_key()),
            Value::List(l) => Some(l.weak_key()),
            Value::Set(s) => Some(s.weak_key()),
            Value::Seq(s) => Some(s.weak_key()),
            Value::Array(a) => Some(a.weak_key()),
            Value::Object(o) => Some(o.weak_key()),
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => {
                None
            }
        }
    }

    /// Returns `true` if both values are the same container.
    ///
    /// Scalars have no identity and never compare as the same reference.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Number of entries of a container, `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Map(m) => Some(m.len()),
            Value::List(l) => Some(l.len()),
            Value::Set(s) => Some(s.len()),
            Value::Seq(s) => Some(s.len()),
            Value::Array(a) => Some(a.len()),
            Value::Object(o) => Some(o.len()),
            _ => None,
        }
    }

    /// Returns `true` for empty containers.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Looks up an entry by key.
    ///
    /// Lists and arrays take non-negative integer positions, records take
    /// the key's string form, sets return their stored member.
    pub fn get(&self, key: impl Into<Value>) -> Option<&Value> {
        let key = key.into();
        match self {
            Value::Map(m) => m.get(&key),
            Value::List(l) => key.as_index().and_then(|i| l.get(i)),
            Value::Array(a) => key.as_index().and_then(|i| a.get(i)),
            Value::Object(o) => o.get(&key.to_key_string()),
            Value::Set(s) => s.get(&key),
            Value::Seq(s) => s.get(&key),
            _ => None,
        }
    }

    /// Boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric payload, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The map, if this is one.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// The list, if this is one.
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// The set, if this is one.
    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    /// The sequence, if this is one.
    pub fn as_seq(&self) -> Option<&Seq> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    /// The array, if this is one.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The record, if this is one.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    fn as_index(&self) -> Option<usize> {
        match self {
            Value::Int(i) => usize::try_from(*i).ok(),
            _ => None,
        }
    }

    /// String form used when a key lands in a record.
    ///
    /// Strings are used verbatim; every other value uses its `Display` form.
    pub fn to_key_string(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            other => other.to_string(),
        }
    }

    /// Structural hash of this value.
    pub fn hash_code(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }

    fn not_a_collection(&self) -> CollectionError {
        CollectionError::NotACollection(self.kind())
    }

    /// Entries as `(key, value)` pairs, keyed per the container's flavour.
    fn keyed_entries(&self) -> Result<Vec<(Value, Value)>> {
        match self {
            Value::Map(m) => Ok(m.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            Value::List(l) => Ok(index_entries(l.iter().cloned())),
            Value::Array(a) => Ok(index_entries(a.iter().cloned())),
            Value::Set(s) => Ok(s.iter().map(|v| (v.clone(), v.clone())).collect()),
            Value::Seq(s) => Ok(s.entries().to_vec()),
            Value::Object(o) => Ok(o
                .iter()
                .map(|(k, v)| (Value::from(k.as_str()), v.clone()))
                .collect()),
            _ => Err(self.not_a_collection()),
        }
    }

    /// Entry values in order.
    fn entry_values(&self) -> Result<Vec<Value>> {
        match self {
            Value::Map(m) => Ok(m.values().cloned().collect()),
            Value::List(l) => Ok(l.iter().cloned().collect()),
            Value::Array(a) => Ok(a.as_slice().to_vec()),
            Value::Set(s) => Ok(s.iter().cloned().collect()),
            Value::Seq(s) => Ok(s.values().cloned().collect()),
            Value::Object(o) => Ok(o.iter().map(|(_, v)| v.clone()).collect()),
            _ => Err(self.not_a_collection()),
        }
    }

    /// Linearizes into a sequence that keeps the container's flavour.
    ///
    /// Maps and records become keyed, lists and arrays indexed, sets stay
    /// sets. A sequence is returned as is.
    pub fn to_seq(&self) -> Result<Seq> {
        let kind = match self {
            Value::Seq(s) => return Ok(s.clone()),
            Value::Map(_) | Value::Object(_) => SeqKind::Keyed,
            Value::List(_) | Value::Array(_) => SeqKind::Indexed,
            Value::Set(_) => SeqKind::Set,
            _ => return Err(self.not_a_collection()),
        };
        Ok(Seq::from_entries(kind, self.keyed_entries()?))
    }

    /// Linearizes into a keyed sequence of `(key, value)` entries.
    ///
    /// Positions become integer keys; set members key themselves.
    pub fn to_keyed_seq(&self) -> Result<Seq> {
        Ok(Seq::from_entries(SeqKind::Keyed, self.keyed_entries()?))
    }

    /// Linearizes into an indexed sequence of values, dropping keys.
    pub fn value_seq(&self) -> Result<Seq> {
        Ok(Seq::from_entries(
            SeqKind::Indexed,
            index_entries(self.entry_values()?.into_iter()),
        ))
    }

    /// Reassembles entry values into a plain [`Array`].
    pub fn to_array(&self) -> Result<Array> {
        Ok(Array::from_vec(self.entry_values()?))
    }

    /// Reassembles entry values into a persistent [`List`].
    pub fn to_list(&self) -> Result<List> {
        Ok(self.entry_values()?.into_iter().collect())
    }

    /// Reassembles entries into a plain [`Object`].
    ///
    /// Keys are converted with [`Value::to_key_string`]; a later entry
    /// overwrites an earlier one with the same string key.
    pub fn to_object(&self) -> Result<Object> {
        let entries = self.keyed_entries()?;
        let mut fields = IndexMap::with_capacity(entries.len());
        for (k, v) in entries {
            fields.insert(k.to_key_string(), v);
        }
        Ok(Object::from_index_map(fields))
    }

    /// Reassembles entries into a persistent [`Map`].
    pub fn to_map(&self) -> Result<Map> {
        Ok(Map::from_entries(self.keyed_entries()?))
    }

    /// Maps every entry value through `f`, keeping the container's kind.
    ///
    /// Keys are preserved, except for sets and set sequences where a member
    /// is its own key. Mapping stops at the first error.
    ///
    /// # Errors
    ///
    /// Returns `CollectionError::NotACollection` (converted into `E`) for
    /// scalars, or the first error produced by `f`.
    pub fn try_map_values<F, E>(&self, mut f: F) -> std::result::Result<Value, E>
    where
        F: FnMut(&Value) -> std::result::Result<Value, E>,
        E: From<CollectionError>,
    {
        match self {
            Value::Map(m) => {
                let mut out = Vec::with_capacity(m.len());
                for (k, v) in m.iter() {
                    out.push((k.clone(), f(v)?));
                }
                Ok(Value::Map(Map::from_entries(out)))
            }
            Value::List(l) => {
                let items = l.iter().map(&mut f).collect::<std::result::Result<_, E>>()?;
                Ok(Value::List(List::from_vector(items)))
            }
            Value::Array(a) => {
                let items = a.iter().map(&mut f).collect::<std::result::Result<_, E>>()?;
                Ok(Value::Array(Array::from_vec(items)))
            }
            Value::Set(s) => {
                let mut out = Vec::with_capacity(s.len());
                for v in s.iter() {
                    out.push(f(v)?);
                }
                Ok(Value::Set(Set::from_iter(out)))
            }
            Value::Seq(s) => {
                let mut out = Vec::with_capacity(s.len());
                for (k, v) in s.iter() {
                    let mapped = f(v)?;
                    let key = match s.kind() {
                        SeqKind::Set => mapped.clone(),
                        SeqKind::Keyed | SeqKind::Indexed => k.clone(),
                    };
                    out.push((key, mapped));
                }
                Ok(Value::Seq(Seq::from_entries(s.kind(), out)))
            }
            Value::Object(o) => {
                let mut out = IndexMap::with_capacity(o.len());
                for (k, v) in o.iter() {
                    out.insert(k.clone(), f(v)?);
                }
                Ok(Value::Object(Object::from_index_map(out)))
            }
            _ => Err(self.not_a_collection().into()),
        }
    }

    /// Deeply converts the tree into plain containers.
    ///
    /// Maps, records and keyed sequences become [`Object`]s; lists, sets,
    /// arrays and the other sequences become [`Array`]s. Every call builds a
    /// fresh tree.
    pub fn to_plain(&self) -> Value {
        match self {
            Value::Map(m) => Value::Object(Object::from_index_map(
                m.iter()
                    .map(|(k, v)| (k.to_key_string(), v.to_plain()))
                    .collect(),
            )),
            Value::Object(o) => Value::Object(Object::from_index_map(
                o.iter().map(|(k, v)| (k.clone(), v.to_plain())).collect(),
            )),
            Value::Seq(s) if s.kind() == SeqKind::Keyed => {
                Value::Object(Object::from_index_map(
                    s.iter()
                        .map(|(k, v)| (k.to_key_string(), v.to_plain()))
                        .collect(),
                ))
            }
            Value::Seq(s) => Value::Array(Array::from_vec(s.values().map(Value::to_plain).collect())),
            Value::List(l) => Value::Array(Array::from_vec(l.iter().map(Value::to_plain).collect())),
            Value::Set(s) => Value::Array(Array::from_vec(s.iter().map(Value::to_plain).collect())),
            Value::Array(a) => Value::Array(Array::from_vec(a.iter().map(Value::to_plain).collect())),
            scalar => scalar.clone(),
        }
    }
}

/// Order-independent combination of element hashes.
pub(crate) fn unordered_hash<I>(items: I) -> u64
where
    I: IntoIterator,
    I::Item: Hash,
{
    items.into_iter().fold(0u64, |acc, item| {
        let mut hasher = FxHasher::default();
        item.hash(&mut hasher);
        acc.wrapping_add(hasher.finish())
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::Map(m) => m.hash(state),
            Value::List(l) => l.hash(state),
            Value::Set(s) => s.hash(state),
            Value::Seq(s) => s.hash(state),
            Value::Array(a) => a.hash(state),
            Value::Object(o) => o.hash(state),
        }
    }
}

fn write_items<'a, I>(f: &mut fmt::Formatter<'_>, open: &str, close: &str, items: I) -> fmt::Result
where
    I: Iterator<Item = &'a Value>,
{
    f.write_str(open)?;
    let mut first = true;
    for item in items {
        f.write_str(if first { " " } else { ", " })?;
        write!(f, "{}", item)?;
        first = false;
    }
    if !first {
        f.write_str(" ")?;
    }
    f.write_str(close)
}

fn write_entries<'a, K, I>(f: &mut fmt::Formatter<'_>, open: &str, entries: I) -> fmt::Result
where
    K: fmt::Display + 'a,
    I: Iterator<Item = (K, &'a Value)>,
{
    f.write_str(open)?;
    let mut first = true;
    for (k, v) in entries {
        f.write_str(if first { " " } else { ", " })?;
        write!(f, "{}: {}", k, v)?;
        first = false;
    }
    if !first {
        f.write_str(" ")?;
    }
    f.write_str("}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Map(m) => write_entries(f, "Map {", m.iter()),
            Value::List(l) => write_items(f, "List [", "]", l.iter()),
            Value::Set(s) => write_items(f, "Set {", "}", s.iter()),
            Value::Seq(s) => match s.kind() {
                SeqKind::Keyed => write_entries(f, "Seq {", s.iter()),
                SeqKind::Indexed => write_items(f, "Seq [", "]", s.values()),
                SeqKind::Set => write_items(f, "Seq {", "}", s.values()),
            },
            Value::Array(a) => write_items(f, "[", "]", a.iter()),
            Value::Object(o) => write_entries(f, "{", o.iter().map(|(k, v)| (format!("{:?}", k), v))),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Value::Str(s)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

macro_rules! impl_from_container {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for Value {
                fn from(c: $ty) -> Self {
                    Value::$ty(c)
                }
            }
        )*
    };
}

impl_from_container!(Map, List, Set, Seq, Array, Object);
