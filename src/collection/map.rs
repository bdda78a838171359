//! Persistent keyed map.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use im::{HashMap as ImHashMap, OrdMap};

use super::identity::{Identity, WeakKey};
use super::{unordered_hash, Value};

/// Entries ordered by insertion sequence, plus a key index into them.
///
/// Both halves are `im` structures, so cloning the data for an update is
/// O(1) and the update itself only copies the touched tree paths.
#[derive(Clone, Default)]
struct MapData {
    index: ImHashMap<Value, u64>,
    entries: OrdMap<u64, (Value, Value)>,
    next: u64,
}

impl MapData {
    fn insert(&mut self, key: Value, value: Value) {
        match self.index.get(&key) {
            Some(&seq) => {
                self.entries.insert(seq, (key, value));
            }
            None => {
                let seq = self.next;
                self.next += 1;
                self.index.insert(key.clone(), seq);
                self.entries.insert(seq, (key, value));
            }
        }
    }

    fn remove(&mut self, key: &Value) -> bool {
        match self.index.remove(key) {
            Some(seq) => {
                self.entries.remove(&seq);
                true
            }
            None => false,
        }
    }
}

/// Persistent associative container with insertion-ordered keys.
///
/// Updates never touch the receiver: [`Map::set`] and [`Map::remove`] return
/// a new map that shares its structure with the original, and whose
/// unchanged entries are the very same `Value` handles. Keys may be any
/// [`Value`], including other containers, and compare structurally.
///
/// # Examples
///
/// ```rust
/// use immutable_memo::collection::{Map, Value};
///
/// let inner = Map::from_iter([("v", 1)]);
/// let m1 = Map::from_iter([("a", Value::from(inner.clone())), ("b", Value::from(2))]);
/// let m2 = m1.set("b", 3);
///
/// assert_eq!(m1.get(&"b".into()), Some(&Value::Int(2)));
/// assert_eq!(m2.get(&"b".into()), Some(&Value::Int(3)));
///
/// // The untouched child is shared, not copied.
/// assert!(m1.get(&"a".into()).unwrap().ptr_eq(m2.get(&"a".into()).unwrap()));
/// ```
#[derive(Clone, Default)]
pub struct Map(Arc<MapData>);

impl Map {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from entries. A repeated key keeps its first position
    /// and its last value.
    pub(crate) fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut data = MapData::default();
        for (k, v) in entries {
            data.insert(k, v);
        }
        Map(Arc::new(data))
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.entries.is_empty()
    }

    /// Looks up the value stored under `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        let seq = self.0.index.get(key)?;
        self.0.entries.get(seq).map(|(_, v)| v)
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.0.index.contains_key(key)
    }

    /// Returns a new map with `key` bound to `value`.
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn set(&self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        let mut data = (*self.0).clone();
        data.insert(key.into(), value.into());
        Map(Arc::new(data))
    }

    /// Returns a new map without `key`, preserving the order of the rest.
    ///
    /// Removing an absent key returns the same map.
    pub fn remove(&self, key: &Value) -> Self {
        let mut data = (*self.0).clone();
        if data.remove(key) {
            Map(Arc::new(data))
        } else {
            self.clone()
        }
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> + '_ {
        self.0.entries.values().map(|(k, v)| (k, v))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> + '_ {
        self.0.entries.values().map(|(k, _)| k)
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.0.entries.values().map(|(_, v)| v)
    }

    /// Returns `true` if both handles refer to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Map) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub(crate) fn identity(&self) -> Identity {
        Identity::of(&self.0)
    }

    #[inline]
    pub(crate) fn weak_key(&self) -> WeakKey {
        WeakKey::new(&self.0)
    }
}

impl<K, V> FromIterator<(K, V)> for Map
where
    K: Into<Value>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Map::from_entries(iter.into_iter().map(|(k, v)| (k.into(), v.into())))
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v)))
    }
}

impl Eq for Map {}

impl Hash for Map {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_u64(unordered_hash(self.iter()));
    }
}
