//! Plain output containers.
//!
//! [`Array`] and [`Object`] are the "host" shapes transformations usually
//! target: a flat vector and a string-keyed record. They are immutable and
//! shared like the persistent containers, so a memoized result can be handed
//! out repeatedly while keeping its identity.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;

use super::identity::{Identity, WeakKey};
use super::{unordered_hash, Value};

/// Plain ordered array.
#[derive(Debug, Clone, Default)]
pub struct Array(Arc<Vec<Value>>);

impl Array {
    /// Creates an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_vec(items: Vec<Value>) -> Self {
        Array(Arc::new(items))
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the array has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Element at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Iterates over elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// Elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Returns `true` if both handles refer to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Array) -> bool {
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

impl<T: Into<Value>> FromIterator<T> for Array {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Array::from_vec(iter.into_iter().map(Into::into).collect())
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl Eq for Array {}

impl Hash for Array {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_slice().hash(state);
    }
}

/// Plain record with string keys in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Object(Arc<IndexMap<String, Value>>);

impl Object {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_index_map(fields: IndexMap<String, Value>) -> Self {
        Object(Arc::new(fields))
    }

    /// Number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the record has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field value by name.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if the field exists.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Iterates over field names.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns `true` if both handles refer to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Object) -> bool {
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

impl<K, V> FromIterator<(K, V)> for Object
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Object::from_index_map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl Eq for Object {}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_u64(unordered_hash(self.iter()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_lookup() {
        let obj = Object::from_iter([("a", 2), ("b", 4)]);

        assert_eq!(obj.get("a"), Some(&Value::Int(2)));
        assert!(obj.contains_key("b"));
        assert!(!obj.contains_key("c"));
    }

    #[test]
    fn test_array_equality_is_structural() {
        let a1 = Array::from_iter([1, 2]);
        let a2 = Array::from_iter([1, 2]);

        assert_eq!(a1, a2);
        assert!(!a1.ptr_eq(&a2));
    }
}
