//! Persistent indexed list.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use im::Vector;

use super::identity::{Identity, WeakKey};
use super::Value;

/// Persistent ordered container addressed by position.
///
/// Backed by an [`im::Vector`]: [`List::push`] and [`List::set`] copy only the
/// path to the touched element and share the rest with the original.
///
/// # Examples
///
/// ```rust
/// use immutable_memo::collection::{List, Value};
///
/// let l1 = List::from_iter([1, 2]);
/// let l2 = l1.push(3);
///
/// assert_eq!(l1.len(), 2);
/// assert_eq!(l2.get(2), Some(&Value::Int(3)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct List(Arc<Vector<Value>>);

impl List {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_vector(items: Vector<Value>) -> Self {
        List(Arc::new(items))
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the list has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Element at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Returns a new list with `value` appended.
    pub fn push(&self, value: impl Into<Value>) -> Self {
        let mut items = (*self.0).clone();
        items.push_back(value.into());
        List::from_vector(items)
    }

    /// Returns a new list with `index` replaced by `value`.
    ///
    /// Setting past the end pads the gap with [`Value::Null`].
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Self {
        let mut items = (*self.0).clone();
        while items.len() <= index {
            items.push_back(Value::Null);
        }
        items.set(index, value.into());
        List::from_vector(items)
    }

    /// Iterates over elements in order.
    pub fn iter(&self) -> im::vector::Iter<'_, Value> {
        self.0.iter()
    }

    /// Returns `true` if both handles refer to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &List) -> bool {
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

impl<T: Into<Value>> FromIterator<T> for List {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        List::from_vector(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = im::vector::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.len() == other.len() && self.iter().eq(other.iter()))
    }
}

impl Eq for List {}

impl Hash for List {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for item in self.iter() {
            item.hash(state);
        }
    }
}
