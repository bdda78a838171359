//! Persistent set.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use im::{HashMap as ImHashMap, OrdMap};

use super::identity::{Identity, WeakKey};
use super::{unordered_hash, Value};

/// Members ordered by insertion sequence, plus an index into them.
#[derive(Clone, Default)]
struct SetData {
    index: ImHashMap<Value, u64>,
    members: OrdMap<u64, Value>,
    next: u64,
}

impl SetData {
    fn insert(&mut self, value: Value) -> bool {
        if self.index.contains_key(&value) {
            return false;
        }
        let seq = self.next;
        self.next += 1;
        self.index.insert(value.clone(), seq);
        self.members.insert(seq, value);
        true
    }
}

/// Persistent set of unique values, iterated in insertion order.
///
/// Updates share structure with the original through `im` maps.
#[derive(Clone, Default)]
pub struct Set(Arc<SetData>);

impl Set {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.members.len()
    }

    /// Returns `true` if the set has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.members.is_empty()
    }

    /// Returns `true` if a member equal to `value` is present.
    #[inline]
    pub fn contains(&self, value: &Value) -> bool {
        self.0.index.contains_key(value)
    }

    /// The stored member equal to `value`.
    pub fn get(&self, value: &Value) -> Option<&Value> {
        let seq = self.0.index.get(value)?;
        self.0.members.get(seq)
    }

    /// Returns a new set that also contains `value`.
    ///
    /// Inserting a present member returns the same set.
    pub fn insert(&self, value: impl Into<Value>) -> Self {
        let mut data = (*self.0).clone();
        if data.insert(value.into()) {
            Set(Arc::new(data))
        } else {
            self.clone()
        }
    }

    /// Returns a new set without `value`.
    pub fn remove(&self, value: &Value) -> Self {
        let mut data = (*self.0).clone();
        match data.index.remove(value) {
            Some(seq) => {
                data.members.remove(&seq);
                Set(Arc::new(data))
            }
            None => self.clone(),
        }
    }

    /// Iterates over members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> + '_ {
        self.0.members.values()
    }

    /// Returns `true` if both handles refer to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Set) -> bool {
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

impl<T: Into<Value>> FromIterator<T> for Set {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut data = SetData::default();
        for value in iter {
            data.insert(value.into());
        }
        Set(Arc::new(data))
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.len() == other.len() && self.iter().all(|v| other.contains(v)))
    }
}

impl Eq for Set {}

impl Hash for Set {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        state.write_u64(unordered_hash(self.iter()));
    }
}
