//! Linearized entry sequences.
//!
//! A [`Seq`] is the uniform intermediate form every container can be
//! linearized into: an ordered run of `(key, value)` entries tagged with the
//! flavour of container it came from. Reassembly operations (`to_array`,
//! `to_map`, ...) consume sequences, and a sequence is itself a valid output
//! container.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::identity::{Identity, WeakKey};
use super::Value;

/// Flavour of a [`Seq`], mirroring the container it was linearized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqKind {
    /// Entries carry meaningful keys (linearized maps and records).
    Keyed,
    /// Keys are positions `0..len`.
    Indexed,
    /// Each entry's key is the value itself.
    Set,
}

impl fmt::Display for SeqKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeqKind::Keyed => f.write_str("keyed"),
            SeqKind::Indexed => f.write_str("indexed"),
            SeqKind::Set => f.write_str("set"),
        }
    }
}

#[derive(Debug)]
struct SeqData {
    kind: SeqKind,
    entries: Vec<(Value, Value)>,
}

/// Ordered sequence of `(key, value)` entries.
///
/// # Examples
///
/// ```rust
/// use immutable_memo::collection::{Seq, SeqKind, Value};
///
/// let seq = Seq::indexed([Value::from("a"), Value::from("b")]);
/// assert_eq!(seq.kind(), SeqKind::Indexed);
/// assert_eq!(seq.get(&Value::Int(1)), Some(&Value::from("b")));
/// ```
#[derive(Debug, Clone)]
pub struct Seq(Arc<SeqData>);

impl Seq {
    pub(crate) fn from_entries(kind: SeqKind, entries: Vec<(Value, Value)>) -> Self {
        Seq(Arc::new(SeqData { kind, entries }))
    }

    /// Builds a keyed sequence from `(key, value)` pairs.
    pub fn keyed<K, V, I>(entries: I) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Seq::from_entries(
            SeqKind::Keyed,
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds an indexed sequence, keying each value by its position.
    pub fn indexed<V, I>(values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Seq::from_entries(SeqKind::Indexed, index_entries(values.into_iter().map(Into::into)))
    }

    /// Flavour of this sequence.
    #[inline]
    pub fn kind(&self) -> SeqKind {
        self.0.kind
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.entries.len()
    }

    /// Returns `true` if the sequence has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.entries.is_empty()
    }

    /// Value of the first entry whose key equals `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterates over `(key, value)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> + '_ {
        self.0.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates over keys.
    pub fn keys(&self) -> impl Iterator<Item = &Value> + '_ {
        self.0.entries.iter().map(|(k, _)| k)
    }

    /// Iterates over values.
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.0.entries.iter().map(|(_, v)| v)
    }

    pub(crate) fn entries(&self) -> &[(Value, Value)] {
        &self.0.entries
    }

    /// Returns `true` if both handles refer to the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Seq) -> bool {
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

pub(crate) fn index_entries<I>(values: I) -> Vec<(Value, Value)>
where
    I: Iterator<Item = Value>,
{
    values
        .enumerate()
        .map(|(i, v)| (Value::from(i), v))
        .collect()
}

impl PartialEq for Seq {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.kind() == other.kind() && self.entries() == other.entries())
    }
}

impl Eq for Seq {}

impl Hash for Seq {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.entries().hash(state);
    }
}
