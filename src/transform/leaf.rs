//! Leaf transform seam.

use crate::collection::{CollectionError, Value};

/// The caller-supplied step applied to every entry value a transform reaches.
///
/// Implementations should be pure with respect to identity: a memoized
/// transform calls `apply` at most once per distinct container and reuses
/// the result afterwards.
pub trait LeafTransform {
    /// Error type surfaced by [`MemoizedTransform::call`].
    ///
    /// Collection failures raised by the engine itself convert into it.
    ///
    /// [`MemoizedTransform::call`]: super::MemoizedTransform::call
    type Error: From<CollectionError>;

    /// Transforms a single value.
    fn apply(&mut self, value: &Value) -> Result<Value, Self::Error>;
}

/// Adapter for leaf closures that cannot fail.
#[derive(Debug, Clone)]
pub struct LeafFn<F>(F);

impl<F> LeafFn<F>
where
    F: FnMut(&Value) -> Value,
{
    /// Wraps an infallible closure.
    pub fn new(f: F) -> Self {
        LeafFn(f)
    }
}

impl<F> LeafTransform for LeafFn<F>
where
    F: FnMut(&Value) -> Value,
{
    type Error = CollectionError;

    #[inline]
    fn apply(&mut self, value: &Value) -> Result<Value, CollectionError> {
        Ok((self.0)(value))
    }
}

/// Adapter for fallible leaf closures.
///
/// Errors returned by the closure reach the caller unchanged.
#[derive(Debug, Clone)]
pub struct TryLeafFn<F>(F);

impl<F, E> TryLeafFn<F>
where
    F: FnMut(&Value) -> Result<Value, E>,
    E: From<CollectionError>,
{
    /// Wraps a fallible closure.
    pub fn new(f: F) -> Self {
        TryLeafFn(f)
    }
}

impl<F, E> LeafTransform for TryLeafFn<F>
where
    F: FnMut(&Value) -> Result<Value, E>,
    E: From<CollectionError>,
{
    type Error = E;

    #[inline]
    fn apply(&mut self, value: &Value) -> Result<Value, E> {
        (self.0)(value)
    }
}
