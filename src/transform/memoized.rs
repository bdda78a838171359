//! The memoizing transform engine.

use tracing::trace;

use super::leaf::LeafTransform;
use super::mode::{Pipeline, TargetMode};
use crate::cache::{CacheStats, IdentityCache};
use crate::collection::Value;

/// Memoizing transform over collection trees.
///
/// Owns a single [`IdentityCache`] for its whole lifetime. Two independently
/// constructed transforms never share entries.
///
/// # Call contract
///
/// 1. `Null` passes through untouched and is never cached.
/// 2. A container already in the cache returns its cached result without
///    any traversal.
/// 3. Otherwise the container is linearized, each entry value goes through
///    [`map_contents`](Self::map_contents), the mapped entries are
///    reassembled per the [`TargetMode`], and the result is cached under the
///    container's identity.
///
/// Entry values are handed to the leaf transform directly; they do not
/// re-enter the mode pipeline. A leaf that wants to descend further does so
/// itself.
///
/// # Cache lifetime
///
/// Entries never keep their source containers alive, but the results of
/// dead entries stay allocated until the cache sweeps. That happens while
/// new results are inserted; a transform that goes idle after its input
/// tree was dropped should call [`purge_dead`](Self::purge_dead) to release
/// them.
///
/// # Examples
///
/// ```rust
/// use immutable_memo::collection::{Map, Value};
/// use immutable_memo::transform::{memoize_transform, TargetMode};
///
/// let mut double = memoize_transform(
///     |v: &Value| Value::Int(v.get("v").and_then(Value::as_i64).unwrap_or(0) * 2),
///     TargetMode::Object,
/// );
///
/// let data = Value::from(Map::from_iter([
///     ("a", Value::from(Map::from_iter([("v", 1)]))),
///     ("b", Value::from(Map::from_iter([("v", 2)]))),
/// ]));
///
/// let first = double.call(&data).unwrap();
/// assert_eq!(first.get("a"), Some(&Value::Int(2)));
/// assert_eq!(first.get("b"), Some(&Value::Int(4)));
///
/// // Same input container, same output container.
/// assert!(double.call(&data).unwrap().ptr_eq(&first));
/// ```
#[derive(Debug)]
pub struct MemoizedTransform<T> {
    leaf: T,
    mode: TargetMode,
    pipeline: Pipeline,
    cache: IdentityCache,
}

impl<T: LeafTransform> MemoizedTransform<T> {
    /// Creates a transform around `leaf` producing `mode`-shaped output.
    pub fn new(leaf: T, mode: impl Into<TargetMode>) -> Self {
        Self::with_cache(leaf, mode.into(), IdentityCache::new())
    }

    pub(crate) fn with_cache(leaf: T, mode: TargetMode, cache: IdentityCache) -> Self {
        Self {
            leaf,
            mode,
            pipeline: mode.pipeline(),
            cache,
        }
    }

    /// Transforms `value`, reusing cached results by identity.
    ///
    /// # Errors
    ///
    /// Returns the leaf transform's error unchanged, or a collection error
    /// (converted into `T::Error`) when `value` is a scalar that the mode
    /// cannot linearize. Nothing is cached for a failed call.
    pub fn call(&mut self, value: &Value) -> Result<Value, T::Error> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if let Some(hit) = self.cache.get(value) {
            return Ok(hit);
        }
        trace!(kind = %value.kind(), mode = %self.mode, "memoized transform miss");

        let linear = self.pipeline.linearize(value)?;
        let (leaf, cache) = (&mut self.leaf, &mut self.cache);
        let mapped = linear.try_map_values(|entry| map_contents(cache, leaf, entry))?;
        let transformed = self.pipeline.reassemble(&mapped)?;

        self.cache.insert(value, transformed.clone());
        Ok(transformed)
    }

    /// Like [`call`](Self::call), with absence passed through as `None`.
    pub fn call_opt(&mut self, value: Option<&Value>) -> Result<Option<Value>, T::Error> {
        value.map(|v| self.call(v)).transpose()
    }

    /// The per-entry step: cached leaf application.
    ///
    /// `Null` passes through, a cached value is returned as is, anything else
    /// goes straight to the leaf transform and its result is cached when the
    /// value has an identity. Scalars have none, so they reach the leaf on
    /// every call.
    pub fn map_contents(&mut self, value: &Value) -> Result<Value, T::Error> {
        map_contents(&mut self.cache, &mut self.leaf, value)
    }

    /// Converts the transform into a plain closure.
    pub fn into_fn(mut self) -> impl FnMut(&Value) -> Result<Value, T::Error> {
        move |value: &Value| self.call(value)
    }
}

impl<T> MemoizedTransform<T> {
    /// Target mode this transform reassembles into.
    #[inline]
    pub fn mode(&self) -> TargetMode {
        self.mode
    }

    /// The cache owned by this transform.
    #[inline]
    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    /// Cache activity counters.
    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drops cache entries whose source containers are gone.
    ///
    /// Returns the number of entries removed.
    pub fn purge_dead(&mut self) -> usize {
        self.cache.purge_dead()
    }
}

fn map_contents<T: LeafTransform>(
    cache: &mut IdentityCache,
    leaf: &mut T,
    value: &Value,
) -> Result<Value, T::Error> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    if let Some(hit) = cache.get(value) {
        return Ok(hit);
    }
    let transformed = leaf.apply(value)?;
    cache.insert(value, transformed.clone());
    Ok(transformed)
}
