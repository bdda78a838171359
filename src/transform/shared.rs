//! Thread-safe handle to a memoized transform.
//!
//! Enabled by the `sync` feature.

use std::sync::Arc;

use parking_lot::Mutex;

use super::leaf::LeafTransform;
use super::memoized::MemoizedTransform;
use super::mode::TargetMode;
use crate::cache::CacheStats;
use crate::collection::Value;

/// Cloneable, lock-protected [`MemoizedTransform`].
///
/// Every clone shares one cache. Calls are serialized through a
/// `parking_lot::Mutex`, so a leaf transform must not call back into the same
/// shared transform: the lock is not reentrant and the call would deadlock.
///
/// # Examples
///
/// ```rust
/// use immutable_memo::collection::{List, Value};
/// use immutable_memo::transform::{LeafFn, SharedMemoizedTransform, TargetMode};
///
/// let shared = SharedMemoizedTransform::new(LeafFn::new(|v: &Value| v.to_plain()), TargetMode::Array);
/// let data = Value::from(List::from_iter([Value::from(List::from_iter([1, 2]))]));
///
/// let worker = shared.clone();
/// let handle = std::thread::spawn(move || worker.call(&data).unwrap());
/// let out = handle.join().unwrap();
///
/// assert_eq!(out.len(), Some(1));
/// assert_eq!(shared.stats().inserts, 2);
/// ```
pub struct SharedMemoizedTransform<T> {
    inner: Arc<Mutex<MemoizedTransform<T>>>,
}

impl<T: LeafTransform> SharedMemoizedTransform<T> {
    /// Creates a shared transform around `leaf` producing `mode`-shaped output.
    pub fn new(leaf: T, mode: impl Into<TargetMode>) -> Self {
        Self::from_transform(MemoizedTransform::new(leaf, mode))
    }

    /// Wraps an existing transform, keeping its cache.
    pub fn from_transform(transform: MemoizedTransform<T>) -> Self {
        SharedMemoizedTransform {
            inner: Arc::new(Mutex::new(transform)),
        }
    }

    /// Transforms `value` while holding the lock.
    ///
    /// See [`MemoizedTransform::call`].
    pub fn call(&self, value: &Value) -> Result<Value, T::Error> {
        self.inner.lock().call(value)
    }
}

impl<T> SharedMemoizedTransform<T> {
    /// Target mode of the wrapped transform.
    pub fn mode(&self) -> TargetMode {
        self.inner.lock().mode()
    }

    /// Cache activity counters of the shared cache.
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    /// Drops dead entries from the shared cache.
    pub fn purge_dead(&self) -> usize {
        self.inner.lock().purge_dead()
    }
}

impl<T> Clone for SharedMemoizedTransform<T> {
    fn clone(&self) -> Self {
        SharedMemoizedTransform {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for SharedMemoizedTransform<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedMemoizedTransform")
            .field("clones", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{List, Map};
    use crate::transform::LeafFn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_clones_share_one_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let shared = SharedMemoizedTransform::new(
            LeafFn::new(move |v: &Value| {
                counter.fetch_add(1, Ordering::SeqCst);
                v.to_plain()
            }),
            TargetMode::Object,
        );
        let data = Value::from(Map::from_iter([
            ("a", Value::from(List::from_iter([1]))),
            ("b", Value::from(List::from_iter([2]))),
        ]));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let worker = shared.clone();
                let input = data.clone();
                thread::spawn(move || worker.call(&input).unwrap())
            })
            .collect();
        let results: Vec<Value> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(results.windows(2).all(|w| w[0].ptr_eq(&w[1])));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(shared.stats().inserts, 3);
    }

    #[test]
    fn test_purge_through_handle() {
        let shared = SharedMemoizedTransform::new(LeafFn::new(|v: &Value| v.to_plain()), "list");
        {
            let temp = Value::from(List::from_iter([Value::from(List::from_iter([1]))]));
            shared.call(&temp).unwrap();
        }

        assert_eq!(shared.mode(), TargetMode::List);
        assert_eq!(shared.purge_dead(), 2);
    }
}
