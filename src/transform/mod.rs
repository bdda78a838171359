//! Memoizing transforms over collection trees.
//!
//! A transform wraps a caller-supplied [`LeafTransform`] and a [`TargetMode`].
//! Calling it on a container linearizes the container, maps every entry value
//! through the cached leaf step, and reassembles the mapped entries into the
//! mode's output shape. Results are cached by container identity, so feeding
//! the next version of a persistent tree only pays for the parts that changed.
//!
//! # Recursion
//!
//! The engine goes exactly one level deep. Entry values reach the leaf
//! directly and never re-enter the mode pipeline; a leaf that wants to
//! descend does so on its own. Each entry value is still cached under its
//! own identity, which is what makes unchanged siblings free on the next
//! call:
//!
//! ```text
//! call(root) ──► linearize ──► map_contents(entry) ──► leaf(entry)
//!      │                             │                      │
//!      │                       cache hit? ◄─── cache ◄──────┘
//!      ▼
//! reassemble ──► cache[root]
//! ```
//!
//! # Examples
//!
//! ```rust
//! use immutable_memo::collection::{Map, Value};
//! use immutable_memo::transform::memoize_transform;
//!
//! let mut to_plain = memoize_transform(|v: &Value| v.to_plain(), "object");
//!
//! let v1 = Value::from(Map::from_iter([
//!     ("a", Value::from(Map::from_iter([("x", 1)]))),
//!     ("b", Value::from(Map::from_iter([("x", 2)]))),
//! ]));
//! let out1 = to_plain.call(&v1).unwrap();
//!
//! // Replace one entry; the other keeps its identity.
//! let v2 = Value::from(v1.as_map().unwrap().set("b", Map::from_iter([("x", 3)])));
//! let out2 = to_plain.call(&v2).unwrap();
//!
//! assert!(out2.get("a").unwrap().ptr_eq(out1.get("a").unwrap()));
//! assert!(!out2.get("b").unwrap().ptr_eq(out1.get("b").unwrap()));
//! ```

mod builder;
mod leaf;
mod memoized;
mod mode;
#[cfg(feature = "sync")]
mod shared;

pub use builder::{BuilderError, TransformBuilder};
pub use leaf::{LeafFn, LeafTransform, TryLeafFn};
pub use memoized::MemoizedTransform;
pub use mode::{Pipeline, Step, TargetMode};
#[cfg(feature = "sync")]
pub use shared::SharedMemoizedTransform;

use crate::collection::{CollectionError, Value};

/// Creates a memoized transform from an infallible leaf closure.
///
/// `mode` accepts a [`TargetMode`], a mode name, or `None`; unknown names
/// select [`TargetMode::Same`].
pub fn memoize_transform<F>(f: F, mode: impl Into<TargetMode>) -> MemoizedTransform<LeafFn<F>>
where
    F: FnMut(&Value) -> Value,
{
    MemoizedTransform::new(LeafFn::new(f), mode)
}

/// Creates a memoized transform from a fallible leaf closure.
///
/// Leaf errors propagate out of [`MemoizedTransform::call`] unchanged.
pub fn try_memoize_transform<F, E>(
    f: F,
    mode: impl Into<TargetMode>,
) -> MemoizedTransform<TryLeafFn<F>>
where
    F: FnMut(&Value) -> Result<Value, E>,
    E: From<CollectionError>,
{
    MemoizedTransform::new(TryLeafFn::new(f), mode)
}
