//! # immutable-memo
//!
//! Memoized, identity-keyed transforms over persistent collection trees.
//!
//! Persistent collections share every untouched subtree between versions.
//! A [`MemoizedTransform`](transform::MemoizedTransform) exploits that: it
//! caches each result under the identity of the container it came from, so
//! transforming the next version of a tree only recomputes the containers
//! that were actually replaced. Cache entries hold weak handles to their
//! keys and never keep a source container alive.
//!
//! ## Example
//!
//! ```rust
//! use immutable_memo::prelude::*;
//!
//! let mut to_plain = memoize_transform(|v: &Value| v.to_plain(), TargetMode::Object);
//!
//! let users = Value::from(Map::from_iter([
//!     ("ada", Value::from(Map::from_iter([("born", 1815)]))),
//!     ("alan", Value::from(Map::from_iter([("born", 1912)]))),
//! ]));
//!
//! let first = to_plain.call(&users).unwrap();
//! let again = to_plain.call(&users).unwrap();
//! assert!(first.ptr_eq(&again));
//! assert_eq!(first.get("ada").and_then(|u| u.get("born")), Some(&Value::Int(1815)));
//! ```
//!
//! ## Features
//!
//! - `sync`: [`SharedMemoizedTransform`](transform::SharedMemoizedTransform),
//!   a cloneable handle backed by `parking_lot`.
//! - `serialization`: `serde` support and JSON conversion for [`Value`](collection::Value).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod collection;
pub mod transform;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::cache::{CacheStats, IdentityCache};
    pub use crate::collection::{
        Array, CollectionError, List, Map, Object, Seq, SeqKind, Set, Value, ValueKind,
    };
    pub use crate::transform::{
        memoize_transform, try_memoize_transform, LeafFn, LeafTransform, MemoizedTransform,
        TargetMode, TransformBuilder, TryLeafFn,
    };

    #[cfg(feature = "sync")]
    pub use crate::transform::SharedMemoizedTransform;
}
