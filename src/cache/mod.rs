//! Identity-keyed caching for collection transforms.
//!
//! This module provides the cache a [`MemoizedTransform`] owns. Results are
//! keyed by the *identity* of the source container (the address of its shared
//! allocation), not by its contents, and entries hold only weak handles to
//! their keys.
//!
//! # Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     MemoizedTransform<T>                         │
//! │  ┌──────────────────────────────────────────────────────────┐  │
//! │  │  leaf: T          pipeline: (linearize, reassemble)      │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! │                              │                                   │
//! │                              ▼                                   │
//! │  ┌──────────────────────────────────────────────────────────┐  │
//! │  │                    IdentityCache                          │  │
//! │  │     Identity ──► (WeakKey, cached result)                 │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Lifetime of entries
//!
//! - An entry is created the first time its key passes through a transform.
//! - It is never removed while the key is reachable.
//! - Once the key is dropped everywhere else, the entry is dead; the next
//!   sweep drops it and a later call with a new container recomputes.
//!
//! # Examples
//!
//! ```rust
//! use immutable_memo::cache::IdentityCache;
//! use immutable_memo::collection::{List, Value};
//!
//! let mut cache = IdentityCache::with_sweep_threshold(16);
//! let key = Value::from(List::from_iter([1, 2, 3]));
//!
//! assert!(cache.insert(&key, Value::Int(6)));
//! assert_eq!(cache.get(&key), Some(Value::Int(6)));
//! assert_eq!(cache.stats().hits, 1);
//! ```
//!
//! [`MemoizedTransform`]: crate::transform::MemoizedTransform

mod identity_cache;

pub use identity_cache::{CacheStats, IdentityCache, DEFAULT_SWEEP_THRESHOLD};
