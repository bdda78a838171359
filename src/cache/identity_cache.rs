//! Weak, identity-keyed result cache.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     IdentityCache                             │
//! │  entries: FxHashMap<Identity, CacheEntry>                     │
//! │                                                               │
//! │   Identity ──► CacheEntry { key: WeakKey, value: Value }      │
//! │                              │                                │
//! │                              └─ non-owning: the source        │
//! │                                 container may still be freed  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys compare by allocation address, never by contents. Each entry holds a
//! [`WeakKey`] to its source container: the weak handle reserves the address,
//! so while an entry exists no other container can be allocated at the same
//! place and be mistaken for its key.
//!
//! Once every strong handle to a key is gone the entry is dead. Dead entries
//! are dropped by a sweep that runs when the table grows past a threshold
//! (the threshold then resets to twice the surviving population, so sweeping
//! stays amortized O(1) per insert), or explicitly through
//! [`IdentityCache::purge_dead`]. Sweeps only happen on those two paths: a
//! cache that stops receiving inserts keeps its dead entries, and their
//! results, until `purge_dead` is called.
//!
//! A result that *is* its key (an identity leaf transform) is not stored at
//! all; the entry only records that fact and a hit hands back the caller's
//! own handle. Dropping one dead entry can release the last handle to the
//! keys of others, so a sweep repeats until a pass removes nothing.
//!
//! # Limitations
//!
//! A cached result that holds a strong handle to its key somewhere *inside*
//! it (for example a list wrapping the key) keeps that key alive for as long
//! as the entry exists.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::collection::{Identity, Value, WeakKey};

/// Default table size that triggers the first sweep of dead entries.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 64;

/// Counters describing cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups of containers that had no entry.
    pub misses: u64,
    /// Entries stored.
    pub inserts: u64,
    /// Dead entries removed by sweeps.
    pub purged: u64,
}

impl CacheStats {
    /// Fraction of container lookups answered from the cache.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[derive(Debug)]
enum Cached {
    Value(Value),
    /// The result was the key container itself.
    Key,
}

#[derive(Debug)]
struct CacheEntry {
    key: WeakKey,
    value: Cached,
}

/// Identity-keyed cache whose entries never keep their keys alive.
///
/// Scalars have no identity and are never stored.
///
/// # Examples
///
/// ```rust
/// use immutable_memo::cache::IdentityCache;
/// use immutable_memo::collection::{Map, Value};
///
/// let mut cache = IdentityCache::new();
/// let key = Value::from(Map::from_iter([("v", 1)]));
///
/// cache.insert(&key, Value::Int(2));
/// assert_eq!(cache.get(&key), Some(Value::Int(2)));
///
/// // Equal contents, different container: no hit.
/// let lookalike = Value::from(Map::from_iter([("v", 1)]));
/// assert_eq!(cache.get(&lookalike), None);
///
/// drop(key);
/// assert_eq!(cache.purge_dead(), 1);
/// assert!(cache.is_empty());
/// ```
#[derive(Debug)]
pub struct IdentityCache {
    entries: FxHashMap<Identity, CacheEntry>,
    min_sweep_threshold: usize,
    sweep_at: usize,
    stats: CacheStats,
}

impl IdentityCache {
    /// Creates an empty cache with the default sweep threshold.
    pub fn new() -> Self {
        Self::with_sweep_threshold(DEFAULT_SWEEP_THRESHOLD)
    }

    /// Creates an empty cache that first sweeps at `threshold` entries.
    ///
    /// A threshold of zero is treated as one.
    pub fn with_sweep_threshold(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            entries: FxHashMap::default(),
            min_sweep_threshold: threshold,
            sweep_at: threshold,
            stats: CacheStats::default(),
        }
    }

    /// Cached result for `key`'s identity.
    ///
    /// Returns `None` for scalars and for containers without an entry.
    pub fn get(&mut self, key: &Value) -> Option<Value> {
        let identity = key.identity()?;
        match self.entries.get(&identity) {
            Some(entry) => {
                // The caller's handle keeps the key alive, and the entry's weak
                // handle pinned the address, so this is the same container.
                debug_assert!(entry.key.is_live());
                self.stats.hits += 1;
                match &entry.value {
                    Cached::Value(value) => Some(value.clone()),
                    Cached::Key => Some(key.clone()),
                }
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Returns `true` if `key` has an entry. Does not touch the counters.
    pub fn contains(&self, key: &Value) -> bool {
        key.identity()
            .is_some_and(|identity| self.entries.contains_key(&identity))
    }

    /// Stores `value` as the result for `key`'s identity.
    ///
    /// Returns `false` without storing anything when `key` is a scalar.
    pub fn insert(&mut self, key: &Value, value: Value) -> bool {
        let Some(weak) = key.weak_key() else {
            return false;
        };
        if self.entries.len() >= self.sweep_at {
            self.sweep();
        }
        let value = if value.ptr_eq(key) {
            Cached::Key
        } else {
            Cached::Value(value)
        };
        self.entries.insert(weak.identity(), CacheEntry { key: weak, value });
        self.stats.inserts += 1;
        true
    }

    /// Drops every entry whose key is no longer reachable.
    ///
    /// Returns the number of entries removed.
    pub fn purge_dead(&mut self) -> usize {
        self.sweep()
    }

    fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        loop {
            let pass = self.entries.len();
            self.entries.retain(|_, entry| entry.key.is_live());
            if self.entries.len() == pass {
                break;
            }
        }
        let purged = before - self.entries.len();

        self.stats.purged += purged as u64;
        self.sweep_at = (self.entries.len() * 2).max(self.min_sweep_threshold);
        trace!(
            purged,
            live = self.entries.len(),
            next_sweep = self.sweep_at,
            "swept identity cache"
        );
        purged
    }

    /// Number of stored entries, including dead ones not yet swept.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries whose key is still reachable.
    pub fn live_len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.key.is_live())
            .count()
    }

    /// Activity counters.
    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new()
    }
}
