//! Builder pattern for creating MemoizedTransform instances.
//!
//! The `TransformBuilder` provides a fluent API for constructing
//! `MemoizedTransform` instances with optional configuration and validation.

use super::leaf::LeafTransform;
use super::memoized::MemoizedTransform;
use super::mode::TargetMode;
use crate::cache::{IdentityCache, DEFAULT_SWEEP_THRESHOLD};

/// Builder for constructing a `MemoizedTransform` with a fluent API.
///
/// # Example
///
/// ```rust
/// use immutable_memo::collection::Value;
/// use immutable_memo::transform::{LeafFn, TargetMode, TransformBuilder};
///
/// let transform = TransformBuilder::new()
///     .leaf(LeafFn::new(|v: &Value| v.to_plain()))
///     .mode(TargetMode::Object)
///     .sweep_threshold(1024)
///     .build()
///     .unwrap();
///
/// assert_eq!(transform.mode(), TargetMode::Object);
/// ```
pub struct TransformBuilder<T> {
    leaf: Option<T>,
    mode: TargetMode,
    sweep_threshold: usize,
}

/// Error type for builder validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    /// No leaf transform was provided
    #[error("Leaf transform is required. Use .leaf() to set it.")]
    MissingLeaf,
}

impl<T: LeafTransform> TransformBuilder<T> {
    /// Create a new builder targeting [`TargetMode::Same`].
    pub fn new() -> Self {
        TransformBuilder {
            leaf: None,
            mode: TargetMode::Same,
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
        }
    }

    /// Set the leaf transform applied to every entry value.
    pub fn leaf(mut self, leaf: T) -> Self {
        self.leaf = Some(leaf);
        self
    }

    /// Set the output mode. Accepts a [`TargetMode`] or a mode name.
    ///
    /// Unknown names select [`TargetMode::Same`].
    pub fn mode(mut self, mode: impl Into<TargetMode>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Set the cache size at which dead entries are first swept.
    pub fn sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold;
        self
    }

    /// Build the `MemoizedTransform`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::MissingLeaf`] if no leaf transform was set.
    pub fn build(self) -> Result<MemoizedTransform<T>, BuilderError> {
        let leaf = self.leaf.ok_or(BuilderError::MissingLeaf)?;
        let cache = IdentityCache::with_sweep_threshold(self.sweep_threshold);

        Ok(MemoizedTransform::with_cache(leaf, self.mode, cache))
    }
}

impl<T: LeafTransform> Default for TransformBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
