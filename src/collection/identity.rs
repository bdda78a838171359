//! Reference identity for shared containers.
//!
//! Every container variant of [`Value`](super::Value) owns its contents through
//! an `Arc`. The address of that allocation is the container's identity: two
//! handles are "the same" container iff they point at the same allocation,
//! regardless of whether their contents compare equal.
//!
//! A [`WeakKey`] is a non-owning handle to such an allocation. It never keeps
//! the contents alive, but it does keep the allocation itself reserved, so an
//! [`Identity`] taken from a live `WeakKey` cannot be handed out to a different
//! container in the meantime.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

/// Address-based identity of a shared container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

impl Identity {
    #[inline]
    pub(crate) fn of<T: ?Sized>(arc: &Arc<T>) -> Self {
        Identity(Arc::as_ptr(arc) as *const () as usize)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Non-owning handle to a container allocation.
///
/// Used as the key side of identity-keyed caches: the handle reports whether
/// the container is still reachable without extending its lifetime.
#[derive(Clone)]
pub struct WeakKey(Weak<dyn Any + Send + Sync>);

impl WeakKey {
    #[inline]
    pub(crate) fn new<T: Any + Send + Sync>(arc: &Arc<T>) -> Self {
        let weak: Weak<T> = Arc::downgrade(arc);
        WeakKey(weak)
    }

    /// Returns `true` while at least one strong handle to the container exists.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Identity of the container this handle was taken from.
    #[inline]
    pub fn identity(&self) -> Identity {
        Identity(self.0.as_ptr() as *const () as usize)
    }
}

impl fmt::Debug for WeakKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakKey")
            .field("identity", &self.identity())
            .field("live", &self.is_live())
            .finish()
    }
}
