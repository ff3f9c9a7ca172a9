//! Reference-counted storage for heap-backed values.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Shared, immutable-by-default storage for a heap-backed value.
///
/// The constructor is `pub(super)`: values are built through the factory
/// methods on `Value`, never by wrapping an `Arc` by hand. Cloning a `Heap`
/// shares the allocation, which is what lets a pattern binding refer to a
/// payload without copying it.
#[repr(transparent)]
pub struct Heap<T>(Arc<T>);

impl<T> Heap<T> {
    #[inline]
    pub(super) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }

    /// Whether two handles share one allocation.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T: Clone> Heap<T> {
    /// Mutable access, cloning the contents first if the allocation is shared.
    #[inline]
    pub(super) fn make_mut(&mut self) -> &mut T {
        Arc::make_mut(&mut self.0)
    }
}

impl<T> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> AsRef<T> for Heap<T> {
    #[inline]
    fn as_ref(&self) -> &T {
        &self.0
    }
}

impl<T: PartialEq> PartialEq for Heap<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl<T: Eq> Eq for Heap<T> {}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests;
