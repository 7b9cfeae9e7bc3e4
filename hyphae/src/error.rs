use core::fmt;

/// Error returned when a bounded collection has no room for another element.
///
/// The rejected value is handed back to the caller, and the collection is
/// left exactly as it was before the failed operation. Operations which move
/// several elements at once (such as [`List::splice_from`]) return a
/// `Full<()>`.
///
/// [`List::splice_from`]: crate::List::splice_from
#[derive(thiserror::Error)]
#[error("collection is at capacity ({capacity} elements)")]
pub struct Full<T = ()> {
    value: T,
    capacity: usize,
}

impl<T> Full<T> {
    pub(crate) const fn new(value: T, capacity: usize) -> Self {
        Self { value, capacity }
    }

    /// Returns the capacity of the collection that rejected the value.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a reference to the rejected value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consumes the error, returning the rejected value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Discards the rejected value, keeping only the capacity.
    #[must_use]
    pub fn forget(self) -> Full {
        Full::new((), self.capacity)
    }
}

// The rejected value is usually not `Debug` (it may well be a boxed closure),
// so don't require it.
impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Full")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
