//! A priority queue built on a [`SortedList`].

use crate::{list, Full, SortedList};
use core::fmt;

/// A first-in, highest-priority-out queue.
///
/// Elements are dequeued in the order given by the queue's `is_before`
/// predicate (see [`SortedList`]). Elements which rank equally are dequeued
/// in the order they were enqueued.
///
/// # Examples
///
/// ```
/// use hyphae::PriorityQueue;
///
/// let mut queue = PriorityQueue::new_min();
/// for val in [5, 1, 3] {
///     queue.enqueue(val).unwrap();
/// }
///
/// assert_eq!(queue.peek(), Some(&1));
/// assert_eq!(queue.dequeue(), Some(1));
/// assert_eq!(queue.dequeue(), Some(3));
/// assert_eq!(queue.dequeue(), Some(5));
/// assert_eq!(queue.dequeue(), None);
/// ```
pub struct PriorityQueue<T, F = fn(&T, &T) -> bool> {
    list: SortedList<T, F>,
}

impl<T: Ord> PriorityQueue<T> {
    /// Returns a new, empty queue which dequeues the **least** element first.
    #[must_use]
    pub fn new_min() -> Self {
        Self {
            list: SortedList::new_min(),
        }
    }

    /// Returns a new, empty queue which dequeues the **greatest** element
    /// first.
    #[must_use]
    pub fn new_max() -> Self {
        Self {
            list: SortedList::new_max(),
        }
    }
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    /// Returns a new, empty queue ordered by `is_before`.
    #[must_use]
    pub fn new_with(is_before: F) -> Self {
        Self {
            list: SortedList::new_with(is_before),
        }
    }

    /// Returns a new, empty queue ordered by `is_before`, which holds at most
    /// `capacity` elements.
    #[must_use]
    pub fn bounded_with(capacity: usize, is_before: F) -> Self {
        Self {
            list: SortedList::bounded_with(capacity, is_before),
        }
    }

    /// Returns the number of queued elements. This is _O_(_n_).
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if nothing is queued. This is _O_(1).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns the maximum number of elements this queue may hold, or `None`
    /// if it is unbounded.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.list.capacity()
    }

    /// Adds `value` to the queue.
    ///
    /// # Errors
    ///
    /// If the queue is bounded and full, `value` is handed back in a [`Full`]
    /// error.
    pub fn enqueue(&mut self, value: T) -> Result<(), Full<T>> {
        self.list.insert(value).map(|_| ())
    }

    /// Removes and returns the highest-priority element, if there is one.
    pub fn dequeue(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    /// Returns a reference to the element [`dequeue`](Self::dequeue) would
    /// return next.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.list.front()
    }

    /// Removes the first element (in priority order) matching `predicate`,
    /// returning it.
    pub fn remove(&mut self, predicate: impl FnMut(&T) -> bool) -> Option<T> {
        let found = self
            .list
            .find_if(self.list.begin(), self.list.end(), predicate);
        self.list.remove(found).map(|(value, _)| value)
    }

    /// Returns `true` if any queued element matches `predicate`.
    #[must_use]
    pub fn contains(&self, predicate: impl FnMut(&T) -> bool) -> bool {
        let end = self.list.end();
        self.list.find_if(self.list.begin(), end, predicate) != end
    }

    /// Drops every queued element.
    pub fn clear(&mut self) {
        while self.list.pop_front().is_some() {}
    }

    /// Iterates over the queued elements in the order they would be
    /// dequeued.
    #[must_use]
    pub fn iter(&self) -> list::Iter<'_, T> {
        self.list.iter()
    }

    /// Asserts that the queue is in priority order and that the list beneath
    /// it is well-formed.
    #[track_caller]
    pub fn assert_valid(&self) {
        self.list.assert_valid()
    }
}

impl<T: fmt::Debug, F> fmt::Debug for PriorityQueue<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("list", &self.list)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::trace_init;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        vec::Vec,
    };

    #[test]
    fn dequeue_in_priority_order() {
        let _trace = trace_init();

        let mut queue = PriorityQueue::new_min();
        for val in [5, 1, 3] {
            queue.enqueue(val).unwrap();
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(3));
        assert_eq!(queue.dequeue(), Some(5));
        assert_eq!(queue.dequeue(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn max_first() {
        let mut queue = PriorityQueue::new_max();
        for val in [5, 1, 3, 9] {
            queue.enqueue(val).unwrap();
        }
        assert_eq!(queue.peek(), Some(&9));
        let drained: Vec<_> = core::iter::from_fn(|| queue.dequeue()).collect();
        assert_eq!(drained, [9, 5, 3, 1]);
    }

    #[test]
    fn fifo_among_equals() {
        let _trace = trace_init();

        let mut queue = PriorityQueue::new_with(|a: &(u8, &str), b: &(u8, &str)| a.0 > b.0);
        queue.enqueue((1, "low")).unwrap();
        queue.enqueue((2, "first")).unwrap();
        queue.enqueue((2, "second")).unwrap();
        queue.enqueue((2, "third")).unwrap();
        queue.assert_valid();

        assert_eq!(queue.dequeue(), Some((2, "first")));
        assert_eq!(queue.dequeue(), Some((2, "second")));
        assert_eq!(queue.dequeue(), Some((2, "third")));
        assert_eq!(queue.dequeue(), Some((1, "low")));
    }

    #[test]
    fn remove_matching() {
        let _trace = trace_init();

        let mut queue = PriorityQueue::new_min();
        for val in [4, 8, 15, 16, 23, 42] {
            queue.enqueue(val).unwrap();
        }

        assert_eq!(queue.remove(|val| val % 2 == 1), Some(15));
        assert_eq!(queue.remove(|val| *val > 100), None);
        assert!(queue.contains(|val| *val == 23));
        assert!(!queue.contains(|val| *val == 15));
        queue.assert_valid();
        assert!(queue.iter().copied().eq([4, 8, 16, 23, 42]));
    }

    #[test]
    fn bounded() {
        let mut queue = PriorityQueue::bounded_with(2, |a: &u32, b: &u32| a < b);
        assert_eq!(queue.capacity(), Some(2));
        queue.enqueue(2).unwrap();
        queue.enqueue(1).unwrap();

        let err = queue.enqueue(0).unwrap_err();
        assert_eq!(err.capacity(), 2);
        assert_eq!(err.into_inner(), 0);

        // dequeuing makes room
        assert_eq!(queue.dequeue(), Some(1));
        queue.enqueue(0).unwrap();
        assert_eq!(queue.peek(), Some(&0));
    }

    #[test]
    fn clear_drops_everything() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct Counted(u32);
        impl Drop for Counted {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::Relaxed);
            }
        }

        let mut queue = PriorityQueue::new_with(|a: &Counted, b: &Counted| a.0 < b.0);
        for val in 0..5 {
            queue.enqueue(Counted(val)).unwrap();
        }
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(DROPS.load(Ordering::Relaxed), 5);

        // still usable afterwards
        queue.enqueue(Counted(7)).unwrap();
        assert_eq!(queue.peek().map(|c| c.0), Some(7));
    }

    #[test]
    fn unlimited_bound() {
        let mut queue = PriorityQueue::bounded_with(usize::MAX, |a: &u32, b: &u32| a < b);
        assert_eq!(queue.capacity(), Some(usize::MAX));
        for val in [3, 1, 2] {
            queue.enqueue(val).unwrap();
        }
        assert!(queue.iter().copied().eq([1, 2, 3]));
    }

    #[cfg(not(miri))]
    mod fuzz {
        use super::*;
        use proptest::collection::vec;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Enqueue(u8),
            Dequeue,
            Remove(u8),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..8).prop_map(Op::Enqueue),
                Just(Op::Dequeue),
                (0u8..8).prop_map(Op::Remove),
            ]
        }

        proptest! {
            #[test]
            fn fuzz_queue(ops in vec(op(), 0..100)) {
                let _trace = trace_init();
                tracing::info!(?ops);

                let mut queue =
                    PriorityQueue::new_with(|a: &(u8, usize), b: &(u8, usize)| a.0 < b.0);
                // kept in dequeue order
                let mut reference: Vec<(u8, usize)> = Vec::new();

                for (seq, op) in ops.into_iter().enumerate() {
                    match op {
                        Op::Enqueue(key) => {
                            queue.enqueue((key, seq)).unwrap();
                            let idx = reference.partition_point(|&(k, _)| k <= key);
                            reference.insert(idx, (key, seq));
                        }
                        Op::Dequeue => {
                            let expected = (!reference.is_empty()).then(|| reference.remove(0));
                            prop_assert_eq!(queue.dequeue(), expected);
                        }
                        Op::Remove(key) => {
                            let expected = reference
                                .iter()
                                .position(|&(k, _)| k == key)
                                .map(|idx| reference.remove(idx));
                            prop_assert_eq!(queue.remove(|&(k, _)| k == key), expected);
                        }
                    }

                    queue.assert_valid();
                    prop_assert_eq!(queue.len(), reference.len());
                    prop_assert_eq!(queue.is_empty(), reference.is_empty());
                    prop_assert_eq!(queue.is_empty(), queue.len() == 0);
                    prop_assert_eq!(queue.peek(), reference.first());
                    prop_assert!(queue.iter().eq(reference.iter()));
                }
            }
        }
    }
}
