//! A sorted, doubly-linked list.
//!
//! See the documentation for the [`SortedList`] type for details.

use crate::{
    list::{self, List, NodeId},
    Full,
};
use core::{fmt, ops::ControlFlow};

/// A doubly-linked list which keeps its elements sorted.
///
/// Ordering is decided by an `is_before` predicate, which returns `true` if
/// its first argument ranks strictly ahead of its second. Any context the
/// predicate needs is captured by the predicate itself, so it may be a plain
/// function pointer or a closure.
///
/// * Consider using [`SortedList::new_min()`] if `T: Ord` and you want the
///   **smallest** items first.
/// * Consider using [`SortedList::new_max()`] if `T: Ord` and you want the
///   **largest** items first.
/// * Otherwise, use [`SortedList::new_with()`] to provide your own ordering.
///
/// Insertion is an _O_(_n_) operation, and removing an element (given its
/// [`NodeId`]) or popping either end is _O_(1).
///
/// Sorting is *stable*: if two elements rank equally, the one inserted later
/// is placed after the one inserted earlier.
///
/// # Examples
///
/// ```
/// use hyphae::SortedList;
///
/// // sort strings by length, breaking no ties
/// let mut list = SortedList::new_with(|a: &&str, b: &&str| a.len() < b.len());
/// for word in ["ccc", "a", "bb", "dd", "e"] {
///     list.insert(word).unwrap();
/// }
///
/// assert!(list.iter().copied().eq(["a", "e", "bb", "dd", "ccc"]));
/// ```
pub struct SortedList<T, F = fn(&T, &T) -> bool> {
    list: List<T>,
    is_before: F,
}

fn less<T: Ord>(a: &T, b: &T) -> bool {
    a < b
}

fn greater<T: Ord>(a: &T, b: &T) -> bool {
    // Inverted sort order!
    a > b
}

impl<T: Ord> SortedList<T> {
    /// Create a new (empty) sorted list, sorted LEAST FIRST
    #[must_use]
    pub fn new_min() -> Self {
        Self::new_with(less::<T>)
    }

    /// Create a new (empty) sorted list, sorted GREATEST FIRST
    #[must_use]
    pub fn new_max() -> Self {
        Self::new_with(greater::<T>)
    }
}

impl<T, F> SortedList<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    /// Create a new (empty) sorted list with the given ordering predicate.
    ///
    /// `is_before(a, b)` must return `true` if `a` should be placed strictly
    /// ahead of `b`.
    #[must_use]
    pub fn new_with(is_before: F) -> Self {
        Self {
            list: List::new(),
            is_before,
        }
    }

    /// Create a new (empty) sorted list with the given ordering predicate,
    /// which holds at most `capacity` elements.
    #[must_use]
    pub fn bounded_with(capacity: usize, is_before: F) -> Self {
        Self {
            list: List::bounded(capacity),
            is_before,
        }
    }

    /// Returns the number of elements in the list. This is _O_(_n_).
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the list is empty. This is _O_(1).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns the maximum number of elements this list may hold, or `None` if
    /// it is unbounded.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.list.capacity()
    }

    /// Insert a single item into the list, in its sorted position.
    ///
    /// The new item is placed after every item it does not rank strictly
    /// ahead of, so equally-ranked items keep their insertion order.
    ///
    /// This is an _O_(_n_) operation.
    ///
    /// # Errors
    ///
    /// If the list is bounded and full, the item is handed back in a [`Full`]
    /// error and the list is unchanged.
    pub fn insert(&mut self, value: T) -> Result<NodeId, Full<T>> {
        let end = self.list.end();
        let mut at = self.list.begin();
        while at != end {
            match self.list.get(at) {
                Some(curr) if !(self.is_before)(&value, curr) => at = self.list.next(at),
                _ => break,
            }
        }

        test_trace!(?at, "SortedList::insert");
        self.list.insert(at, value)
    }

    /// Removes the element at `at`, returning it along with a handle to the
    /// element that followed it.
    ///
    /// Returns `None` if `at` is [`SortedList::end`] or a stale handle. This is
    /// an _O_(1) operation.
    pub fn remove(&mut self, at: NodeId) -> Option<(T, NodeId)> {
        self.list.erase(at)
    }

    /// Pop the front-most item from the list, returning it by ownership (if it
    /// exists).
    ///
    /// Note that "front" here refers to the sorted ordering: this is the item
    /// that every other item ranks behind. This is an _O_(1) operation.
    pub fn pop_front(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    /// Pop the back-most item from the list, returning it by ownership (if it
    /// exists). This is an _O_(1) operation.
    pub fn pop_back(&mut self) -> Option<T> {
        self.list.pop_back()
    }

    /// Returns a reference to the front-most item, if there is one.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.list.front()
    }

    /// Returns a reference to the back-most item, if there is one.
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.list.back()
    }

    /// Returns a handle to the first element, or [`SortedList::end`] if the
    /// list is empty.
    #[must_use]
    pub fn begin(&self) -> NodeId {
        self.list.begin()
    }

    /// Returns a handle one past the last element.
    #[must_use]
    pub fn end(&self) -> NodeId {
        self.list.end()
    }

    /// Returns the node following `at`. See [`List::next`].
    #[must_use]
    #[track_caller]
    pub fn next(&self, at: NodeId) -> NodeId {
        self.list.next(at)
    }

    /// Returns the node preceding `at`. See [`List::prev`].
    #[must_use]
    #[track_caller]
    pub fn prev(&self, at: NodeId) -> NodeId {
        self.list.prev(at)
    }

    /// Returns a reference to the element at `at`.
    ///
    /// There is no `get_mut`: mutating an element in place could break the
    /// list's ordering. Remove and re-insert it instead.
    #[must_use]
    pub fn get(&self, at: NodeId) -> Option<&T> {
        self.list.get(at)
    }

    /// Returns the first node in `[from, to)` whose element ranks equally
    /// with `target`, or `to` if there is none.
    ///
    /// Because the list is sorted, the search gives up as soon as it passes
    /// the position where such an element would be.
    #[must_use]
    pub fn find(&self, from: NodeId, to: NodeId, target: &T) -> NodeId {
        let mut at = from;
        while at != to {
            let Some(curr) = self.list.get(at) else {
                break;
            };
            if !(self.is_before)(curr, target) {
                if !(self.is_before)(target, curr) {
                    return at;
                }
                break;
            }
            at = self.list.next(at);
        }
        to
    }

    /// Returns the first node in `[from, to)` whose element matches
    /// `predicate`, or `to` if there is none.
    #[must_use]
    pub fn find_if(&self, from: NodeId, to: NodeId, predicate: impl FnMut(&T) -> bool) -> NodeId {
        self.list.find(from, to, predicate)
    }

    /// Calls `f` with every element in `[from, to)`, stopping at the first
    /// [`ControlFlow::Break`]. See [`List::for_each`].
    pub fn for_each<B>(
        &self,
        from: NodeId,
        to: NodeId,
        f: impl FnMut(&T) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        self.list.for_each(from, to, f)
    }

    /// Moves every element of `src` into this list, leaving `src` empty.
    ///
    /// Elements are popped from the front of `src` and inserted one at a time,
    /// so this is _O_(_n_ × _m_), and elements from `src` that rank equally
    /// with elements already in `self` end up after them.
    ///
    /// # Errors
    ///
    /// If `self` is bounded and fills up, the element that did not fit is put
    /// back at the front of `src` and a [`Full`] error is returned. Elements
    /// moved before that point stay in `self`.
    pub fn merge<G>(&mut self, src: &mut SortedList<T, G>) -> Result<(), Full>
    where
        G: Fn(&T, &T) -> bool,
    {
        while let Some(value) = src.pop_front() {
            if let Err(full) = self.insert(value) {
                let capacity = full.capacity();
                // `src` just gave up this slot, so it has room to take it back.
                let restored = src.list.push_front(full.into_inner());
                debug_assert!(restored.is_ok(), "popped element must fit back into its list");
                test_trace!(capacity, "SortedList::merge -> full");
                return Err(Full::new((), capacity));
            }
        }

        Ok(())
    }

    /// Iterate through the items of the list, in sorted order.
    #[must_use]
    pub fn iter(&self) -> list::Iter<'_, T> {
        self.list.iter()
    }

    /// Iterate through the items in `[from, to)`, in sorted order.
    #[must_use]
    pub fn range(&self, from: NodeId, to: NodeId) -> list::Iter<'_, T> {
        self.list.range(from, to)
    }

    /// Asserts the underlying list's structure, and that no element ranks
    /// strictly ahead of the element before it.
    #[track_caller]
    pub fn assert_valid(&self) {
        self.list.assert_valid();

        let mut iter = self.list.iter();
        let Some(mut prev) = iter.next() else {
            return;
        };
        for (i, curr) in iter.enumerate() {
            assert!(
                !(self.is_before)(curr, prev),
                "element {} ranks ahead of the element before it",
                i + 1
            );
            prev = curr;
        }
    }
}

impl<T: Ord> FromIterator<T> for SortedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut slist = Self::new_min();
        for value in iter {
            // an unbounded list is never full
            let _ = slist.insert(value);
        }
        slist
    }
}

impl<'a, T, F> IntoIterator for &'a SortedList<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    type Item = &'a T;
    type IntoIter = list::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug, F> fmt::Debug for SortedList<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { list, is_before: _ } = self;
        f.debug_struct("SortedList").field("list", list).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::trace_init;
    use std::vec::Vec;

    const UNSORTED: [i32; 8] = [20, 10, 30, 25, 35, 1, 2, 3];

    fn check_drain<F: Fn(&i32, &i32) -> bool>(slist: &mut SortedList<i32, F>, expected: &[i32]) {
        // Does iteration work (twice)?
        for _ in 0..2 {
            let mut ct = 0;
            for (l, r) in expected.iter().zip(slist.iter()) {
                ct += 1;
                assert_eq!(l, r);
            }
            assert_eq!(ct, expected.len());
        }

        // Does draining work (once)?
        for exp in expected {
            assert_eq!(Some(*exp), slist.pop_front());
        }
        assert!(slist.pop_front().is_none());
        assert!(slist.is_empty());
    }

    #[test]
    fn builtin_sort_min() {
        let _trace = trace_init();
        let mut slist = SortedList::new_min();
        for val in UNSORTED {
            slist.insert(val).unwrap();
            slist.assert_valid();
        }
        assert_eq!(slist.len(), UNSORTED.len());
        check_drain(&mut slist, &[1, 2, 3, 10, 20, 25, 30, 35]);
    }

    #[test]
    fn builtin_sort_max() {
        let _trace = trace_init();
        let mut slist = SortedList::new_max();
        for val in UNSORTED {
            slist.insert(val).unwrap();
            slist.assert_valid();
        }
        // expected is in order (reverse!)
        check_drain(&mut slist, &[35, 30, 25, 20, 10, 3, 2, 1]);
    }

    #[test]
    fn closure_captures_context() {
        let _trace = trace_init();

        // rank by distance from a pivot held by the predicate
        let pivot = 12;
        let mut slist = SortedList::new_with(move |a: &i32, b: &i32| {
            (a - pivot).abs() < (b - pivot).abs()
        });
        for val in UNSORTED {
            slist.insert(val).unwrap();
        }
        slist.assert_valid();
        check_drain(&mut slist, &[10, 20, 3, 2, 1, 25, 30, 35]);
    }

    #[test]
    fn equal_ranks_keep_insertion_order() {
        let _trace = trace_init();

        let mut slist = SortedList::new_with(|a: &(u8, char), b: &(u8, char)| a.0 < b.0);
        for entry in [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (2, 'e'), (0, 'f')] {
            slist.insert(entry).unwrap();
        }
        slist.assert_valid();

        let order: Vec<char> = slist.iter().map(|&(_, c)| c).collect();
        assert_eq!(order, ['f', 'b', 'd', 'a', 'c', 'e']);
    }

    #[test]
    fn remove_returns_next() {
        let _trace = trace_init();

        let mut slist = SortedList::new_min();
        let ten = slist.insert(10).unwrap();
        let thirty = slist.insert(30).unwrap();
        let twenty = slist.insert(20).unwrap();

        assert_eq!(slist.remove(twenty), Some((20, thirty)));
        slist.assert_valid();

        // `ten` was never touched, so its handle is still good
        assert_eq!(slist.get(ten), Some(&10));
        assert_eq!(slist.next(ten), thirty);
        assert_eq!(slist.remove(slist.end()), None);
        assert_eq!(slist.pop_back(), Some(30));
        assert_eq!(slist.pop_back(), Some(10));
        assert_eq!(slist.pop_back(), None);
    }

    #[test]
    fn find_by_rank() {
        let _trace = trace_init();

        let slist: SortedList<i32> = UNSORTED.into_iter().collect();
        let (begin, end) = (slist.begin(), slist.end());

        let found = slist.find(begin, end, &25);
        assert_eq!(slist.get(found), Some(&25));

        // 11 would sit between 10 and 20; the search stops there
        assert_eq!(slist.find(begin, end, &11), end);
        assert_eq!(slist.find(begin, end, &100), end);

        // a match past `to` is not found
        let twenty = slist.find(begin, end, &20);
        assert_eq!(slist.find(begin, twenty, &30), twenty);
    }

    #[test]
    fn find_if() {
        let _trace = trace_init();

        let slist: SortedList<i32> = UNSORTED.into_iter().collect();
        let (begin, end) = (slist.begin(), slist.end());

        let even = slist.find_if(begin, end, |val| val % 2 == 0);
        assert_eq!(slist.get(even), Some(&2));
        assert_eq!(slist.find_if(begin, end, |val| *val > 35), end);

        let visited = slist.for_each(begin, end, |val| {
            if *val > 20 {
                ControlFlow::Break(*val)
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(visited, ControlFlow::Break(25));
    }

    #[test]
    fn merge() {
        let _trace = trace_init();

        let mut dest = SortedList::new_with(|a: &(u8, char), b: &(u8, char)| a.0 < b.0);
        let mut src = SortedList::new_with(|a: &(u8, char), b: &(u8, char)| a.0 < b.0);
        for entry in [(1, 'a'), (3, 'b'), (5, 'c')] {
            dest.insert(entry).unwrap();
        }
        for entry in [(0, 'x'), (3, 'y'), (6, 'z')] {
            src.insert(entry).unwrap();
        }

        dest.merge(&mut src).unwrap();
        assert!(src.is_empty());
        dest.assert_valid();
        src.assert_valid();

        let order: Vec<char> = dest.iter().map(|&(_, c)| c).collect();
        // 'y' ranks equal to 'b' and lands after it
        assert_eq!(order, ['x', 'a', 'b', 'y', 'c', 'z']);
    }

    #[test]
    fn merge_into_full() {
        let _trace = trace_init();

        let mut dest = SortedList::bounded_with(4, less::<i32>);
        let mut src = SortedList::new_min();
        for val in [10, 20] {
            dest.insert(val).unwrap();
        }
        for val in [5, 15, 25, 35] {
            src.insert(val).unwrap();
        }

        let err = dest.merge(&mut src).unwrap_err();
        assert_eq!(err.capacity(), 4);
        dest.assert_valid();
        src.assert_valid();

        assert!(dest.iter().copied().eq([5, 10, 15, 20]));
        assert!(src.iter().copied().eq([25, 35]), "the rejected element is put back");
    }

    #[test]
    fn bounded_insert() {
        let mut slist = SortedList::bounded_with(2, less::<i32>);
        slist.insert(2).unwrap();
        slist.insert(1).unwrap();
        let err = slist.insert(0).unwrap_err();
        assert_eq!(err.into_inner(), 0);
        assert!(slist.iter().copied().eq([1, 2]));
    }

    #[cfg(not(miri))]
    mod fuzz {
        use super::*;
        use proptest::collection::vec;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fuzz_sorted(ops in vec((any::<bool>(), 0u8..16, any::<usize>()), 0..100)) {
                let _trace = trace_init();
                tracing::info!(?ops);

                let mut slist = SortedList::new_with(|a: &(u8, usize), b: &(u8, usize)| a.0 < b.0);
                let mut reference: Vec<(u8, usize)> = Vec::new();

                for (seq, (insert, key, n)) in ops.into_iter().enumerate() {
                    if insert || reference.is_empty() {
                        slist.insert((key, seq)).unwrap();
                        // stable: after every element that is not strictly greater
                        let idx = reference.partition_point(|&(k, _)| k <= key);
                        reference.insert(idx, (key, seq));
                    } else {
                        let idx = n % reference.len();
                        let expected = reference.remove(idx);
                        let mut at = slist.begin();
                        for _ in 0..idx {
                            at = slist.next(at);
                        }
                        prop_assert_eq!(slist.remove(at).map(|(v, _)| v), Some(expected));
                    }

                    slist.assert_valid();
                    prop_assert_eq!(slist.len(), reference.len());
                    prop_assert_eq!(slist.is_empty(), slist.len() == 0);
                    prop_assert!(slist.iter().eq(reference.iter()));
                }
            }
        }
    }
}
