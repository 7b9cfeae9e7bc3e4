//! A doubly-linked list with permanent sentinel nodes.
//!
//! See the [`List`] type for details.
use crate::{util::FmtOption, Full};
use core::{fmt, iter::FusedIterator, ops::ControlFlow};
use slab::Slab;

/// A doubly-linked list whose boundaries are marked by two permanent
/// *sentinel* nodes.
///
/// Every element lives in a node owned by the list. Nodes are stored in an
/// arena, and links between them are arena keys rather than pointers, so a
/// [`NodeId`] handle returned by an insertion stays valid until *that* node is
/// removed, no matter what else happens to the list in the meantime.
///
/// The head sentinel sits before the first element and the tail sentinel
/// after the last one. [`List::begin`] returns the first element (or the tail
/// sentinel, if the list is empty) and [`List::end`] always returns the tail
/// sentinel. Ranges passed to [`List::for_each`], [`List::find`] and
/// [`List::splice`] are half-open: `[from, to)`.
///
/// Sentinels never hold data and can never be removed: [`List::erase`] returns
/// `None` when handed one.
///
/// # Capacity
///
/// A list created with [`List::new`] grows without bound. A list created with
/// [`List::bounded`] holds at most `capacity` elements; inserting into a full
/// list fails with [`Full`], which hands the rejected value back to the
/// caller and leaves the list untouched.
///
/// # Examples
///
/// ```
/// use hyphae::List;
///
/// let mut list = List::new();
/// list.push_back(2).unwrap();
/// list.push_back(3).unwrap();
/// let one = list.push_front(1).unwrap();
///
/// // insert before an arbitrary node, in O(1)
/// list.insert(one, 0).unwrap();
/// assert!(list.iter().copied().eq([0, 1, 2, 3]));
///
/// // erasing returns the removed value and the position that followed it
/// let (val, next) = list.erase(one).unwrap();
/// assert_eq!(val, 1);
/// assert_eq!(list.get(next), Some(&2));
/// ```
pub struct List<T> {
    nodes: Slab<Node<T>>,
    capacity: Option<usize>,
    /// Generation given to the next allocated node.
    next_gen: u64,
}

/// A handle to a node in a [`List`].
///
/// A `NodeId` is only meaningful for the list that returned it. It is
/// invalidated when the node it refers to is removed from the list, and
/// remains valid across any other insertion or removal.
///
/// Arena slots are reused, so every handle also records the generation of
/// the node it was issued for. A stale handle never matches the node that
/// later occupies its slot: lookups through it return `None`, and
/// navigation through it panics.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId {
    key: usize,
    gen: u64,
}

/// Iterates over the items in a [`List`] by reference.
pub struct Iter<'a, T> {
    list: &'a List<T>,
    curr: usize,
    end: NodeId,
}

type Link = Option<usize>;

struct Node<T> {
    links: Links,
    /// Zero for the two sentinels.
    gen: u64,
    /// `None` only for the two sentinels.
    value: Option<T>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Links {
    prev: Link,
    next: Link,
}

const HEAD: usize = 0;
const TAIL: usize = 1;

// ==== impl List ====

impl<T> List<T> {
    /// Returns a new empty list with no capacity limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity_limit(None)
    }

    /// Returns a new empty list which holds at most `capacity` elements.
    ///
    /// The capacity is only a limit: nodes are still allocated as elements
    /// are inserted.
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self::with_capacity_limit(Some(capacity))
    }

    fn with_capacity_limit(capacity: Option<usize>) -> Self {
        let mut nodes = Slab::with_capacity(2);
        let head = nodes.insert(Node::sentinel(None, Some(TAIL)));
        let tail = nodes.insert(Node::sentinel(Some(HEAD), None));
        debug_assert_eq!(
            (head, tail),
            (HEAD, TAIL),
            "sentinels must occupy the first two slots of a fresh arena"
        );
        Self {
            nodes,
            capacity,
            next_gen: 1,
        }
    }

    /// Returns the number of elements in the list.
    ///
    /// This walks the list, and is therefore _O_(_n_).
    #[must_use]
    pub fn len(&self) -> usize {
        let len = self.iter().count();
        debug_assert_eq!(len, self.occupied(), "walked length must match the arena");
        len
    }

    /// Returns `true` if this list is empty.
    ///
    /// This is an _O_(1) operation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes[HEAD].links.next == Some(TAIL)
    }

    /// Returns the maximum number of elements this list may hold, or `None` if
    /// it is unbounded.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Returns a handle to the first element, or [`List::end`] if the list is
    /// empty.
    #[must_use]
    pub fn begin(&self) -> NodeId {
        self.id(self.next_key(HEAD))
    }

    /// Returns a handle to the tail sentinel, one past the last element.
    #[must_use]
    pub fn end(&self) -> NodeId {
        NodeId::SENTINEL_TAIL
    }

    /// Returns the node following `at`.
    ///
    /// # Panics
    ///
    /// If `at` is the tail sentinel, or a handle that does not refer to a node
    /// in this list (including a stale one).
    #[must_use]
    #[track_caller]
    pub fn next(&self, at: NodeId) -> NodeId {
        self.id(self.next_key(self.live_key(at)))
    }

    /// Returns the node preceding `at`.
    ///
    /// The node preceding the first element is the head sentinel, which may
    /// be passed back to [`List::next`] but holds no data.
    ///
    /// # Panics
    ///
    /// If `at` is the head sentinel, or a handle that does not refer to a node
    /// in this list (including a stale one).
    #[must_use]
    #[track_caller]
    pub fn prev(&self, at: NodeId) -> NodeId {
        self.id(self.prev_key(self.live_key(at)))
    }

    /// Returns a reference to the element at `at`, or `None` if `at` is a
    /// sentinel or a stale handle.
    #[must_use]
    pub fn get(&self, at: NodeId) -> Option<&T> {
        self.node(at)?.value.as_ref()
    }

    /// Returns a mutable reference to the element at `at`, or `None` if `at`
    /// is a sentinel or a stale handle.
    #[must_use]
    pub fn get_mut(&mut self, at: NodeId) -> Option<&mut T> {
        match self.nodes.get_mut(at.key) {
            Some(node) if node.gen == at.gen => node.value.as_mut(),
            _ => None,
        }
    }

    /// Returns `true` if `at` refers to a node in this list, sentinels
    /// included. Stale handles do not.
    #[must_use]
    pub fn contains(&self, at: NodeId) -> bool {
        self.node(at).is_some()
    }

    /// Returns the first element of the list, if there is one.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.get(self.begin())
    }

    /// Returns the last element of the list, if there is one.
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.nodes[self.prev_key(TAIL)].value.as_ref()
    }

    /// Inserts `value` immediately before `at`, returning a handle to the new
    /// node.
    ///
    /// `at` may be any element or the tail sentinel. This is an _O_(1)
    /// operation.
    ///
    /// # Errors
    ///
    /// If the list is [bounded](List::bounded) and already full, the value is
    /// returned inside a [`Full`] error and the list is unchanged.
    ///
    /// # Panics
    ///
    /// If `at` is the head sentinel or does not refer to a node in this list
    /// (including a stale one).
    #[track_caller]
    pub fn insert(&mut self, at: NodeId, value: T) -> Result<NodeId, Full<T>> {
        let at_key = self.live_key(at);
        if let Some(capacity) = self.capacity {
            if self.occupied() >= capacity {
                test_trace!(?at, capacity, "List::insert -> full");
                return Err(Full::new(value, capacity));
            }
        }

        let key = self.link_before(at_key, value);
        Ok(self.id(key))
    }

    /// Removes the element at `at`, returning it along with a handle to the
    /// node that followed it.
    ///
    /// Returns `None` if `at` is one of the sentinels, which can never be
    /// removed, or a stale handle. This is an _O_(1) operation.
    pub fn erase(&mut self, at: NodeId) -> Option<(T, NodeId)> {
        let Some(node) = self.node(at) else {
            test_trace!(?at, "List::erase -> stale");
            return None;
        };
        let Links { prev, next } = node.links;
        let (Some(prev), Some(next)) = (prev, next) else {
            test_trace!(?at, "List::erase -> sentinel");
            return None;
        };

        let node = self.nodes.remove(at.key);
        self.nodes[prev].links.next = Some(next);
        self.nodes[next].links.prev = Some(prev);
        test_trace!(?at, prev, next, "List::erase");

        let value = node.value?;
        Some((value, self.id(next)))
    }

    /// Appends an item to the back of the list.
    pub fn push_back(&mut self, value: T) -> Result<NodeId, Full<T>> {
        self.insert(self.end(), value)
    }

    /// Prepends an item to the front of the list.
    pub fn push_front(&mut self, value: T) -> Result<NodeId, Full<T>> {
        self.insert(self.begin(), value)
    }

    /// Removes an item from the front of the list.
    ///
    /// Returns `None` (and does nothing) if the list is empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.erase(self.begin()).map(|(value, _)| value)
    }

    /// Removes an item from the back of the list.
    ///
    /// Returns `None` (and does nothing) if the list is empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let last = self.prev(self.end());
        self.erase(last).map(|(value, _)| value)
    }

    /// Calls `f` with every element in `[from, to)`, in order.
    ///
    /// Iteration stops at the first element for which `f` returns
    /// [`ControlFlow::Break`], and that value is returned. If `f` never breaks,
    /// this returns [`ControlFlow::Continue`].
    pub fn for_each<B>(
        &self,
        from: NodeId,
        to: NodeId,
        mut f: impl FnMut(&T) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        for value in self.range(from, to) {
            f(value)?;
        }
        ControlFlow::Continue(())
    }

    /// Returns the first node in `[from, to)` whose element matches
    /// `predicate`, or `to` if there is no such node.
    #[must_use]
    pub fn find(&self, from: NodeId, to: NodeId, mut predicate: impl FnMut(&T) -> bool) -> NodeId {
        let mut iter = self.range(from, to);
        while let Some((id, value)) = iter.next_entry() {
            if predicate(value) {
                return id;
            }
        }
        to
    }

    /// Moves the nodes in `[from, to)` so that they sit immediately before
    /// `at`, preserving their order.
    ///
    /// No nodes are copied or reallocated, so handles into the range stay
    /// valid. This is an _O_(1) operation. Splicing an empty range
    /// (`from == to`) does nothing.
    ///
    /// # Panics
    ///
    /// If `from` is a sentinel, if `at` is the head sentinel, or if any of the
    /// handles is stale. In debug builds, also if `at` lies inside
    /// `[from, to)`.
    #[track_caller]
    pub fn splice(&mut self, at: NodeId, from: NodeId, to: NodeId) {
        assert!(
            self.contains(at) && self.contains(to),
            "cannot splice using a stale handle ({at:?}, {to:?})"
        );
        if from == to || at == to {
            // an empty range, or one that already ends right before `at`
            return;
        }
        assert!(
            self.get(from).is_some(),
            "cannot splice a range starting at a sentinel or a stale handle ({from:?})"
        );
        assert_ne!(at, from, "cannot splice a range to a position inside it");
        debug_assert!(
            !self.range_contains(from, to, at),
            "cannot splice a range ({from:?}..{to:?}) to a position inside it ({at:?})"
        );

        let (at, from, to) = (at.key, from.key, to.key);
        let before_from = self.prev_key(from);
        let last = self.prev_key(to);
        let before_at = self.prev_key(at);
        test_trace!(?at, ?from, ?to, before_from, last, before_at, "List::splice");

        // close the gap the range leaves behind...
        self.nodes[before_from].links.next = Some(to);
        self.nodes[to].links.prev = Some(before_from);

        // ...and stitch it in before `at`.
        self.nodes[before_at].links.next = Some(from);
        self.nodes[from].links.prev = Some(before_at);
        self.nodes[last].links.next = Some(at);
        self.nodes[at].links.prev = Some(last);
    }

    /// Moves the nodes in `[from, to)` out of `other` and into this list,
    /// immediately before `at`, preserving their order.
    ///
    /// Nodes belong to the arena of the list that owns them, so each moved
    /// node is re-homed in this list's arena: this is _O_(_k_) in the length
    /// of the range, and handles into the moved range are invalidated. The
    /// order of the elements left in `other` is untouched.
    ///
    /// # Errors
    ///
    /// If this list is [bounded](List::bounded) and cannot hold the whole
    /// range, nothing is moved and a [`Full`] error is returned.
    ///
    /// # Panics
    ///
    /// If `at` is the head sentinel, or if any of the handles is stale.
    #[track_caller]
    pub fn splice_from(
        &mut self,
        at: NodeId,
        other: &mut List<T>,
        from: NodeId,
        to: NodeId,
    ) -> Result<(), Full> {
        let at_key = self.live_key(at);
        assert!(
            other.contains(from) && other.contains(to),
            "cannot splice from another list using a stale handle ({from:?}, {to:?})"
        );
        if from == to {
            return Ok(());
        }

        if let Some(capacity) = self.capacity {
            let moving = other.range(from, to).count();
            if self.occupied() + moving > capacity {
                test_trace!(?at, moving, capacity, "List::splice_from -> full");
                return Err(Full::new((), capacity));
            }
        }

        let mut curr = from;
        while curr != to {
            let Some((value, next)) = other.erase(curr) else {
                debug_assert!(false, "ran off the end of the source range at {curr:?}");
                break;
            };
            self.link_before(at_key, value);
            curr = next;
        }
        Ok(())
    }

    /// Returns an iterator over the elements of this list, by reference.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        self.range(self.begin(), self.end())
    }

    /// Returns an iterator over the elements in `[from, to)`, by reference.
    ///
    /// If `from` is stale, the range is empty.
    #[must_use]
    pub fn range(&self, from: NodeId, to: NodeId) -> Iter<'_, T> {
        let curr = if self.contains(from) { from.key } else { TAIL };
        Iter {
            list: self,
            curr,
            end: to,
        }
    }

    /// Asserts as many of the linked list's invariants as possible.
    #[track_caller]
    pub fn assert_valid(&self) {
        let head = &self.nodes[HEAD];
        let tail = &self.nodes[TAIL];
        assert!(head.value.is_none(), "head sentinel must not hold a value");
        assert!(tail.value.is_none(), "tail sentinel must not hold a value");
        assert_eq!(head.links.prev, None, "head sentinel must not have a prev link");
        assert_eq!(tail.links.next, None, "tail sentinel must not have a next link");

        let mut prev = HEAD;
        let mut curr = self.next_key(HEAD);
        let mut seen = 0;
        while curr != TAIL {
            let node = self
                .nodes
                .get(curr)
                .unwrap_or_else(|| panic!("node {curr} is linked but not allocated"));
            assert!(node.value.is_some(), "element node {curr} must hold a value");
            assert_eq!(
                node.links.prev,
                Some(prev),
                "node {curr}'s prev link must point back at {prev}"
            );
            assert_ne!(node.links.next, Some(curr), "node {curr} cannot be linked to itself");
            seen += 1;
            assert!(seen <= self.occupied(), "the list must not contain a cycle");
            prev = curr;
            curr = node
                .links
                .next
                .unwrap_or_else(|| panic!("element node {curr} must have a next link"));
        }

        assert_eq!(tail.links.prev, Some(prev), "tail's prev link must point at the last node");
        assert_eq!(seen, self.occupied(), "every allocated node must be linked");
        if let Some(capacity) = self.capacity {
            assert!(seen <= capacity, "a bounded list must not exceed its capacity");
        }
    }

    // === internals ===

    /// Returns the node `at` refers to, if it is live.
    #[inline]
    fn node(&self, at: NodeId) -> Option<&Node<T>> {
        self.nodes.get(at.key).filter(|node| node.gen == at.gen)
    }

    /// Returns a handle to the live node at `key`.
    #[inline]
    fn id(&self, key: usize) -> NodeId {
        NodeId {
            key,
            gen: self.nodes[key].gen,
        }
    }

    #[inline]
    #[track_caller]
    fn live_key(&self, at: NodeId) -> usize {
        match self.node(at) {
            Some(_) => at.key,
            None => panic!("{at:?} does not refer to a node in this list"),
        }
    }

    /// Number of element nodes in the arena.
    #[inline]
    fn occupied(&self) -> usize {
        self.nodes.len() - 2
    }

    #[inline]
    #[track_caller]
    fn next_key(&self, key: usize) -> usize {
        match self.nodes.get(key) {
            Some(Node {
                links: Links { next: Some(next), .. },
                ..
            }) => *next,
            Some(_) => panic!("the tail sentinel has no next node"),
            None => panic!("arena slot {key} is not allocated"),
        }
    }

    #[inline]
    #[track_caller]
    fn prev_key(&self, key: usize) -> usize {
        match self.nodes.get(key) {
            Some(Node {
                links: Links { prev: Some(prev), .. },
                ..
            }) => *prev,
            Some(_) => panic!("the head sentinel has no previous node"),
            None => panic!("arena slot {key} is not allocated"),
        }
    }

    /// Allocates a node for `value` and links it in before `at`, ignoring the
    /// capacity limit.
    #[track_caller]
    fn link_before(&mut self, at: usize, value: T) -> usize {
        let prev = self.prev_key(at);
        let gen = self.next_gen;
        self.next_gen += 1;
        let key = self.nodes.insert(Node {
            links: Links {
                prev: Some(prev),
                next: Some(at),
            },
            gen,
            value: Some(value),
        });
        self.nodes[prev].links.next = Some(key);
        self.nodes[at].links.prev = Some(key);
        test_trace!(key, prev, next = at, "List::link_before");
        key
    }

    fn range_contains(&self, from: NodeId, to: NodeId, target: NodeId) -> bool {
        let mut iter = self.range(from, to);
        while let Some((id, _)) = iter.next_entry() {
            if id == target {
                return true;
            }
        }
        false
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for value in iter {
            // an unbounded list is never full
            list.link_before(TAIL, value);
        }
        list
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Elements<'a, T>(&'a List<T>);
        impl<T: fmt::Debug> fmt::Debug for Elements<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_list().entries(self.0.iter()).finish()
            }
        }

        f.debug_struct("List")
            .field("capacity", &FmtOption::new(&self.capacity).or_else("unbounded"))
            .field("elements", &Elements(self))
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ==== impl Node ====

impl<T> Node<T> {
    const fn sentinel(prev: Link, next: Link) -> Self {
        Self {
            links: Links { prev, next },
            gen: 0,
            value: None,
        }
    }
}

// ==== impl NodeId ====

impl NodeId {
    const SENTINEL_TAIL: Self = Self { key: TAIL, gen: 0 };
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.key, self.gen) {
            (HEAD, 0) => f.write_str("NodeId(HEAD)"),
            (TAIL, 0) => f.write_str("NodeId(TAIL)"),
            (key, gen) => write!(f, "NodeId({key}v{gen})"),
        }
    }
}

// === impl Iter ====

impl<'a, T> Iter<'a, T> {
    fn next_entry(&mut self) -> Option<(NodeId, &'a T)> {
        let node = self.list.nodes.get(self.curr)?;
        let id = NodeId {
            key: self.curr,
            gen: node.gen,
        };
        if id == self.end {
            return None;
        }

        // reaching a sentinel before `end` means the range was not well-formed
        let value = node.value.as_ref()?;
        self.curr = node.links.next?;
        Some((id, value))
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().map(|(_, value)| value)
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("curr", &self.curr)
            .field("end", &self.end)
            .finish()
    }
}
