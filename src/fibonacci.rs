//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized insert, decrease_key, and merge
//! - O(log n) amortized delete_minimum and delete
//!
//! The structure consists of a collection of heap-ordered trees. Roots are linked
//! in a circular doubly linked list and the heap keeps a handle to the minimum root.
//! A subtree whose root has degree `d` holds at least `F(d + 2)` entries, which is
//! what bounds the number of roots left after consolidation.
//!
//! # Storage
//!
//! Entries live in `slotmap` arenas and link to each other through
//! [`EntryHandle`]s instead of pointers. Every heap owns one arena segment tagged
//! with a process-unique id. [`FibonacciHeap::merge`] adopts the other heap's
//! segments, so the splice stays independent of the number of moved entries and
//! handles issued by the absorbed heap keep working on the receiving heap.
//! Generational slot keys make stale handles detectable: using a removed entry
//! fails with [`HeapError::InvalidEntryState`].

use crate::error::HeapError;
use crate::traits::{DecreaseKeyHeap, Handle, Heap};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::collections::hash_map;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

new_key_type! {
    /// Slot of an entry inside one arena segment
    struct SlotKey;
}

static NEXT_SEGMENT: AtomicU64 = AtomicU64::new(0);

/// Identifies the arena segment an entry was allocated in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct SegmentId(u64);

impl SegmentId {
    fn fresh() -> Self {
        SegmentId(NEXT_SEGMENT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to an entry in a Fibonacci heap
///
/// Handles stay valid until the entry is removed, including across a
/// [`FibonacciHeap::merge`] into another heap.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EntryHandle {
    segment: SegmentId,
    slot: SlotKey,
}

impl Handle for EntryHandle {}

struct Node<K, V> {
    key: K,
    value: V,
    parent: Option<EntryHandle>,
    child: Option<EntryHandle>,
    left: EntryHandle,
    right: EntryHandle,
    degree: usize,
    marked: bool,
}

type Segment<K, V> = SlotMap<SlotKey, Node<K, V>>;

/// Borrowed view of a live heap entry.
#[derive(Debug, PartialEq, Eq)]
pub struct Entry<'a, K, V> {
    pub handle: EntryHandle,
    pub key: &'a K,
    pub value: &'a V,
}

impl<K, V> Clone for Entry<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Entry<'_, K, V> {}

/// An entry that was taken out of the heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEntry<K, V> {
    pub handle: EntryHandle,
    pub key: K,
    pub value: V,
}

/// Fibonacci Heap
///
/// # Example
///
/// ```rust
/// use informed_search::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.insert(5, "item");
/// heap.insert(3, "other");
/// heap.decrease_key(handle, 1).unwrap();
///
/// let min = heap.find_minimum().unwrap();
/// assert_eq!((min.key, min.value), (&1, &"item"));
/// assert_eq!(min.handle, handle);
/// ```
pub struct FibonacciHeap<K, V> {
    id: SegmentId,
    segments: FxHashMap<SegmentId, Segment<K, V>>,
    min: Option<EntryHandle>,
    len: usize,
}

impl<K: Ord, V> Default for FibonacciHeap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FibonacciHeap<K, V> {
    /// Creates an empty heap.
    pub fn new() -> Self {
        FibonacciHeap {
            id: SegmentId::fresh(),
            segments: FxHashMap::default(),
            min: None,
            len: 0,
        }
    }

    /// Returns the number of entries in the heap.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the heap holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Returns true if `handle` refers to an entry currently held by this heap.
    pub fn contains(&self, handle: EntryHandle) -> bool {
        self.try_node(handle).is_some()
    }

    /// Inserts a key/value pair, returning a handle to the new entry.
    ///
    /// # Time Complexity
    /// O(1)
    pub fn insert(&mut self, key: K, value: V) -> EntryHandle {
        let segment = self.id;
        let slot = self
            .segments
            .entry(segment)
            .or_default()
            .insert_with_key(|slot| {
                let this = EntryHandle { segment, slot };
                Node {
                    key,
                    value,
                    parent: None,
                    child: None,
                    left: this,
                    right: this,
                    degree: 0,
                    marked: false,
                }
            });
        let handle = EntryHandle { segment, slot };

        self.add_root(handle);
        if let Some(min) = self.min {
            if self.node(handle).key < self.node(min).key {
                self.min = Some(handle);
            }
        }
        self.len += 1;
        handle
    }

    /// Returns the entry with the smallest key, or `None` if the heap is empty.
    ///
    /// # Time Complexity
    /// O(1)
    pub fn find_minimum(&self) -> Option<Entry<'_, K, V>> {
        self.min.map(|min| self.entry(min))
    }

    /// Returns the entry behind `handle` if it is still held by this heap.
    pub fn get(&self, handle: EntryHandle) -> Option<Entry<'_, K, V>> {
        self.try_node(handle).map(|_| self.entry(handle))
    }

    /// Returns the current key of the entry behind `handle`.
    pub fn key(&self, handle: EntryHandle) -> Option<&K> {
        self.try_node(handle).map(|node| &node.key)
    }

    /// Returns the value of the entry behind `handle`.
    pub fn value(&self, handle: EntryHandle) -> Option<&V> {
        self.try_node(handle).map(|node| &node.value)
    }

    /// Returns the value of the entry behind `handle` for in-place updates.
    ///
    /// Values do not take part in the heap order, so they may be replaced freely.
    pub fn value_mut(&mut self, handle: EntryHandle) -> Option<&mut V> {
        self.segments
            .get_mut(&handle.segment)
            .and_then(|segment| segment.get_mut(handle.slot))
            .map(|node| &mut node.value)
    }

    /// Removes and returns the entry with the smallest key.
    ///
    /// Children of the removed root are promoted to the root list, then roots of
    /// equal degree are linked until every degree occurs at most once.
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn delete_minimum(&mut self) -> Option<RemovedEntry<K, V>> {
        let z = self.min?;

        if let Some(child) = self.node(z).child {
            let mut current = child;
            loop {
                let node = self.node_mut(current);
                node.parent = None;
                node.marked = false;
                current = node.right;
                if current == child {
                    break;
                }
            }
            // Splice the whole child list in after z.
            let z_right = self.node(z).right;
            let child_left = self.node(child).left;
            self.node_mut(z).right = child;
            self.node_mut(child).left = z;
            self.node_mut(child_left).right = z_right;
            self.node_mut(z_right).left = child_left;

            let node = self.node_mut(z);
            node.child = None;
            node.degree = 0;
        }

        if self.node(z).right == z {
            self.min = None;
        } else {
            let next = self.node(z).right;
            self.unlink(z);
            self.min = Some(next);
            self.consolidate();
        }

        self.len -= 1;
        Some(self.release(z))
    }

    /// Lowers the key of the entry behind `handle`.
    ///
    /// A key equal to the current one is accepted and leaves the heap unchanged.
    ///
    /// # Errors
    /// - [`HeapError::InvalidEntryState`] if the entry is no longer in this heap
    /// - [`HeapError::InvalidKeyUpdate`] if `new_key` is greater than the current key
    ///
    /// # Time Complexity
    /// O(1) amortized
    pub fn decrease_key(&mut self, handle: EntryHandle, new_key: K) -> Result<(), HeapError> {
        let node = self.try_node(handle).ok_or(HeapError::InvalidEntryState)?;
        if new_key > node.key {
            return Err(HeapError::InvalidKeyUpdate);
        }
        self.node_mut(handle).key = new_key;

        if let Some(parent) = self.node(handle).parent {
            if self.node(handle).key < self.node(parent).key {
                self.cut(handle, parent);
                self.cascading_cut(parent);
            }
        }

        if self.node(handle).parent.is_none() {
            if let Some(min) = self.min {
                if self.node(handle).key < self.node(min).key {
                    self.min = Some(handle);
                }
            }
        }
        Ok(())
    }

    /// Removes the entry behind `handle`, whatever its key.
    ///
    /// Behaves as if the key were lowered below every other key and the minimum
    /// were then deleted.
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidEntryState`] if the entry is no longer in this heap.
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn delete(&mut self, handle: EntryHandle) -> Result<RemovedEntry<K, V>, HeapError> {
        let node = self.try_node(handle).ok_or(HeapError::InvalidEntryState)?;
        if let Some(parent) = node.parent {
            self.cut(handle, parent);
            self.cascading_cut(parent);
        }
        self.min = Some(handle);
        self.delete_minimum().ok_or(HeapError::InvalidEntryState)
    }

    /// Moves every entry of `other` into this heap, leaving `other` empty.
    ///
    /// Handles obtained from `other` refer to the same entries in `self` afterwards
    /// and are no longer accepted by `other`.
    ///
    /// # Time Complexity
    /// O(1) in the number of moved entries
    pub fn merge(&mut self, other: &mut Self) {
        // `other` keeps working as an independent heap under a new segment id.
        other.id = SegmentId::fresh();
        let Some(other_min) = other.min.take() else {
            other.segments.clear();
            return;
        };
        self.segments
            .extend(other.segments.drain().filter(|(_, nodes)| !nodes.is_empty()));
        self.len += std::mem::take(&mut other.len);

        match self.min {
            None => self.min = Some(other_min),
            Some(min) => {
                let min_left = self.node(min).left;
                let other_left = self.node(other_min).left;
                self.node_mut(min_left).right = other_min;
                self.node_mut(other_min).left = min_left;
                self.node_mut(other_left).right = min;
                self.node_mut(min).left = other_left;

                if self.node(other_min).key < self.node(min).key {
                    self.min = Some(other_min);
                }
            }
        }
    }

    /// Removes every entry. Handles issued before the call become invalid.
    pub fn clear(&mut self) {
        self.id = SegmentId::fresh();
        self.segments.clear();
        self.min = None;
        self.len = 0;
    }

    /// Iterates over all live entries in unspecified order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            segments: self.segments.iter(),
            current: None,
            remaining: self.len,
        }
    }

    /// Iterates over all live values in unspecified order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.iter().map(|entry| entry.value)
    }

    fn entry(&self, handle: EntryHandle) -> Entry<'_, K, V> {
        let node = self.node(handle);
        Entry {
            handle,
            key: &node.key,
            value: &node.value,
        }
    }

    fn try_node(&self, handle: EntryHandle) -> Option<&Node<K, V>> {
        self.segments
            .get(&handle.segment)
            .and_then(|segment| segment.get(handle.slot))
    }

    // Links between entries always point at live nodes of this heap, so a miss
    // below is a corrupted forest and not a recoverable condition.
    fn node(&self, handle: EntryHandle) -> &Node<K, V> {
        &self.segments[&handle.segment][handle.slot]
    }

    fn node_mut(&mut self, handle: EntryHandle) -> &mut Node<K, V> {
        match self.segments.get_mut(&handle.segment) {
            Some(segment) => &mut segment[handle.slot],
            None => unreachable!("entry link points outside of the heap"),
        }
    }

    /// Frees the arena slot of a node that is no longer linked into the forest.
    fn release(&mut self, handle: EntryHandle) -> RemovedEntry<K, V> {
        let segment = match self.segments.get_mut(&handle.segment) {
            Some(segment) => segment,
            None => unreachable!("released entry has no segment"),
        };
        let node = match segment.remove(handle.slot) {
            Some(node) => node,
            None => unreachable!("released entry was already freed"),
        };
        // Adopted segments never receive new entries.
        if handle.segment != self.id && segment.is_empty() {
            self.segments.remove(&handle.segment);
        }
        RemovedEntry {
            handle,
            key: node.key,
            value: node.value,
        }
    }

    /// Adds a detached node to the root list, left of the minimum.
    fn add_root(&mut self, x: EntryHandle) {
        match self.min {
            None => {
                let node = self.node_mut(x);
                node.left = x;
                node.right = x;
                self.min = Some(x);
            }
            Some(min) => {
                let min_left = self.node(min).left;
                let node = self.node_mut(x);
                node.right = min;
                node.left = min_left;
                self.node_mut(min_left).right = x;
                self.node_mut(min).left = x;
            }
        }
    }

    /// Takes `x` out of whatever sibling list it is in, leaving it a singleton.
    fn unlink(&mut self, x: EntryHandle) {
        let (left, right) = {
            let node = self.node(x);
            (node.left, node.right)
        };
        self.node_mut(left).right = right;
        self.node_mut(right).left = left;
        let node = self.node_mut(x);
        node.left = x;
        node.right = x;
    }

    /// Links roots of equal degree until all root degrees are distinct.
    fn consolidate(&mut self) {
        let Some(start) = self.min else {
            return;
        };

        let mut roots = Vec::new();
        let mut current = start;
        loop {
            roots.push(current);
            current = self.node(current).right;
            if current == start {
                break;
            }
        }

        let mut by_degree: SmallVec<[Option<EntryHandle>; 64]> = SmallVec::new();
        for root in roots {
            let mut x = root;
            let mut degree = self.node(x).degree;
            loop {
                if degree >= by_degree.len() {
                    by_degree.resize(degree + 1, None);
                }
                let Some(mut y) = by_degree[degree].take() else {
                    break;
                };
                if self.node(y).key < self.node(x).key {
                    std::mem::swap(&mut x, &mut y);
                }
                self.link(y, x);
                degree += 1;
            }
            by_degree[degree] = Some(x);
        }

        self.min = None;
        for root in by_degree.into_iter().flatten() {
            self.add_root(root);
            if let Some(min) = self.min {
                if self.node(root).key < self.node(min).key {
                    self.min = Some(root);
                }
            }
        }
    }

    /// Makes root `y` a child of root `x`.
    fn link(&mut self, y: EntryHandle, x: EntryHandle) {
        self.unlink(y);
        {
            let node = self.node_mut(y);
            node.parent = Some(x);
            node.marked = false;
        }

        match self.node(x).child {
            Some(child) => {
                let child_left = self.node(child).left;
                let node = self.node_mut(y);
                node.right = child;
                node.left = child_left;
                self.node_mut(child_left).right = y;
                self.node_mut(child).left = y;
            }
            None => self.node_mut(x).child = Some(y),
        }
        self.node_mut(x).degree += 1;
    }

    /// Cuts `x` from its parent `parent` and moves it to the root list.
    fn cut(&mut self, x: EntryHandle, parent: EntryHandle) {
        let right = self.node(x).right;
        if right == x {
            self.node_mut(parent).child = None;
        } else {
            if self.node(parent).child == Some(x) {
                self.node_mut(parent).child = Some(right);
            }
            self.unlink(x);
        }
        self.node_mut(parent).degree -= 1;

        let node = self.node_mut(x);
        node.parent = None;
        node.marked = false;
        self.add_root(x);
    }

    /// Walks up from `y`, cutting marked ancestors and marking the first unmarked one.
    fn cascading_cut(&mut self, mut y: EntryHandle) {
        while let Some(parent) = self.node(y).parent {
            if !self.node(y).marked {
                self.node_mut(y).marked = true;
                return;
            }
            self.cut(y, parent);
            y = parent;
        }
    }

    /// Verifies the structural invariants of the forest.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        fn fib(n: usize) -> usize {
            let (mut a, mut b) = (0usize, 1usize);
            for _ in 0..n {
                let next = a.saturating_add(b);
                a = b;
                b = next;
            }
            a
        }

        fn siblings<K: Ord, V>(heap: &FibonacciHeap<K, V>, first: EntryHandle) -> Vec<EntryHandle> {
            let mut out = vec![first];
            let mut current = heap.node(first).right;
            while current != first {
                assert_eq!(heap.node(heap.node(current).left).right, current);
                out.push(current);
                current = heap.node(current).right;
            }
            out
        }

        fn subtree<K: Ord, V>(heap: &FibonacciHeap<K, V>, root: EntryHandle) -> usize {
            let node = heap.node(root);
            let mut size = 1;
            if let Some(child) = node.child {
                let children = siblings(heap, child);
                assert_eq!(children.len(), node.degree, "degree mismatch");
                for c in children {
                    assert_eq!(heap.node(c).parent, Some(root), "broken parent link");
                    assert!(heap.node(c).key >= node.key, "heap order violated");
                    size += subtree(heap, c);
                }
            } else {
                assert_eq!(node.degree, 0);
            }
            assert!(size >= fib(node.degree + 2), "subtree too small for its degree");
            size
        }

        let stored: usize = self.segments.values().map(|s| s.len()).sum();
        assert_eq!(stored, self.len);
        let Some(min) = self.min else {
            assert_eq!(self.len, 0);
            return;
        };
        let mut total = 0;
        for root in siblings(self, min) {
            assert!(self.node(root).parent.is_none());
            assert!(self.node(root).key >= self.node(min).key, "min is not minimal");
            total += subtree(self, root);
        }
        assert_eq!(total, self.len);
    }
}

/// Iterator over the live entries of a [`FibonacciHeap`].
pub struct Iter<'a, K, V> {
    segments: hash_map::Iter<'a, SegmentId, Segment<K, V>>,
    current: Option<(SegmentId, slotmap::basic::Iter<'a, SlotKey, Node<K, V>>)>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = Entry<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((segment, nodes)) = &mut self.current {
                if let Some((slot, node)) = nodes.next() {
                    self.remaining -= 1;
                    return Some(Entry {
                        handle: EntryHandle {
                            segment: *segment,
                            slot,
                        },
                        key: &node.key,
                        value: &node.value,
                    });
                }
            }
            let (&segment, nodes) = self.segments.next()?;
            self.current = Some((segment, nodes.iter()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K: Ord, V> IntoIterator for &'a FibonacciHeap<K, V> {
    type Item = Entry<'a, K, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord, V> Extend<(K, V)> for FibonacciHeap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for FibonacciHeap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut heap = FibonacciHeap::new();
        heap.extend(iter);
        heap
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for FibonacciHeap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|entry| (entry.key, entry.value)))
            .finish()
    }
}

impl<V, P: Ord> Heap<V, P> for FibonacciHeap<P, V> {
    fn new() -> Self {
        FibonacciHeap::new()
    }

    fn is_empty(&self) -> bool {
        FibonacciHeap::is_empty(self)
    }

    fn len(&self) -> usize {
        FibonacciHeap::len(self)
    }

    fn push(&mut self, priority: P, item: V) {
        self.insert(priority, item);
    }

    fn peek(&self) -> Option<(&P, &V)> {
        self.find_minimum().map(|entry| (entry.key, entry.value))
    }

    fn pop(&mut self) -> Option<(P, V)> {
        self.delete_minimum().map(|entry| (entry.key, entry.value))
    }

    fn merge(&mut self, mut other: Self) {
        FibonacciHeap::merge(self, &mut other);
    }
}

impl<V, P: Ord> DecreaseKeyHeap<V, P> for FibonacciHeap<P, V> {
    type Handle = EntryHandle;

    fn push_with_handle(&mut self, priority: P, item: V) -> Self::Handle {
        self.insert(priority, item)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError> {
        FibonacciHeap::decrease_key(self, *handle, new_priority)
    }

    fn remove(&mut self, handle: &Self::Handle) -> Result<(P, V), HeapError> {
        self.delete(*handle).map(|entry| (entry.key, entry.value))
    }
}
