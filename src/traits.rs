//! Priority queue abstractions
//!
//! [`FibonacciHeap`](crate::fibonacci::FibonacciHeap) has a rich inherent API
//! that the solvers use directly. The traits here describe the two capabilities
//! that code written against "some min-priority queue" usually needs:
//!
//! - [`Heap`]: push, peek and pop `(priority, item)` pairs, plus merging
//! - [`DecreaseKeyHeap`]: insertion returning a [`Handle`], through which the
//!   priority can be lowered or the entry removed later
//!
//! Priorities are kept apart from items so that items need not be `Ord`.

pub use crate::error::HeapError;

/// Identifies one entry of a [`DecreaseKeyHeap`].
pub trait Handle: Copy + Eq + std::hash::Hash + std::fmt::Debug {}

/// A min-priority queue over `(priority, item)` pairs.
///
/// # Example
///
/// ```rust
/// use informed_search::Heap;
/// use informed_search::fibonacci::FibonacciHeap;
///
/// fn drain<H: Heap<&'static str, u32>>(mut heap: H) -> Vec<&'static str> {
///     let mut items = Vec::with_capacity(heap.len());
///     while let Some((_, item)) = heap.pop() {
///         items.push(item);
///     }
///     items
/// }
///
/// let mut heap: FibonacciHeap<u32, &str> = Heap::new();
/// heap.push(3, "c");
/// heap.push(1, "a");
/// heap.push(2, "b");
///
/// assert_eq!(Heap::peek(&heap), Some((&1, &"a")));
/// assert_eq!(drain(heap), ["a", "b", "c"]);
/// ```
pub trait Heap<T, P: Ord> {
    /// Creates an empty queue.
    fn new() -> Self;

    fn is_empty(&self) -> bool;

    fn len(&self) -> usize;

    /// Adds `item` with priority `priority`.
    fn push(&mut self, priority: P, item: T);

    /// Returns the pair with the smallest priority.
    fn peek(&self) -> Option<(&P, &T)>;

    /// Removes the pair with the smallest priority.
    fn pop(&mut self) -> Option<(P, T)>;

    /// Moves every pair of `other` into this queue.
    fn merge(&mut self, other: Self);
}

/// A min-priority queue whose entries can be updated after insertion.
///
/// # Example
///
/// ```rust
/// use informed_search::{DecreaseKeyHeap, Heap};
/// use informed_search::fibonacci::FibonacciHeap;
///
/// let mut heap: FibonacciHeap<u32, char> = Heap::new();
/// let x = heap.push_with_handle(10, 'x');
/// heap.push_with_handle(7, 'y');
///
/// DecreaseKeyHeap::decrease_key(&mut heap, &x, 5).unwrap();
/// assert_eq!(Heap::peek(&heap), Some((&5, &'x')));
/// assert_eq!(heap.remove(&x), Ok((5, 'x')));
/// assert!(heap.remove(&x).is_err());
/// ```
pub trait DecreaseKeyHeap<T, P: Ord>: Heap<T, P> {
    type Handle: Handle;

    /// Adds `item` and returns a handle to its entry.
    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle;

    /// Lowers the priority of the entry behind `handle`.
    ///
    /// # Errors
    /// - [`HeapError::InvalidEntryState`] if the entry has been removed
    /// - [`HeapError::InvalidKeyUpdate`] if `new_priority` is larger than the current priority
    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError>;

    /// Removes the entry behind `handle`, wherever it sits in the queue.
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidEntryState`] if the entry has been removed.
    fn remove(&mut self, handle: &Self::Handle) -> Result<(P, T), HeapError>;
}
