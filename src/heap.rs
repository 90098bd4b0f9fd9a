use std::cmp::Ordering;
use std::fmt;

use crate::error::Error;

/// Initial capacity used by `PriorityQueue::new`.
const DEFAULT_INITIAL_CAPACITY: usize = 11;

/// An ordering injected at construction time.
///
/// When present it takes precedence over the element type's own `Ord` for
/// every comparison made by the queue, and stays fixed for the queue's life.
pub type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// An unbounded, array-backed binary min-heap.
///
/// Elements are ordered either by their natural `Ord` or by a `Comparator`
/// supplied at construction; a supplied comparator wins. The element at the
/// root is the minimum under the active ordering and is the one returned by
/// `peek` and `pop`.
///
/// The queue performs no locking of its own. Callers that share one between
/// threads must guarantee exclusive access, as [`DelayQueue`](crate::DelayQueue)
/// does with a single mutex.
///
/// # Examples
///
/// Basic usage:
///
/// ```
/// use delay_heap::PriorityQueue;
///
/// let mut heap = PriorityQueue::new();
/// heap.push(4);
/// heap.push(1);
/// heap.push(3);
///
/// assert_eq!(heap.peek(), Some(&1));
/// assert_eq!(heap.pop(), Some(1));
/// assert_eq!(heap.pop(), Some(3));
/// assert_eq!(heap.pop(), Some(4));
/// assert_eq!(heap.pop(), None);
/// ```
pub struct PriorityQueue<T: Ord> {
    /// Backing storage. `items.len()` is the logical element count; the Vec's
    /// capacity is the heap's capacity and only ever grows.
    items: Vec<T>,

    /// Explicit ordering, overriding `T: Ord` when present.
    comparator: Option<Comparator<T>>,
}

impl<T: Ord> PriorityQueue<T> {
    /// Creates an empty `PriorityQueue<T>` ordered by `T`'s natural order,
    /// with a small default initial capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use delay_heap::PriorityQueue;
    ///
    /// let heap: PriorityQueue<i32> = PriorityQueue::new();
    /// assert!(heap.is_empty());
    /// ```
    pub fn new() -> PriorityQueue<T> {
        PriorityQueue {
            items: Vec::with_capacity(DEFAULT_INITIAL_CAPACITY),
            comparator: None,
        }
    }

    /// Creates an empty `PriorityQueue<T>` that preallocates room for
    /// `initial_capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `initial_capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use delay_heap::PriorityQueue;
    ///
    /// let heap: PriorityQueue<i32> = PriorityQueue::with_capacity(64).unwrap();
    /// assert!(heap.capacity() >= 64);
    /// ```
    pub fn with_capacity(initial_capacity: usize) -> Result<PriorityQueue<T>, Error> {
        if initial_capacity == 0 {
            return Err(Error::InvalidCapacity(initial_capacity));
        }
        Ok(PriorityQueue {
            items: Vec::with_capacity(initial_capacity),
            comparator: None,
        })
    }

    /// Creates an empty `PriorityQueue<T>` ordered by `comparator` instead of
    /// `T`'s natural order.
    ///
    /// # Examples
    ///
    /// A max-heap over `i32`:
    ///
    /// ```
    /// use delay_heap::PriorityQueue;
    ///
    /// let mut heap = PriorityQueue::with_comparator(Box::new(|a: &i32, b: &i32| b.cmp(a)));
    /// heap.push(1);
    /// heap.push(3);
    /// assert_eq!(heap.pop(), Some(3));
    /// ```
    pub fn with_comparator(comparator: Comparator<T>) -> PriorityQueue<T> {
        PriorityQueue {
            items: Vec::with_capacity(DEFAULT_INITIAL_CAPACITY),
            comparator: Some(comparator),
        }
    }

    /// Creates an empty `PriorityQueue<T>` with both an initial capacity and
    /// an explicit ordering.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `initial_capacity` is zero.
    pub fn with_capacity_and_comparator(
        initial_capacity: usize,
        comparator: Comparator<T>,
    ) -> Result<PriorityQueue<T>, Error> {
        if initial_capacity == 0 {
            return Err(Error::InvalidCapacity(initial_capacity));
        }
        Ok(PriorityQueue {
            items: Vec::with_capacity(initial_capacity),
            comparator: Some(comparator),
        })
    }

    /// Returns the number of elements in the heap.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the heap holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of elements the heap can hold before growing.
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Returns a reference to the minimum element, or `None` if the heap is
    /// empty. O(1).
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// Pushes an element onto the heap, growing the backing storage first if
    /// it is full. Amortized O(log n).
    ///
    /// # Examples
    ///
    /// ```
    /// use delay_heap::PriorityQueue;
    ///
    /// let mut heap = PriorityQueue::new();
    /// heap.push("b");
    /// heap.push("a");
    /// assert_eq!(heap.peek(), Some(&"a"));
    /// ```
    pub fn push(&mut self, item: T) {
        let i = self.items.len();
        if i == self.items.capacity() {
            self.grow(i + 1);
        }
        self.items.push(item);
        if i > 0 {
            self.sift_up(i);
        }
        debug_assert!(self.invariant_holds());
    }

    /// Removes and returns the minimum element, or `None` if the heap is
    /// empty. O(log n).
    ///
    /// The last element moves into the vacated root slot and is sifted down
    /// through its smaller child until the heap order is restored.
    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let val = self.items.pop();
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        debug_assert!(self.invariant_holds());
        val
    }

    /// `true` if the element at `i` orders strictly before the one at `j`.
    fn less(&self, i: usize, j: usize) -> bool {
        let ord = match &self.comparator {
            Some(cmp) => cmp(&self.items[i], &self.items[j]),
            None => self.items[i].cmp(&self.items[j]),
        };
        ord == Ordering::Less
    }

    fn sift_up(&mut self, mut j: usize) {
        while j > 0 {
            let i = (j - 1) / 2;
            if !self.less(j, i) {
                break;
            }
            self.items.swap(i, j);
            j = i;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.items.len();
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let mut j = left;
            let right = left + 1;
            if right < n && self.less(right, left) {
                j = right;
            }
            if !self.less(j, i) {
                break;
            }
            self.items.swap(i, j);
            i = j;
        }
    }

    /// Ensures capacity for at least `min_capacity` elements.
    ///
    /// Follows the OpenJDK priority-queue strategy: double while small,
    /// grow by 50% otherwise. Arithmetic saturates, so a request that would
    /// overflow clamps to `usize::MAX` instead of failing.
    fn grow(&mut self, min_capacity: usize) {
        let old_capacity = self.items.capacity();
        if min_capacity <= old_capacity {
            return;
        }

        let mut new_capacity = if old_capacity < 64 {
            (old_capacity + 1).saturating_mul(2)
        } else {
            old_capacity.saturating_add(old_capacity / 2)
        };
        if new_capacity < min_capacity {
            new_capacity = min_capacity;
        }

        self.items.reserve_exact(new_capacity - self.items.len());
    }

    /// Heap order check: every element is not less than its parent.
    fn invariant_holds(&self) -> bool {
        (1..self.items.len()).all(|i| !self.less(i, (i - 1) / 2))
    }
}

impl<T: Ord> Default for PriorityQueue<T> {
    /// Creates an empty `PriorityQueue<T>` with the default capacity and
    /// natural ordering.
    fn default() -> PriorityQueue<T> {
        PriorityQueue::new()
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for PriorityQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("items", &self.items)
            .field("has_comparator", &self.comparator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{PriorityQueue, DEFAULT_INITIAL_CAPACITY};
    use crate::error::Error;

    #[test]
    fn new_is_empty() {
        let heap: PriorityQueue<i32> = PriorityQueue::new();

        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);
        assert_eq!(heap.peek(), None);
        assert!(heap.capacity() >= DEFAULT_INITIAL_CAPACITY);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut heap: PriorityQueue<i32> = PriorityQueue::new();

        assert_eq!(heap.pop(), None);
        assert_eq!(heap.pop(), None);
        assert_eq!(heap.len(), 0);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            PriorityQueue::<i32>::with_capacity(0).unwrap_err(),
            Error::InvalidCapacity(0)
        );
        assert_eq!(
            PriorityQueue::<i32>::with_capacity_and_comparator(0, Box::new(|a, b| a.cmp(b)))
                .unwrap_err(),
            Error::InvalidCapacity(0)
        );
    }

    #[test]
    fn natural_order_pops_sorted() {
        let mut heap = PriorityQueue::new();
        for v in [4, 2, 3, 1] {
            heap.push(v);
        }

        assert_eq!(heap.pop(), Some(1));
        assert_eq!(heap.pop(), Some(2));
        assert_eq!(heap.pop(), Some(3));
        assert_eq!(heap.pop(), Some(4));
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn reversed_comparator_pops_descending() {
        let mut heap = PriorityQueue::with_comparator(Box::new(|a: &i32, b: &i32| b.cmp(a)));
        for v in [4, 2, 3, 1] {
            heap.push(v);
        }

        assert_eq!(heap.pop(), Some(4));
        assert_eq!(heap.pop(), Some(3));
        assert_eq!(heap.pop(), Some(2));
        assert_eq!(heap.pop(), Some(1));
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn peek_does_not_remove() {
        let mut heap = PriorityQueue::new();
        heap.push(2);
        heap.push(1);

        assert_eq!(heap.peek(), Some(&1));
        assert_eq!(heap.peek(), Some(&1));
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn growth_preserves_all_elements() {
        let mut heap = PriorityQueue::with_capacity(4).unwrap();
        let initial_capacity = heap.capacity();

        // (i * 7 + 13) % 1000 is a permutation of 0..1000, so popping must
        // produce exactly 0..=999 with no loss or duplication.
        for i in 0..1000usize {
            heap.push((i * 7 + 13) % 1000);
        }

        assert!(heap.capacity() > initial_capacity);
        assert_eq!(heap.len(), 1000);

        for expected in 0..1000usize {
            assert_eq!(heap.pop(), Some(expected));
        }
        assert!(heap.is_empty());
    }

    #[test]
    fn capacity_never_shrinks() {
        let mut heap = PriorityQueue::with_capacity(1).unwrap();
        for i in 0..100 {
            heap.push(i);
        }
        let grown = heap.capacity();
        while heap.pop().is_some() {}

        assert_eq!(heap.capacity(), grown);
    }

    proptest! {
        /// Heap order holds after any interleaving of pushes (`Some(v)`) and
        /// pops (`None`), and popping everything at the end yields a sorted
        /// sequence.
        #[test]
        fn invariant_under_mixed_ops(ops in proptest::collection::vec(any::<Option<i32>>(), 0..200)) {
            let mut heap = PriorityQueue::new();
            for op in ops {
                match op {
                    Some(v) => heap.push(v),
                    None => {
                        heap.pop();
                    }
                }
                prop_assert!(heap.invariant_holds());
            }

            let mut previous = None;
            while let Some(v) = heap.pop() {
                if let Some(p) = previous {
                    prop_assert!(p <= v);
                }
                previous = Some(v);
            }
        }
    }
}
