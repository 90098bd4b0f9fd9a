use parking_lot::Mutex;

/// A fixed-length array of optional slots guarded by a single lock.
///
/// Provides `get`, `set` and `compare_and_set` with the read-modify-write
/// atomicity of an atomic reference array, shielding every slot behind one
/// coarse mutex rather than per-slot atomics. An empty slot is `None`.
///
/// The length is fixed at construction and never changes.
///
/// # Examples
///
/// ```
/// use delay_heap::GuardedArray;
///
/// let array: GuardedArray<&str> = GuardedArray::new(3);
///
/// array.set(0, Some("a"));
/// assert_eq!(array.get(0), Some("a"));
/// assert_eq!(array.get(1), None);
///
/// // Succeeds only when the current value matches the expectation.
/// assert!(array.compare_and_set(0, Some(&"a"), Some("b")));
/// assert!(!array.compare_and_set(0, Some(&"a"), Some("c")));
/// assert_eq!(array.get(0), Some("b"));
/// ```
#[derive(Debug)]
pub struct GuardedArray<T> {
    slots: Mutex<Box<[Option<T>]>>,
}

impl<T> GuardedArray<T> {
    /// Creates an array of `len` empty slots.
    pub fn new(len: usize) -> GuardedArray<T> {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        GuardedArray {
            slots: Mutex::new(slots.into_boxed_slice()),
        }
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Returns `true` if the array has no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a clone of the value in slot `index`, or `None` if the slot is
    /// empty.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.slots.lock()[index].clone()
    }

    /// Stores `value` in slot `index`, replacing whatever was there.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn set(&self, index: usize, value: Option<T>) {
        self.slots.lock()[index] = value;
    }

    /// Stores `update` in slot `index` only if the current value equals
    /// `expect` (`None` matching an empty slot). Returns `true` if the store
    /// happened.
    ///
    /// The comparison and the store happen under one lock acquisition, so no
    /// other access can interleave between them.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn compare_and_set(&self, index: usize, expect: Option<&T>, update: Option<T>) -> bool
    where
        T: PartialEq,
    {
        let mut slots = self.slots.lock();
        let matches = match (&slots[index], expect) {
            (None, None) => true,
            (Some(current), Some(expected)) => current == expected,
            _ => false,
        };
        if matches {
            slots[index] = update;
        }
        matches
    }
}
