use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::trace;
use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::delayed::Delayed;
use crate::error::Error;
use crate::heap::PriorityQueue;

/// A concurrent unbounded blocking queue where each item can only be removed
/// when its delay expires.
///
/// The queue supports multiple producers and multiple consumers. Items become
/// eligible for removal in non-decreasing order of their due time; among items
/// due at exactly the same `Instant` the order is unspecified.
///
/// Items of the queue must implement the `Delayed` trait. In most situations
/// you can just use the helper struct `Delay` to wrap the values to be used
/// by the queue.
///
/// Internally the queue is a [`PriorityQueue`] ordered by due time, guarded by
/// a single mutex and one condition variable. A consumer blocked in `take` or
/// `poll_timeout` sleeps for exactly the head's remaining delay and is woken
/// early (by broadcast) whenever an insertion produces a new, sooner-due head,
/// so it never oversleeps past a newly arrived item.
///
/// # Examples
///
/// Basic usage:
///
/// ```no_run
/// use delay_heap::{Delay, DelayQueue};
/// use std::time::{Duration, Instant};
///
/// let queue = DelayQueue::new();
/// queue.put(Delay::for_duration("2nd", Duration::from_secs(5)));
/// queue.put(Delay::until_instant("1st", Instant::now()));
///
/// println!("First take: {}", queue.take().value);
/// println!("Second take: {}", queue.take().value);
/// assert!(queue.is_empty());
/// ```
#[derive(Debug)]
pub struct DelayQueue<T: Delayed> {
    /// Points to the data that is shared between instances of the same queue
    /// (created by cloning a queue). Usually the different instances of a
    /// queue will live in different threads.
    shared_data: Arc<DelayQueueSharedData<T>>,
}

/// The underlying data of a queue.
///
/// When a `DelayQueue` is cloned, its clone will point to the same
/// `DelayQueueSharedData`. This is done so a queue can be used by different
/// threads.
#[derive(Debug)]
struct DelayQueueSharedData<T: Delayed> {
    /// Mutex protected min-heap that holds the items of the queue ordered by
    /// due time. Never accessed without the mutex held.
    heap: Mutex<PriorityQueue<Entry<T>>>,

    /// Condition variable that signals when the head of the queue may have
    /// changed. Always woken by broadcast, so every blocked consumer gets to
    /// recompute its wait against the new head.
    new_head: Condvar,
}

impl<T: Delayed> DelayQueue<T> {
    /// Creates an empty `DelayQueue<T>`.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use delay_heap::{Delay, DelayQueue};
    ///
    /// let queue: DelayQueue<Delay<i32>> = DelayQueue::new();
    /// ```
    pub fn new() -> DelayQueue<T> {
        DelayQueue {
            shared_data: Arc::new(DelayQueueSharedData {
                heap: Mutex::new(PriorityQueue::new()),
                new_head: Condvar::new(),
            }),
        }
    }

    /// Creates an empty `DelayQueue<T>` with a specific capacity.
    /// This preallocates enough memory for `capacity` elements, so that the
    /// `DelayQueue` does not have to grow until it contains at least that
    /// many values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use delay_heap::{Delay, DelayQueue};
    ///
    /// let queue: DelayQueue<Delay<&str>> = DelayQueue::with_capacity(10).unwrap();
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<DelayQueue<T>, Error> {
        Ok(DelayQueue {
            shared_data: Arc::new(DelayQueueSharedData {
                heap: Mutex::new(PriorityQueue::with_capacity(capacity)?),
                new_head: Condvar::new(),
            }),
        })
    }

    /// Inserts an item into the queue. Capacity grows as needed, so insertion
    /// never blocks and never fails.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use delay_heap::{Delay, DelayQueue};
    /// use std::time::Duration;
    ///
    /// let queue = DelayQueue::new();
    /// queue.put(Delay::for_duration("2nd", Duration::from_secs(5)));
    /// ```
    pub fn put(&self, item: T) {
        self.offer(item);
    }

    /// Inserts an item into the queue, returning `true`.
    ///
    /// The queue is unbounded, so the offer is always accepted; the return
    /// value exists for interface symmetry with bounded queues.
    ///
    /// If the new item is due before the current head (or the queue was
    /// empty), every blocked consumer is woken so it can shorten its wait.
    pub fn offer(&self, item: T) -> bool {
        let mut heap = self.shared_data.heap.lock();

        // The new item becomes the head if it is due strictly before the
        // current one.
        let new_head = match heap.peek() {
            Some(head) => item.delayed_until() < head.delayed.delayed_until(),
            None => true,
        };

        heap.push(Entry::new(item));

        if new_head {
            trace!("new head of the queue, waking all consumers");
            self.shared_data.new_head.notify_all();
        }
        true
    }

    /// Inserts an item into the queue, returning `true`.
    ///
    /// The timeout is accepted for interface symmetry with bounded queues and
    /// has no effect: the queue is unbounded and never blocks producers.
    pub fn offer_timeout(&self, item: T, _timeout: Duration) -> bool {
        self.offer(item)
    }

    /// Returns a clone of the head of the queue if its delay has expired,
    /// without removing it. Returns `None` if the queue is empty or its head
    /// is not yet due.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use delay_heap::{Delay, DelayQueue};
    /// use std::time::{Duration, Instant};
    ///
    /// let queue = DelayQueue::new();
    /// queue.put(Delay::until_instant("due", Instant::now()));
    /// queue.put(Delay::for_duration("later", Duration::from_secs(3600)));
    ///
    /// assert_eq!(queue.peek().unwrap().value, "due");
    /// assert_eq!(queue.len(), 2);
    /// ```
    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        let heap = self.shared_data.heap.lock();

        let head = heap.peek()?;
        if head.delayed.remaining_delay().is_some() {
            return None;
        }

        let value = head.delayed.clone();
        if !heap.is_empty() {
            self.shared_data.new_head.notify_all();
        }
        Some(value)
    }

    /// Removes and returns the head of the queue if its delay has expired.
    /// Returns `None` if the queue is empty or its head is not yet due;
    /// never blocks.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use delay_heap::{Delay, DelayQueue};
    /// use std::time::Duration;
    ///
    /// let queue = DelayQueue::new();
    /// queue.put(Delay::for_duration("later", Duration::from_secs(3600)));
    ///
    /// assert!(queue.poll().is_none());
    /// assert_eq!(queue.len(), 1);
    /// ```
    pub fn poll(&self) -> Option<T> {
        let heap = self.shared_data.heap.lock();

        let due = match heap.peek() {
            Some(head) => head.delayed.remaining_delay().is_none(),
            None => false,
        };

        if due {
            Some(self.pop_head(heap))
        } else {
            None
        }
    }

    /// Removes and returns the head of the queue, blocking if necessary until
    /// an item is available and its delay has expired, or until `timeout`
    /// expires.
    ///
    /// The deadline is fixed at entry (`now + timeout`): spurious wake-ups
    /// neither shorten nor lengthen it. Returns `None` once the deadline is
    /// reached without a due item; a zero timeout on an empty or not-yet-due
    /// queue returns `None` without blocking.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```no_run
    /// use delay_heap::{Delay, DelayQueue};
    /// use std::time::Duration;
    ///
    /// let queue = DelayQueue::new();
    ///
    /// queue.put(Delay::for_duration("1st", Duration::from_secs(5)));
    ///
    /// // Blocks for approximately 2 seconds before returning None.
    /// println!("First poll: {:?}", queue.poll_timeout(Duration::from_secs(2)));
    ///
    /// // Blocks for approximately 3 seconds before returning the item.
    /// println!("Second poll: {}",
    ///          queue.poll_timeout(Duration::from_secs(5)).unwrap().value);
    /// ```
    pub fn poll_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut heap = self.shared_data.heap.lock();

        // Loop until the head is due or the deadline passes, waiting in
        // between. Every wake is followed by a fresh peek, so spurious and
        // broadcast wake-ups are harmless.
        loop {
            let now = Instant::now();
            let head_until = heap.peek().map(|head| head.delayed.delayed_until());

            if let Some(until) = head_until {
                if until <= now {
                    return Some(self.pop_head(heap));
                }
            }

            if now >= deadline {
                return None;
            }

            // Sleep until the head becomes due or the deadline passes,
            // whichever comes first; an insertion of a sooner-due item
            // interrupts the wait.
            let budget = deadline - now;
            let wait = match head_until {
                Some(until) => (until - now).min(budget),
                None => budget,
            };
            trace!("waiting {:?} for head to become due", wait);
            self.shared_data.new_head.wait_for(&mut heap, wait);
        }
    }

    /// Removes and returns the head of the queue, blocking indefinitely until
    /// an item is available and its delay has expired.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```no_run
    /// use delay_heap::{Delay, DelayQueue};
    /// use std::time::{Duration, Instant};
    ///
    /// let queue = DelayQueue::new();
    ///
    /// queue.put(Delay::until_instant("1st", Instant::now()));
    ///
    /// // Does not block, since the delay has expired.
    /// println!("First take: {}", queue.take().value);
    ///
    /// queue.put(Delay::for_duration("2nd", Duration::from_secs(5)));
    ///
    /// // Blocks for approximately 5 seconds before returning the item.
    /// println!("Second take: {}", queue.take().value);
    /// ```
    pub fn take(&self) -> T {
        let mut heap = self.shared_data.heap.lock();

        // Loop until the head is due, waiting in between. An empty queue
        // waits untimed for an insertion; a pending head waits for exactly
        // its remaining delay. Either wait is cut short when an insertion
        // produces a new head.
        loop {
            let wait = match heap.peek() {
                Some(head) => match head.delayed.remaining_delay() {
                    Some(remaining) => Some(remaining),
                    None => break,
                },
                None => None,
            };

            match wait {
                Some(remaining) => {
                    trace!("waiting {:?} for head to become due", remaining);
                    self.shared_data.new_head.wait_for(&mut heap, remaining);
                }
                None => self.shared_data.new_head.wait(&mut heap),
            }
        }

        self.pop_head(heap)
    }

    /// Returns the number of items in the queue, due or not.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use delay_heap::{Delay, DelayQueue};
    /// use std::time::Duration;
    ///
    /// let queue = DelayQueue::new();
    /// queue.put(Delay::for_duration("val", Duration::from_secs(3600)));
    ///
    /// assert_eq!(queue.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.shared_data.heap.lock().len()
    }

    /// Checks if the queue is empty.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use delay_heap::{Delay, DelayQueue};
    /// use std::time::Instant;
    ///
    /// let queue = DelayQueue::new();
    /// queue.put(Delay::until_instant("val", Instant::now()));
    ///
    /// assert!(!queue.is_empty());
    ///
    /// println!("First take: {}", queue.take().value);
    ///
    /// assert!(queue.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pops the head of the queue, waking all consumers if items remain so
    /// each can recompute its wait against the new head.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty. Callers check for a due head first,
    /// while holding the same guard.
    fn pop_head(&self, mut heap: MutexGuard<PriorityQueue<Entry<T>>>) -> T {
        let entry = heap.pop().unwrap();
        if !heap.is_empty() {
            self.shared_data.new_head.notify_all();
        }
        entry.delayed
    }
}

impl<T: Delayed> Default for DelayQueue<T> {
    /// Creates an empty `DelayQueue<T>`.
    fn default() -> DelayQueue<T> {
        DelayQueue::new()
    }
}

impl<T: Delayed> Clone for DelayQueue<T> {
    /// Returns a new `DelayQueue` that points to the same underlying data.
    ///
    /// This method can be used to share a queue between different threads.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```no_run
    /// use delay_heap::{Delay, DelayQueue};
    /// use std::time::Duration;
    /// use std::thread;
    ///
    /// let queue = DelayQueue::new();
    ///
    /// queue.put(Delay::for_duration("1st", Duration::from_secs(1)));
    ///
    /// let cloned_queue = queue.clone();
    ///
    /// let handle = thread::spawn(move || {
    ///     println!("First take: {}", cloned_queue.take().value);
    ///     println!("Second take: {}", cloned_queue.take().value);
    /// });
    ///
    /// queue.put(Delay::for_duration("2nd", Duration::from_secs(2)));
    ///
    /// handle.join().unwrap();
    /// ```
    fn clone(&self) -> DelayQueue<T> {
        DelayQueue {
            shared_data: self.shared_data.clone(),
        }
    }
}

/// An entry in the `DelayQueue`.
///
/// Holds a `Delayed` item and implements an ordering based on the delay
/// `Instant`s of the items.
#[derive(Debug)]
struct Entry<T: Delayed> {
    delayed: T,
}

impl<T: Delayed> Entry<T> {
    fn new(delayed: T) -> Entry<T> {
        Entry { delayed }
    }
}

/// Implements ordering for `Entry`, so it can be used to correctly order
/// elements in the min-heap of the `DelayQueue`.
///
/// Earlier entries are `Less`: the heap is a min-heap, so the soonest-due
/// entry sits at the root.
impl<T: Delayed> Ord for Entry<T> {
    fn cmp(&self, other: &Entry<T>) -> Ordering {
        self.delayed
            .delayed_until()
            .cmp(&other.delayed.delayed_until())
    }
}

impl<T: Delayed> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Entry<T>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Delayed> PartialEq for Entry<T> {
    fn eq(&self, other: &Entry<T>) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: Delayed> Eq for Entry<T> {}
