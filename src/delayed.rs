use std::time::{Duration, Instant};

/// A value that is delayed until some `Instant`.
///
/// The `DelayQueue` only accepts values that implement this trait. In most
/// situations you can use the helper struct `Delay` instead of implementing
/// it yourself.
///
/// If you do implement it, keep in mind that the `DelayQueue` assumes the
/// `Instant` returned by `delayed_until` does not change while the value is
/// in the queue.
pub trait Delayed {
    /// Returns the `Instant` until which this value is delayed.
    fn delayed_until(&self) -> Instant;

    /// Returns the time left until this value is due, or `None` if its
    /// deadline has already passed.
    ///
    /// # Examples
    ///
    /// ```
    /// use delay_heap::{Delay, Delayed};
    /// use std::time::{Duration, Instant};
    ///
    /// let pending = Delay::for_duration("abc", Duration::from_secs(3600));
    /// let due = Delay::until_instant("def", Instant::now());
    ///
    /// assert!(pending.remaining_delay().is_some());
    /// assert_eq!(due.remaining_delay(), None);
    /// ```
    fn remaining_delay(&self) -> Option<Duration> {
        let until = self.delayed_until();
        let now = Instant::now();
        if until <= now {
            None
        } else {
            Some(until - now)
        }
    }
}

/// Boxed delayed values are delayed until the same `Instant` as their
/// contents, so a `DelayQueue<Box<dyn Delayed>>` can mix element types.
impl<T: Delayed + ?Sized> Delayed for Box<T> {
    fn delayed_until(&self) -> Instant {
        (**self).delayed_until()
    }
}

/// Wraps a value that should be delayed.
///
/// Implements `Delayed` and `Eq`. Two `Delay` objects are equal iff their
/// wrapped `value`s are equal and they are delayed until the same `Instant`.
///
/// # Examples
///
/// Basic usage:
///
/// ```
/// use delay_heap::{Delay, Delayed};
/// use std::time::{Duration, Instant};
///
/// let delayed_one_hour = Delay::for_duration(123, Duration::from_secs(3600));
/// let delayed_now = Delay::until_instant("abc", Instant::now());
///
/// assert!(delayed_one_hour.delayed_until() > delayed_now.delayed_until());
/// assert_eq!(delayed_one_hour.value, 123);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delay<T> {
    /// The value that is delayed.
    pub value: T,

    /// The `Instant` until which `value` is delayed.
    until: Instant,
}

impl<T> Delay<T> {
    /// Creates a new `Delay` holding `value` and that is delayed until the
    /// given `Instant`.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use delay_heap::Delay;
    /// use std::time::Instant;
    ///
    /// let delayed_now = Delay::until_instant("abc", Instant::now());
    /// ```
    pub fn until_instant(value: T, until: Instant) -> Delay<T> {
        Delay { value, until }
    }

    /// Creates a new `Delay` holding `value` and that is delayed until the
    /// given `Duration` has elapsed.
    ///
    /// # Examples
    ///
    /// Basic usage:
    ///
    /// ```
    /// use delay_heap::Delay;
    /// use std::time::Duration;
    ///
    /// let delayed_one_hour = Delay::for_duration("abc", Duration::from_secs(3600));
    /// ```
    pub fn for_duration(value: T, duration: Duration) -> Delay<T> {
        Delay::until_instant(value, Instant::now() + duration)
    }
}

impl<T> Delayed for Delay<T> {
    fn delayed_until(&self) -> Instant {
        self.until
    }
}

impl<T: Default> Default for Delay<T> {
    fn default() -> Delay<T> {
        Delay {
            value: Default::default(),
            until: Instant::now(),
        }
    }
}
