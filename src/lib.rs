//! A concurrent unbounded blocking queue where each element can only be removed when
//! its delay expires, backed by a growable binary min-heap.

#![warn(missing_docs)]

mod delay_queue;
mod delayed;
mod error;
mod guarded_array;
mod heap;
pub mod random;

pub use crate::delay_queue::DelayQueue;
pub use crate::delayed::{Delay, Delayed};
pub use crate::error::Error;
pub use crate::guarded_array::GuardedArray;
pub use crate::heap::{Comparator, PriorityQueue};
