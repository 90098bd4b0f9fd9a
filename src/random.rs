//! A per-thread pseudo-random number source.
//!
//! Each thread lazily constructs its own [`StdRng`] on first access, seeded
//! from the operating system, so worker threads draw random numbers without
//! sharing or locking a generator.
//!
//! # Examples
//!
//! ```
//! use delay_heap::random;
//!
//! let roll = random::random_range(1..=6);
//! assert!((1..=6).contains(&roll));
//! ```

use std::cell::RefCell;

use rand::distr::uniform::{SampleRange, SampleUniform};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

thread_local! {
    static THREAD_RNG: RefCell<StdRng> = RefCell::new(StdRng::from_os_rng());
}

/// Runs `f` with mutable access to the calling thread's generator.
///
/// The generator is created on the thread's first use and lives until the
/// thread exits.
pub fn with_rng<R>(f: impl FnOnce(&mut StdRng) -> R) -> R {
    THREAD_RNG.with(|rng| f(&mut rng.borrow_mut()))
}

/// Returns the next random `u32` from the calling thread's generator.
pub fn next_u32() -> u32 {
    with_rng(|rng| rng.next_u32())
}

/// Returns the next random `u64` from the calling thread's generator.
pub fn next_u64() -> u64 {
    with_rng(|rng| rng.next_u64())
}

/// Returns a uniformly distributed value from `range`.
///
/// # Panics
///
/// Panics if the range is empty.
pub fn random_range<T, R>(range: R) -> T
where
    T: SampleUniform,
    R: SampleRange<T>,
{
    with_rng(|rng| rng.random_range(range))
}

/// Fills `buf` with random bytes from the calling thread's generator.
pub fn fill(buf: &mut [u8]) {
    with_rng(|rng| rng.fill_bytes(buf));
}
