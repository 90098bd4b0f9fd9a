use thiserror::Error;

/// Structural errors surfaced by queue construction.
///
/// Running out of data is never an error: `pop`, `peek` and the non-blocking
/// `poll` all report an empty structure as `None`. Capacity growth clamps to
/// `usize::MAX` instead of failing, so an unbounded queue never reports an
/// overflow short of true memory exhaustion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A capacity of zero was requested at construction time.
    #[error("initial capacity must be at least 1 (got {0})")]
    InvalidCapacity(usize),
}
