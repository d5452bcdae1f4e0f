//! Request identifiers and the monotonic counters that assign them.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// An unsigned, monotonically increasing request identifier.
///
/// Two independent ID spaces exist in this crate: a provider-global one for
/// `mount`/`unmount` deferred handles, and a per-[`crate::manager::RequestManager`]
/// one for per-request IDs passed through its FIFO queue. Both start at zero and
/// pre-increment on assignment, so the first ID ever handed out is `1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u32);

impl RequestId {
    /// Wraps a raw value. Only used where an ID arrives from outside the counter
    /// (e.g. `openRequestId`/`operationRequestId` fields that reference another
    /// request already assigned by this or another counter).
    pub const fn from_raw(value: u32) -> Self {
        RequestId(value)
    }

    /// The raw numeric value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A counter that pre-increments to assign [`RequestId`]s, starting at 1.
#[derive(Debug, Default)]
pub struct IdCounter(AtomicU32);

impl IdCounter {
    /// Creates a counter whose next assigned ID is `1`.
    pub const fn new() -> Self {
        IdCounter(AtomicU32::new(0))
    }

    /// Assigns and returns the next ID.
    pub fn next(&self) -> RequestId {
        RequestId(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
