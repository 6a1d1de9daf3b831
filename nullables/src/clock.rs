//! Nullable clock: deterministic block heights and times.

use interstake_types::{BlockContext, Timestamp};
use std::cell::Cell;

/// A deterministic block clock for testing.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    height: Cell<u64>,
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            height: Cell::new(1),
            current: Cell::new(initial_secs),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    pub fn height(&self) -> u64 {
        self.height.get()
    }

    /// The block currently being processed.
    pub fn context(&self) -> BlockContext {
        BlockContext::new(self.height.get(), self.now())
    }

    /// Advance time without producing a block.
    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get() + secs);
    }

    /// Move to the next block, `secs` later.
    pub fn next_block(&self, secs: u64) -> BlockContext {
        self.height.set(self.height.get() + 1);
        self.advance(secs);
        self.context()
    }

    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }
}
