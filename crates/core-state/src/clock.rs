//! Time source for debounce windows.
//!
//! History flushing and syntax-check scheduling compare deadlines against an
//! injected `Clock` instead of arming real timers. The host polls on its own
//! timer callback; tests drive a `ManualClock` forward deterministically.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time via `Instant::now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Logical clock advanced by hand. Clones share the same time line, so a test
/// can keep one handle while the history owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}
