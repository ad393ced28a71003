//! Hand-wound millisecond clock

use core::cell::Cell;

use zygos_hal::Clock;

/// A deterministic [`Clock`] for tests.
///
/// Every call to [`Clock::millis`] returns the current reading and then
/// advances it by a fixed step, so a polling loop observes time moving
/// forward without any real delay. A step of zero freezes time.
#[derive(Debug)]
pub struct SimClock {
    now: Cell<u32>,
    step: u32,
    queries: Cell<u32>,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    /// Clock starting at zero, advancing 1 ms per query.
    pub fn new() -> Self {
        Self::stepping(0, 1)
    }

    /// Clock frozen at `now`; queries never advance it.
    pub fn frozen(now: u32) -> Self {
        Self::stepping(now, 0)
    }

    /// Clock starting at `start`, advancing `step` ms per query.
    pub fn stepping(start: u32, step: u32) -> Self {
        Self {
            now: Cell::new(start),
            step,
            queries: Cell::new(0),
        }
    }

    /// How many times the clock has been read.
    pub fn queries(&self) -> u32 {
        self.queries.get()
    }
}

impl Clock for SimClock {
    fn millis(&self) -> u32 {
        let t = self.now.get();
        self.now.set(t.wrapping_add(self.step));
        self.queries.set(self.queries.get() + 1);
        t
    }
}
