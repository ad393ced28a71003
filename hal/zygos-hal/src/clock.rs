//! Millisecond time source
//!
//! Timeout supervision in the transaction engine needs nothing more than a
//! free-running millisecond counter. Backends wire this to whatever tick
//! source the platform has; tests drive it by hand.

/// A monotonic millisecond counter.
pub trait Clock {
    /// Milliseconds since some arbitrary epoch.
    ///
    /// The counter is allowed to wrap; consumers must compare readings
    /// with wrapping arithmetic.
    fn millis(&self) -> u32;
}
