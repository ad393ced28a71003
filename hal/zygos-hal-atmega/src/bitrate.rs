//! Bus clock divider
//!
//! SCL frequency on these parts is `F_CPU / (16 + 2 * TWBR * prescaler)`.
//! The prescaler stays pinned at 1, so the divider for a target frequency
//! is `((F_CPU / f) - 16) / 2`, saturated into the register's range.

/// Compute the bit-rate register value for `bus_hz`, prescaler 1.
///
/// Targets faster than the hardware can divide to come out as 0 (the
/// fastest the part can do); targets slower than the divider reaches
/// saturate at 255. A zero target is nonsense and pins the bus to its
/// slowest rate rather than dividing by zero.
pub const fn divider(cpu_hz: u32, bus_hz: u32) -> u8 {
    if bus_hz == 0 {
        return u8::MAX;
    }
    let cycles = cpu_hz / bus_hz;
    if cycles <= 16 {
        return 0;
    }
    let value = (cycles - 16) / 2;
    if value > u8::MAX as u32 {
        u8::MAX
    } else {
        value as u8
    }
}

/// The SCL frequency a divider value actually produces, prescaler 1.
pub const fn frequency(cpu_hz: u32, twbr: u8) -> u32 {
    cpu_hz / (16 + 2 * twbr as u32)
}
