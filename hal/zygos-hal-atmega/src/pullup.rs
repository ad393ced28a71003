//! Bus pin pull-ups
//!
//! The TWI pins double as GPIO, and their port pull-ups are what a bare
//! bus relies on when no external resistors are fitted. Which port
//! carries SDA and SCL differs per part, so the map is selected by chip
//! feature.

use crate::regs;

#[cfg(feature = "atmega328p")]
mod map {
    /// PORTC data register.
    pub const PORT: u8 = 0x28;
    /// PC4 (SDA) and PC5 (SCL).
    pub const MASK: u8 = 0x30;
}

#[cfg(all(feature = "atmega644", not(feature = "atmega328p")))]
mod map {
    /// PORTC data register.
    pub const PORT: u8 = 0x28;
    /// PC0 (SCL) and PC1 (SDA).
    pub const MASK: u8 = 0x03;
}

#[cfg(all(
    feature = "atmega1280",
    not(any(feature = "atmega328p", feature = "atmega644"))
))]
mod map {
    /// PORTD data register.
    pub const PORT: u8 = 0x2B;
    /// PD0 (SCL) and PD1 (SDA).
    pub const MASK: u8 = 0x03;
}

pub use map::{MASK, PORT};

/// Drive or release the pull-ups on both bus pins, leaving the rest of
/// the port untouched.
pub(crate) fn set(enabled: bool) {
    let port = regs::read(PORT);
    let value = if enabled { port | MASK } else { port & !MASK };
    regs::write(PORT, value);
}
