//! Two-wire controller abstractions
//!
//! A [`TwiController`] exposes the raw register surface of a two-wire
//! (I2C) master peripheral: one control register that arms bus actions,
//! one status register that reports the outcome, and one data register
//! that carries address and payload bytes. The transaction engine in
//! `zygos-core` drives the whole protocol through these five accessors,
//! so anything that can model the registers can carry the stack.

/// Control register bits.
///
/// The layout matches the classic AVR-style two-wire control register so
/// that hardware backends can write values through unchanged. Backends for
/// other register layouts translate in their [`TwiController`] impl.
pub mod ctrl {
    /// Completion flag. Reads 1 when the current bus action has finished;
    /// writing 1 clears it and arms the next action.
    pub const FLAG: u8 = 0x80;
    /// Acknowledge enable. When set, a received byte is answered with ACK.
    pub const ACK: u8 = 0x40;
    /// Transmit a start (or repeated start) condition.
    pub const START: u8 = 0x20;
    /// Transmit a stop condition. Hardware clears this bit once the stop
    /// has actually been driven onto the bus.
    pub const STOP: u8 = 0x10;
    /// Peripheral enable. While clear the controller releases both lines.
    pub const ENABLE: u8 = 0x04;
}

/// Transfer direction encoded in the address byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master transmits to the slave (SLA+W).
    Write,
    /// Master receives from the slave (SLA+R).
    Read,
}

impl Direction {
    /// Build the on-wire address byte for a 7-bit address: the address in
    /// the upper seven bits, the direction in bit 0.
    pub const fn address_byte(self, address: u8) -> u8 {
        let bit = match self {
            Direction::Write => 0,
            Direction::Read => 1,
        };
        (address << 1) | bit
    }
}

/// Register-level access to a two-wire master controller.
///
/// Implementations only move bytes between the caller and the peripheral;
/// all sequencing, timeout supervision and status interpretation live in
/// the `zygos-core` transaction engine.
pub trait TwiController {
    /// Write the control register.
    ///
    /// Writing [`ctrl::FLAG`] together with action bits arms a bus action.
    /// Writing all zeroes disables the peripheral and releases the lines.
    fn write_control(&mut self, bits: u8);

    /// Read the control register.
    ///
    /// Used to poll [`ctrl::FLAG`] for action completion and
    /// [`ctrl::STOP`] for stop-condition completion.
    fn control(&mut self) -> u8;

    /// Read the prescaler-masked status register.
    ///
    /// The value identifies the outcome of the last completed bus action;
    /// see [`crate::status::code`] for the defined codes.
    fn status(&mut self) -> u8;

    /// Load a byte into the data register before arming a transmit.
    fn write_data(&mut self, byte: u8);

    /// Read the byte latched in the data register after a receive completes.
    fn read_data(&mut self) -> u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_byte_write() {
        assert_eq!(Direction::Write.address_byte(0x50), 0xA0);
        assert_eq!(Direction::Write.address_byte(0x00), 0x00);
    }

    #[test]
    fn test_address_byte_read() {
        assert_eq!(Direction::Read.address_byte(0x50), 0xA1);
        assert_eq!(Direction::Read.address_byte(0x7F), 0xFF);
    }

    #[test]
    fn test_ctrl_bits_are_distinct() {
        let all = ctrl::FLAG | ctrl::ACK | ctrl::START | ctrl::STOP | ctrl::ENABLE;
        assert_eq!(all.count_ones(), 5);
    }
}
