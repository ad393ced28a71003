//! 24-series serial EEPROM driver
//!
//! Covers the parts with a two-byte memory address (24C32 through 24C512):
//! byte and page writes through the wide-selector operations, addressed
//! and current-address reads, and acknowledge polling to wait out the
//! device's internal write cycle.

use zygos_core::error::{Error, PrimitiveError, TransactionStep};
use zygos_core::TwiMaster;
use zygos_hal::controller::TwiController;
use zygos_hal::{Clock, Direction};

/// Write page size of the smaller parts in the family. Larger parts have
/// bigger pages; writes clamped to this size stay legal on all of them.
pub const PAGE_SIZE: usize = 32;

/// Upper bound on acknowledge-polling probes before giving up on a part
/// that never comes back from its write cycle.
const ACK_POLL_ATTEMPTS: u16 = 1000;

/// Driver for a two-byte-addressed serial EEPROM.
///
/// Owns the bus master; [`Eeprom24::release`] gives it back when other
/// devices need the bus.
#[derive(Debug)]
pub struct Eeprom24<C, K> {
    bus: TwiMaster<C, K>,
    address: u8,
}

impl<C: TwiController, K: Clock> Eeprom24<C, K> {
    pub fn new(bus: TwiMaster<C, K>, address: u8) -> Self {
        Self { bus, address }
    }

    /// Hand the bus master back.
    pub fn release(self) -> TwiMaster<C, K> {
        self.bus
    }

    /// Write one byte at `at`.
    ///
    /// The device goes busy for its internal write cycle afterwards;
    /// call [`Eeprom24::await_ready`] before the next access.
    pub fn write_byte(&mut self, at: u16, value: u8) -> Result<(), Error> {
        self.bus.write16_byte(self.address, at, value)
    }

    /// Write `data` starting at `at`, clamped to the end of the page
    /// `at` falls in. Returns how many bytes were actually written;
    /// callers spanning pages loop, with [`Eeprom24::await_ready`]
    /// between pages.
    pub fn write_page(&mut self, at: u16, data: &[u8]) -> Result<usize, Error> {
        let space = PAGE_SIZE - usize::from(at) % PAGE_SIZE;
        let count = data.len().min(space);
        self.bus.write16(self.address, at, &data[..count])?;
        Ok(count)
    }

    /// Read one byte at `at`.
    pub fn read_byte(&mut self, at: u16) -> Result<u8, Error> {
        let mut buf = [0u8; 1];
        self.bus.read16_into(self.address, at, &mut buf)?;
        Ok(buf[0])
    }

    /// Read `buf.len()` bytes starting at `at`.
    pub fn read(&mut self, at: u16, buf: &mut [u8]) -> Result<(), Error> {
        self.bus.read16_into(self.address, at, buf)
    }

    /// Read from the device's current address pointer, which continues
    /// one past wherever the previous access ended.
    pub fn read_current(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.bus.read_into(self.address, buf)
    }

    /// Wait out the internal write cycle by acknowledge polling: the
    /// part NACKs its own address until the cycle completes.
    pub fn await_ready(&mut self) -> Result<(), Error> {
        let mut last = Error::Timeout(TransactionStep::AddressWrite);
        for _ in 0..ACK_POLL_ATTEMPTS {
            let engine = self.bus.engine();
            engine
                .start()
                .map_err(|e| e.at(TransactionStep::Start))?;
            match engine.send_address(self.address, Direction::Write) {
                Ok(()) => {
                    let _ = engine.stop();
                    return Ok(());
                }
                // Still busy; the refusal already freed the bus.
                Err(PrimitiveError::Nack(status)) => {
                    last = Error::Nack(status);
                }
                Err(other) => return Err(other.at(TransactionStep::AddressWrite)),
            }
        }
        Err(last)
    }
}
