//! TWI peripheral handle

use zygos_hal::controller::TwiController;
use zygos_hal::TwiConfig;

use crate::bitrate;
use crate::pullup;
use crate::regs;

/// The memory-mapped TWI master peripheral.
///
/// The supported parts have exactly one TWI block; two values of this
/// type would alias its registers, so construction is unsafe and the
/// caller keeps the singleton promise.
#[derive(Debug)]
pub struct AtmegaTwi {
    cpu_hz: u32,
}

impl AtmegaTwi {
    /// # Safety
    ///
    /// Only one `AtmegaTwi` may exist at a time, and nothing else may
    /// touch the TWI register block while it does.
    pub unsafe fn new(cpu_hz: u32) -> Self {
        Self { cpu_hz }
    }

    /// Program bus timing and pull-ups from `config`.
    ///
    /// Call once before enabling the controller; the frequency and the
    /// pull-up state can each be changed later on their own.
    pub fn configure(&mut self, config: &TwiConfig) {
        self.set_pullups(config.pullups);
        self.set_frequency(config.frequency);
    }

    /// Program the bit-rate divider for `frequency`, prescaler 1.
    pub fn set_frequency(&mut self, frequency: u32) {
        let status = regs::read(regs::TWSR);
        regs::write(regs::TWSR, status & !regs::TWPS_MASK);
        regs::write(regs::TWBR, bitrate::divider(self.cpu_hz, frequency));
    }

    /// Switch the internal pull-ups on the bus pins.
    pub fn set_pullups(&mut self, enabled: bool) {
        pullup::set(enabled);
    }
}

impl TwiController for AtmegaTwi {
    fn write_control(&mut self, bits: u8) {
        regs::write(regs::TWCR, bits);
    }

    fn control(&mut self) -> u8 {
        regs::read(regs::TWCR)
    }

    fn status(&mut self) -> u8 {
        regs::read(regs::TWSR) & regs::TWS_MASK
    }

    fn write_data(&mut self, byte: u8) {
        regs::write(regs::TWDR, byte);
    }

    fn read_data(&mut self) -> u8 {
        regs::read(regs::TWDR)
    }
}
