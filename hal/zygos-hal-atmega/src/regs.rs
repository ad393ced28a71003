//! TWI register block
//!
//! Data-space addresses of the TWI registers, identical across the
//! supported megaAVR parts, plus the volatile accessors the rest of the
//! crate goes through.

/// Bit-rate register.
pub const TWBR: u8 = 0xB8;
/// Status register: status code in the upper five bits, prescaler in the
/// low two.
pub const TWSR: u8 = 0xB9;
/// Slave address register; master-only operation leaves it alone.
pub const TWAR: u8 = 0xBA;
/// Data register.
pub const TWDR: u8 = 0xBB;
/// Control register.
pub const TWCR: u8 = 0xBC;

/// Prescaler field mask in [`TWSR`].
pub const TWPS_MASK: u8 = 0x03;
/// Status field mask in [`TWSR`].
pub const TWS_MASK: u8 = 0xF8;

pub(crate) fn write(address: u8, value: u8) {
    unsafe { (usize::from(address) as *mut u8).write_volatile(value) }
}

pub(crate) fn read(address: u8) -> u8 {
    unsafe { (usize::from(address) as *const u8).read_volatile() }
}
