//! megaAVR TWI backend
//!
//! Implements the `zygos-hal` controller trait over the memory-mapped
//! TWI peripheral of megaAVR parts. The register block sits at the same
//! addresses on every supported chip; only the bus pin map differs, so
//! the part is selected with a chip feature (`atmega328p` by default).
//!
//! This crate deliberately brings no time source. Supply whatever
//! millisecond [`zygos_hal::Clock`] the application already keeps (a
//! timer tick, usually) when constructing the master on top of
//! [`AtmegaTwi`].

#![no_std]

#[cfg(not(any(
    feature = "atmega328p",
    feature = "atmega644",
    feature = "atmega1280"
)))]
compile_error!("select a chip feature: atmega328p, atmega644 or atmega1280");

pub mod bitrate;
pub mod pullup;
pub mod regs;
pub mod twi;

pub use twi::AtmegaTwi;
