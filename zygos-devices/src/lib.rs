//! Device drivers built on the Zygos bus master
//!
//! Concrete drivers for parts hanging off the two-wire bus, written
//! against [`zygos_core::TwiMaster`]:
//!
//! - Serial EEPROMs with a two-byte address (24C32 and up)

#![no_std]
#![deny(unsafe_code)]

pub mod memory;

pub use memory::eeprom24::Eeprom24;
