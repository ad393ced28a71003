//! Memory devices

pub mod eeprom24;
