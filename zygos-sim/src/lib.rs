//! Zygos bus simulation
//!
//! Host-side doubles for the `zygos-hal` capabilities, used to test the
//! transaction engine and everything above it without hardware:
//!
//! - [`SimController`] replays a scripted sequence of status outcomes and
//!   records every register access, for exercising one primitive at a time.
//! - [`SimBus`] models a complete bus with one addressable register-file
//!   slave behind it and keeps an event log of the wire traffic.
//! - [`SimClock`] is a hand-wound millisecond counter.
//!
//! All three are plain state machines; nothing here touches real time or
//! real I/O, so tests stay deterministic.

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod clock;
pub mod controller;

pub use bus::{BusEvent, SimBus, SimSlave};
pub use clock::SimClock;
pub use controller::{SimController, SimResponse};
