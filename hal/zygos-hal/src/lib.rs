//! Zygos Hardware Abstraction Layer
//!
//! This crate defines the capability traits the Zygos two-wire (I2C) master
//! stack is written against. Chip-specific backends implement them over real
//! registers; the simulator implements them over plain state so the whole
//! stack can be tested on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Bus users (zygos-devices, apps)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  zygos-core (engine + high-level ops)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  zygos-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  zygos-hal-   │       │   zygos-sim   │
//! │    atmega     │       │  (host tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`controller::TwiController`] - Register-level two-wire controller access
//! - [`clock::Clock`] - Millisecond time source for timeout supervision

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod controller;
pub mod status;
pub mod twi;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use controller::{Direction, TwiController};
pub use status::BusStatus;
pub use twi::TwiConfig;
