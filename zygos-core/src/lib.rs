//! Board-agnostic two-wire bus master
//!
//! Master-mode driver core for AVR-style two-wire (I2C) controllers,
//! written against the `zygos-hal` capability traits so the same code
//! drives real silicon and the simulator:
//!
//! - Polled transaction engine: the five bus primitives with timeout
//!   supervision and lockup recovery
//! - Step-coded failure taxonomy that pins every error to the point in
//!   the transaction where it happened
//! - Register-oriented operations with one- and two-byte selectors,
//!   buffered or caller-buffer reads, and a bus scan
//! - Blocking `embedded-hal` I2C bindings

#![no_std]
#![deny(unsafe_code)]

pub mod buffer;
pub mod eh;
pub mod engine;
pub mod error;
pub mod master;

pub use buffer::{ReceiveBuffer, RECEIVE_BUFFER_SIZE};
pub use engine::TransactionEngine;
pub use error::{Error, PrimitiveError, StartKind, TransactionStep};
pub use master::{TwiMaster, SCAN_TIMEOUT_MS};
