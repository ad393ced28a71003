//! Step-coded failure taxonomy
//!
//! Every failed operation answers two questions: where in the transaction
//! it failed, and what the controller said. Timeouts carry the
//! [`TransactionStep`] that hung; acknowledgement failures and faults
//! carry the decoded [`BusStatus`]. [`Error::code`] flattens either into
//! the compact diagnostic byte used in logs and host reports.

use zygos_hal::{BusStatus, Direction};

/// Which flavor of start condition a transaction used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartKind {
    /// First start of a transaction.
    Initial,
    /// Repeated start separating two phases of one transaction.
    Repeated,
}

/// The numbered steps a transaction can fail at.
///
/// The numbering stays below the lowest raw status code (0x08), so a
/// step code and a status code can share one byte without colliding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionStep {
    /// Initial start condition.
    Start,
    /// Address byte with the write bit.
    AddressWrite,
    /// Outgoing data byte, register selectors included.
    DataSend,
    /// Repeated start condition.
    RepeatedStart,
    /// Address byte with the read bit.
    AddressRead,
    /// Incoming data byte.
    DataReceive,
    /// Stop condition.
    Stop,
}

impl TransactionStep {
    /// The step a start condition of the given kind belongs to.
    pub const fn of_start(kind: StartKind) -> Self {
        match kind {
            StartKind::Initial => TransactionStep::Start,
            StartKind::Repeated => TransactionStep::RepeatedStart,
        }
    }

    /// The step an address byte of the given direction belongs to.
    pub const fn of_address(direction: Direction) -> Self {
        match direction {
            Direction::Write => TransactionStep::AddressWrite,
            Direction::Read => TransactionStep::AddressRead,
        }
    }

    /// Compact diagnostic code for this step, 1 through 7.
    pub const fn code(self) -> u8 {
        match self {
            TransactionStep::Start => 1,
            TransactionStep::AddressWrite => 2,
            TransactionStep::DataSend => 3,
            TransactionStep::RepeatedStart => 4,
            TransactionStep::AddressRead => 5,
            TransactionStep::DataReceive => 6,
            TransactionStep::Stop => 7,
        }
    }
}

/// Failure of one bus primitive, before it is pinned to a step.
///
/// The engine does not know which step of which composite operation it
/// was running; callers attach that context with [`PrimitiveError::at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrimitiveError {
    /// The controller never signalled completion inside the timeout
    /// window. Lockup recovery has already run.
    Timeout,
    /// The slave answered NACK where an ACK was needed. A stop has
    /// already been issued to free the bus.
    Nack(BusStatus),
    /// The controller reported a status the primitive cannot reconcile,
    /// lost arbitration included.
    Fault(BusStatus),
}

impl PrimitiveError {
    /// Pin this failure to the transaction step that was executing.
    pub const fn at(self, step: TransactionStep) -> Error {
        match self {
            PrimitiveError::Timeout => Error::Timeout(step),
            PrimitiveError::Nack(status) => Error::Nack(status),
            PrimitiveError::Fault(status) => Error::Fault(status),
        }
    }
}

/// A failed bus operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The bus hung at the given step; lockup recovery has run.
    Timeout(TransactionStep),
    /// The slave declined an address or data byte.
    Nack(BusStatus),
    /// Unexpected controller status, notably lost arbitration.
    Fault(BusStatus),
}

impl Error {
    /// Compact diagnostic code.
    ///
    /// Timeouts map to their step number (1 through 7); everything else
    /// maps to the raw status register value (0x08 and up). Zero is never
    /// produced, so it remains free to mean success in host reports.
    pub const fn code(self) -> u8 {
        match self {
            Error::Timeout(step) => step.code(),
            Error::Nack(status) | Error::Fault(status) => status.raw(),
        }
    }
}
