//! Bus status codes
//!
//! After every completed bus action the controller's status register holds
//! one of a small set of codes describing what happened on the wire. The
//! raw values here are the prescaler-masked codes of AVR-style two-wire
//! hardware; [`BusStatus`] gives them a closed, matchable shape while
//! [`BusStatus::Other`] keeps unknown codes representable.

/// Raw status register values, already masked of prescaler bits.
pub mod code {
    /// Start condition transmitted.
    pub const START: u8 = 0x08;
    /// Repeated start condition transmitted.
    pub const REPEATED_START: u8 = 0x10;
    /// SLA+W transmitted, ACK received.
    pub const SLA_WRITE_ACK: u8 = 0x18;
    /// SLA+W transmitted, NACK received.
    pub const SLA_WRITE_NACK: u8 = 0x20;
    /// Data byte transmitted, ACK received.
    pub const DATA_SENT_ACK: u8 = 0x28;
    /// Data byte transmitted, NACK received.
    pub const DATA_SENT_NACK: u8 = 0x30;
    /// Arbitration lost to another master.
    pub const ARBITRATION_LOST: u8 = 0x38;
    /// SLA+R transmitted, ACK received.
    pub const SLA_READ_ACK: u8 = 0x40;
    /// SLA+R transmitted, NACK received.
    pub const SLA_READ_NACK: u8 = 0x48;
    /// Data byte received, ACK returned.
    pub const DATA_RECEIVED_ACK: u8 = 0x50;
    /// Data byte received, NACK returned.
    pub const DATA_RECEIVED_NACK: u8 = 0x58;
    /// No relevant state; bus idle.
    pub const IDLE: u8 = 0xF8;
}

/// Decoded controller status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusStatus {
    Start,
    RepeatedStart,
    SlaWriteAck,
    SlaWriteNack,
    DataSentAck,
    DataSentNack,
    ArbitrationLost,
    SlaReadAck,
    SlaReadNack,
    DataReceivedAck,
    DataReceivedNack,
    /// Any code without a dedicated variant, preserved verbatim.
    Other(u8),
}

impl BusStatus {
    /// Decode a masked status register value.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            code::START => BusStatus::Start,
            code::REPEATED_START => BusStatus::RepeatedStart,
            code::SLA_WRITE_ACK => BusStatus::SlaWriteAck,
            code::SLA_WRITE_NACK => BusStatus::SlaWriteNack,
            code::DATA_SENT_ACK => BusStatus::DataSentAck,
            code::DATA_SENT_NACK => BusStatus::DataSentNack,
            code::ARBITRATION_LOST => BusStatus::ArbitrationLost,
            code::SLA_READ_ACK => BusStatus::SlaReadAck,
            code::SLA_READ_NACK => BusStatus::SlaReadNack,
            code::DATA_RECEIVED_ACK => BusStatus::DataReceivedAck,
            code::DATA_RECEIVED_NACK => BusStatus::DataReceivedNack,
            other => BusStatus::Other(other),
        }
    }

    /// The raw status register value this status decodes from.
    pub const fn raw(self) -> u8 {
        match self {
            BusStatus::Start => code::START,
            BusStatus::RepeatedStart => code::REPEATED_START,
            BusStatus::SlaWriteAck => code::SLA_WRITE_ACK,
            BusStatus::SlaWriteNack => code::SLA_WRITE_NACK,
            BusStatus::DataSentAck => code::DATA_SENT_ACK,
            BusStatus::DataSentNack => code::DATA_SENT_NACK,
            BusStatus::ArbitrationLost => code::ARBITRATION_LOST,
            BusStatus::SlaReadAck => code::SLA_READ_ACK,
            BusStatus::SlaReadNack => code::SLA_READ_NACK,
            BusStatus::DataReceivedAck => code::DATA_RECEIVED_ACK,
            BusStatus::DataReceivedNack => code::DATA_RECEIVED_NACK,
            BusStatus::Other(raw) => raw,
        }
    }
}
