//! `embedded-hal` bindings
//!
//! [`TwiMaster`] implements the blocking [`embedded_hal::i2c::I2c`] trait
//! so ecosystem drivers run over this stack unchanged. The transaction
//! contract is honored literally: one start up front, a repeated start
//! only when the direction flips, the final byte of a trailing read
//! answered with NACK, and a single stop at the end.

use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource, Operation, SevenBitAddress};

use zygos_hal::controller::TwiController;
use zygos_hal::{BusStatus, Clock, Direction};

use crate::error::{Error, StartKind};
use crate::master::TwiMaster;

impl i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::Timeout(_) => ErrorKind::Other,
            Error::Nack(status) => {
                let source = match status {
                    BusStatus::SlaWriteNack | BusStatus::SlaReadNack => {
                        NoAcknowledgeSource::Address
                    }
                    BusStatus::DataSentNack => NoAcknowledgeSource::Data,
                    _ => NoAcknowledgeSource::Unknown,
                };
                ErrorKind::NoAcknowledge(source)
            }
            Error::Fault(BusStatus::ArbitrationLost) => ErrorKind::ArbitrationLoss,
            Error::Fault(_) => ErrorKind::Bus,
        }
    }
}

impl<C: TwiController, K: Clock> i2c::ErrorType for TwiMaster<C, K> {
    type Error = Error;
}

impl<C: TwiController, K: Clock> i2c::I2c<SevenBitAddress> for TwiMaster<C, K> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if operations.is_empty() {
            return Ok(());
        }
        let last = operations.len() - 1;
        let mut active: Option<Direction> = None;
        for (index, operation) in operations.iter_mut().enumerate() {
            let direction = match operation {
                Operation::Read(_) => Direction::Read,
                Operation::Write(_) => Direction::Write,
            };
            if active != Some(direction) {
                let kind = if active.is_none() {
                    StartKind::Initial
                } else {
                    StartKind::Repeated
                };
                self.start_step(kind)?;
                self.address_step(address, direction)?;
                active = Some(direction);
            }
            match operation {
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        self.data_step(byte)?;
                    }
                }
                Operation::Read(buf) => {
                    let total = buf.len();
                    for (offset, slot) in buf.iter_mut().enumerate() {
                        let final_byte = index == last && offset + 1 == total;
                        *slot = self.receive_step(!final_byte)?;
                    }
                }
            }
        }
        self.stop_step()
    }
}
