//! Polled transaction engine
//!
//! The five bus primitives (start, address, transmit, receive, stop),
//! each one an arm-poll-decode cycle over a [`TwiController`]. The engine
//! owns timeout supervision and lockup recovery; composing primitives
//! into whole transactions is [`crate::master`]'s job.
//!
//! A timeout of zero disables supervision entirely: the poll loops then
//! spin until the hardware answers, which on a wedged bus is never. Any
//! deployment that cannot tolerate that should configure a timeout.

use zygos_hal::controller::{ctrl, TwiController};
use zygos_hal::{BusStatus, Clock, Direction};

use crate::error::PrimitiveError;

/// Default completion timeout in milliseconds. Zero, i.e. disabled.
pub const DEFAULT_TIMEOUT_MS: u16 = 0;

/// Polled five-primitive transaction engine.
///
/// Owns the controller and the clock. Every primitive arms one bus
/// action, polls the completion flag under the configured timeout, and
/// decodes the resulting status into success or a [`PrimitiveError`].
/// When the hardware stops answering, the engine resets the controller
/// to free the bus before reporting the timeout.
#[derive(Debug)]
pub struct TransactionEngine<C, K> {
    controller: C,
    clock: K,
    timeout_ms: u16,
}

impl<C: TwiController, K: Clock> TransactionEngine<C, K> {
    pub fn new(controller: C, clock: K) -> Self {
        Self {
            controller,
            clock,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Completion timeout in milliseconds; zero means wait forever.
    pub fn timeout(&self) -> u16 {
        self.timeout_ms
    }

    pub fn set_timeout(&mut self, ms: u16) {
        self.timeout_ms = ms;
    }

    /// Shared view of the controller, for inspection.
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Shared view of the clock.
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Power the controller up with acknowledgement enabled.
    pub fn enable(&mut self) {
        self.controller.write_control(ctrl::ENABLE | ctrl::ACK);
    }

    /// Power the controller down and release both lines.
    pub fn disable(&mut self) {
        self.controller.write_control(0);
    }

    /// Transmit a start or repeated start condition.
    pub fn start(&mut self) -> Result<(), PrimitiveError> {
        let armed_at = self.clock.millis();
        self.controller
            .write_control(ctrl::FLAG | ctrl::START | ctrl::ENABLE);
        self.wait_completion(armed_at)?;
        match BusStatus::from_raw(self.controller.status()) {
            BusStatus::Start | BusStatus::RepeatedStart => Ok(()),
            BusStatus::ArbitrationLost => {
                self.reset_bus();
                Err(PrimitiveError::Fault(BusStatus::ArbitrationLost))
            }
            other => Err(PrimitiveError::Fault(other)),
        }
    }

    /// Transmit the address byte for `direction` and check it was
    /// acknowledged in that same direction.
    pub fn send_address(
        &mut self,
        address: u8,
        direction: Direction,
    ) -> Result<(), PrimitiveError> {
        self.controller.write_data(direction.address_byte(address));
        let armed_at = self.clock.millis();
        self.controller.write_control(ctrl::FLAG | ctrl::ENABLE);
        self.wait_completion(armed_at)?;
        let (acked, nacked) = match direction {
            Direction::Write => (BusStatus::SlaWriteAck, BusStatus::SlaWriteNack),
            Direction::Read => (BusStatus::SlaReadAck, BusStatus::SlaReadNack),
        };
        let status = BusStatus::from_raw(self.controller.status());
        if status == acked {
            Ok(())
        } else if status == nacked {
            // Nobody home at that address: free the bus, report the refusal.
            let _ = self.stop();
            Err(PrimitiveError::Nack(status))
        } else {
            self.reset_bus();
            Err(PrimitiveError::Fault(status))
        }
    }

    /// Transmit one data byte and check its acknowledgement.
    pub fn send_byte(&mut self, byte: u8) -> Result<(), PrimitiveError> {
        self.controller.write_data(byte);
        let armed_at = self.clock.millis();
        self.controller.write_control(ctrl::FLAG | ctrl::ENABLE);
        self.wait_completion(armed_at)?;
        match BusStatus::from_raw(self.controller.status()) {
            BusStatus::DataSentAck => Ok(()),
            BusStatus::DataSentNack => {
                let _ = self.stop();
                Err(PrimitiveError::Nack(BusStatus::DataSentNack))
            }
            other => {
                self.reset_bus();
                Err(PrimitiveError::Fault(other))
            }
        }
    }

    /// Receive one byte, answering ACK (more to come) or NACK (last byte).
    pub fn receive_byte(&mut self, ack: bool) -> Result<u8, PrimitiveError> {
        let armed_at = self.clock.millis();
        let bits = if ack {
            ctrl::FLAG | ctrl::ENABLE | ctrl::ACK
        } else {
            ctrl::FLAG | ctrl::ENABLE
        };
        self.controller.write_control(bits);
        self.wait_completion(armed_at)?;
        let expected = if ack {
            BusStatus::DataReceivedAck
        } else {
            BusStatus::DataReceivedNack
        };
        match BusStatus::from_raw(self.controller.status()) {
            BusStatus::ArbitrationLost => {
                self.reset_bus();
                Err(PrimitiveError::Fault(BusStatus::ArbitrationLost))
            }
            status if status == expected => Ok(self.controller.read_data()),
            status => Err(PrimitiveError::Fault(status)),
        }
    }

    /// Transmit a stop condition and wait for it to leave the bus.
    pub fn stop(&mut self) -> Result<(), PrimitiveError> {
        let armed_at = self.clock.millis();
        self.controller
            .write_control(ctrl::FLAG | ctrl::ENABLE | ctrl::STOP);
        // The stop bit self-clears once the condition has been driven.
        while self.controller.control() & ctrl::STOP != 0 {
            if self.timeout_ms == 0 {
                continue;
            }
            if self.clock.millis().wrapping_sub(armed_at) >= u32::from(self.timeout_ms) {
                self.reset_bus();
                return Err(PrimitiveError::Timeout);
            }
        }
        Ok(())
    }

    /// Poll the completion flag; on timeout, reset the bus and fail.
    fn wait_completion(&mut self, armed_at: u32) -> Result<(), PrimitiveError> {
        while self.controller.control() & ctrl::FLAG == 0 {
            if self.timeout_ms == 0 {
                continue;
            }
            if self.clock.millis().wrapping_sub(armed_at) >= u32::from(self.timeout_ms) {
                self.reset_bus();
                return Err(PrimitiveError::Timeout);
            }
        }
        Ok(())
    }

    /// Lockup recovery: drop the controller entirely, then re-enable it.
    /// Releasing both lines lets a wedged slave clock out whatever bit it
    /// was holding; in-flight transaction state is abandoned.
    fn reset_bus(&mut self) {
        self.controller.write_control(0);
        self.controller.write_control(ctrl::ENABLE | ctrl::ACK);
    }
}
