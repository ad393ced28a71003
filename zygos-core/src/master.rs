//! High-level bus operations
//!
//! [`TwiMaster`] composes the engine's primitives into the familiar
//! register-oriented operations: selector writes of one or two bytes,
//! wide-integer conveniences, reads into the internal receive buffer or
//! a caller's slice, and a full-bus scan. Every operation runs one
//! complete transaction and leaves the bus stopped, or reset if the
//! hardware stopped answering.

use heapless::Vec;

use zygos_hal::controller::TwiController;
use zygos_hal::{Clock, Direction};

use crate::buffer::{ReceiveBuffer, RECEIVE_BUFFER_SIZE};
use crate::engine::TransactionEngine;
use crate::error::{Error, PrimitiveError, StartKind, TransactionStep};

/// Timeout applied while scanning, so one dead address cannot wedge the
/// whole sweep. The configured timeout is restored afterwards.
pub const SCAN_TIMEOUT_MS: u16 = 80;

/// Register selector transmitted after SLA+W.
#[derive(Debug, Clone, Copy)]
enum Selector {
    Byte(u8),
    Word(u16),
}

/// Two-wire bus master.
///
/// Owns the [`TransactionEngine`] and the receive buffer. Construct one
/// per bus, call [`TwiMaster::begin`] once, then use the operation
/// methods; everything is blocking and nothing here is interrupt driven.
#[derive(Debug)]
pub struct TwiMaster<C, K> {
    engine: TransactionEngine<C, K>,
    rx: ReceiveBuffer,
}

impl<C: TwiController, K: Clock> TwiMaster<C, K> {
    pub fn new(controller: C, clock: K) -> Self {
        Self {
            engine: TransactionEngine::new(controller, clock),
            rx: ReceiveBuffer::new(),
        }
    }

    /// Enable the controller and start acknowledging.
    pub fn begin(&mut self) {
        self.engine.enable();
    }

    /// Disable the controller and release both lines.
    pub fn end(&mut self) {
        self.engine.disable();
    }

    /// Completion timeout in milliseconds; zero disables supervision.
    pub fn timeout(&self) -> u16 {
        self.engine.timeout()
    }

    pub fn set_timeout(&mut self, ms: u16) {
        self.engine.set_timeout(ms);
    }

    /// The primitive engine, for sequences the operations do not cover.
    pub fn engine(&mut self) -> &mut TransactionEngine<C, K> {
        &mut self.engine
    }

    /// Shared view of the controller, for inspection.
    pub fn controller(&self) -> &C {
        self.engine.controller()
    }

    /// Bytes from the last buffered read not yet drained.
    pub fn available(&self) -> u8 {
        self.rx.available()
    }

    /// The next buffered byte, oldest first.
    pub fn receive(&mut self) -> Option<u8> {
        self.rx.take()
    }

    /// Write `data` to the register selected by `selector`.
    ///
    /// An empty slice transmits just the selector, which selector-addressed
    /// parts treat as a pointer positioning write.
    pub fn write(&mut self, address: u8, selector: u8, data: &[u8]) -> Result<(), Error> {
        self.write_transaction(address, Selector::Byte(selector), data)
    }

    /// Write one byte to the register selected by `selector`.
    pub fn write_byte(&mut self, address: u8, selector: u8, value: u8) -> Result<(), Error> {
        self.write(address, selector, &[value])
    }

    /// Write a `u16`, most significant byte first.
    pub fn write_u16(&mut self, address: u8, selector: u8, value: u16) -> Result<(), Error> {
        self.write(address, selector, &value.to_be_bytes())
    }

    /// Write a `u32`, most significant byte first.
    pub fn write_u32(&mut self, address: u8, selector: u8, value: u32) -> Result<(), Error> {
        self.write(address, selector, &value.to_be_bytes())
    }

    /// Write a `u64`, most significant byte first.
    pub fn write_u64(&mut self, address: u8, selector: u8, value: u64) -> Result<(), Error> {
        self.write(address, selector, &value.to_be_bytes())
    }

    /// Write `data` through a two-byte selector (EEPROM-style parts).
    pub fn write16(&mut self, address: u8, selector: u16, data: &[u8]) -> Result<(), Error> {
        self.write_transaction(address, Selector::Word(selector), data)
    }

    /// Write one byte through a two-byte selector.
    pub fn write16_byte(&mut self, address: u8, selector: u16, value: u8) -> Result<(), Error> {
        self.write16(address, selector, &[value])
    }

    /// Write a `u16` through a two-byte selector, most significant first.
    pub fn write16_u16(&mut self, address: u8, selector: u16, value: u16) -> Result<(), Error> {
        self.write16(address, selector, &value.to_be_bytes())
    }

    /// Write a `u32` through a two-byte selector, most significant first.
    pub fn write16_u32(&mut self, address: u8, selector: u16, value: u32) -> Result<(), Error> {
        self.write16(address, selector, &value.to_be_bytes())
    }

    /// Write a `u64` through a two-byte selector, most significant first.
    pub fn write16_u64(&mut self, address: u8, selector: u16, value: u64) -> Result<(), Error> {
        self.write16(address, selector, &value.to_be_bytes())
    }

    /// Read `count` bytes into the receive buffer without positioning,
    /// continuing from the slave's current pointer.
    ///
    /// A count of zero is bumped to one; the wire protocol cannot address
    /// a slave for reading without transferring at least one byte. Counts
    /// beyond the buffer capacity are clamped to it.
    pub fn read(&mut self, address: u8, count: u8) -> Result<(), Error> {
        self.read_to_internal(address, None, count)
    }

    /// Position with a one-byte selector, then read `count` bytes into
    /// the receive buffer. Count handling as in [`TwiMaster::read`].
    pub fn read_reg(&mut self, address: u8, selector: u8, count: u8) -> Result<(), Error> {
        self.read_to_internal(address, Some(Selector::Byte(selector)), count)
    }

    /// Two-byte selector variant of [`TwiMaster::read_reg`].
    pub fn read16(&mut self, address: u8, selector: u16, count: u8) -> Result<(), Error> {
        self.read_to_internal(address, Some(Selector::Word(selector)), count)
    }

    /// Read straight into `buf` without positioning, bypassing the
    /// receive buffer.
    ///
    /// An empty slice still transfers one byte on the wire (and discards
    /// it); see [`TwiMaster::read`] for why.
    pub fn read_into(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Error> {
        self.read_to_slice(address, None, buf)
    }

    /// Position with a one-byte selector, then read into `buf`.
    pub fn read_reg_into(
        &mut self,
        address: u8,
        selector: u8,
        buf: &mut [u8],
    ) -> Result<(), Error> {
        self.read_to_slice(address, Some(Selector::Byte(selector)), buf)
    }

    /// Two-byte selector variant of [`TwiMaster::read_reg_into`].
    pub fn read16_into(
        &mut self,
        address: u8,
        selector: u16,
        buf: &mut [u8],
    ) -> Result<(), Error> {
        self.read_to_slice(address, Some(Selector::Word(selector)), buf)
    }

    /// Probe every 7-bit address and collect those that acknowledge SLA+W.
    ///
    /// Runs under [`SCAN_TIMEOUT_MS`] and restores the configured timeout
    /// before returning. A NACK just means nobody answered there; a
    /// timeout means the bus itself is stuck, so the sweep aborts with
    /// that error.
    pub fn scan(&mut self) -> Result<Vec<u8, 128>, Error> {
        let saved = self.engine.timeout();
        self.engine.set_timeout(SCAN_TIMEOUT_MS);
        let mut found: Vec<u8, 128> = Vec::new();
        for address in 0..=0x7F {
            let probe = self.probe(address);
            let _ = self.engine.stop();
            match probe {
                Ok(true) => {
                    let _ = found.push(address);
                }
                Ok(false) => {}
                Err(error) => {
                    self.engine.set_timeout(saved);
                    return Err(error);
                }
            }
        }
        self.engine.set_timeout(saved);
        Ok(found)
    }

    /// One scan probe: does anything acknowledge SLA+W at `address`?
    fn probe(&mut self, address: u8) -> Result<bool, Error> {
        match self.engine.start() {
            Ok(()) => {}
            Err(PrimitiveError::Timeout) => {
                return Err(Error::Timeout(TransactionStep::Start));
            }
            Err(_) => return Ok(false),
        }
        match self.engine.send_address(address, Direction::Write) {
            Ok(()) => Ok(true),
            Err(PrimitiveError::Timeout) => Err(Error::Timeout(TransactionStep::AddressWrite)),
            Err(_) => Ok(false),
        }
    }

    fn write_transaction(
        &mut self,
        address: u8,
        selector: Selector,
        data: &[u8],
    ) -> Result<(), Error> {
        self.start_step(StartKind::Initial)?;
        self.address_step(address, Direction::Write)?;
        self.selector_step(selector)?;
        for &byte in data {
            self.data_step(byte)?;
        }
        self.stop_step()
    }

    /// The common front half of a read: start, optional selector
    /// positioning behind SLA+W, repeated start, then SLA+R.
    fn open_read(&mut self, address: u8, selector: Option<Selector>) -> Result<(), Error> {
        self.start_step(StartKind::Initial)?;
        if let Some(selector) = selector {
            self.address_step(address, Direction::Write)?;
            self.selector_step(selector)?;
            self.start_step(StartKind::Repeated)?;
        }
        self.address_step(address, Direction::Read)?;
        Ok(())
    }

    fn read_to_internal(
        &mut self,
        address: u8,
        selector: Option<Selector>,
        count: u8,
    ) -> Result<(), Error> {
        self.rx.reset();
        let count = usize::from(count).clamp(1, RECEIVE_BUFFER_SIZE);
        self.open_read(address, selector)?;
        for index in 0..count {
            let ack = index + 1 < count;
            let byte = self.receive_step(ack)?;
            // Buffered as they arrive, so a failed read keeps its partial data.
            self.rx.push(byte);
        }
        self.stop_step()
    }

    fn read_to_slice(
        &mut self,
        address: u8,
        selector: Option<Selector>,
        buf: &mut [u8],
    ) -> Result<(), Error> {
        let count = buf.len().max(1);
        self.open_read(address, selector)?;
        for index in 0..count {
            let ack = index + 1 < count;
            let byte = self.receive_step(ack)?;
            if let Some(slot) = buf.get_mut(index) {
                *slot = byte;
            }
        }
        self.stop_step()
    }

    pub(crate) fn start_step(&mut self, kind: StartKind) -> Result<(), Error> {
        self.engine
            .start()
            .map_err(|e| e.at(TransactionStep::of_start(kind)))
    }

    pub(crate) fn address_step(&mut self, address: u8, direction: Direction) -> Result<(), Error> {
        self.engine
            .send_address(address, direction)
            .map_err(|e| e.at(TransactionStep::of_address(direction)))
    }

    fn selector_step(&mut self, selector: Selector) -> Result<(), Error> {
        match selector {
            Selector::Byte(value) => self.data_step(value),
            Selector::Word(value) => {
                let [high, low] = value.to_be_bytes();
                self.data_step(high)?;
                self.data_step(low)
            }
        }
    }

    pub(crate) fn data_step(&mut self, byte: u8) -> Result<(), Error> {
        self.engine
            .send_byte(byte)
            .map_err(|e| e.at(TransactionStep::DataSend))
    }

    pub(crate) fn receive_step(&mut self, ack: bool) -> Result<u8, Error> {
        self.engine
            .receive_byte(ack)
            .map_err(|e| e.at(TransactionStep::DataReceive))
    }

    pub(crate) fn stop_step(&mut self) -> Result<(), Error> {
        self.engine
            .stop()
            .map_err(|e| e.at(TransactionStep::Stop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zygos_hal::status::code;
    use zygos_hal::BusStatus;
    use zygos_sim::{BusEvent, SimBus, SimClock, SimController, SimSlave};

    fn master_with(slave: SimSlave) -> TwiMaster<SimBus, SimClock> {
        let mut master = TwiMaster::new(SimBus::new(slave), SimClock::new());
        master.set_timeout(50);
        master.begin();
        master
    }

    fn scripted(responses: &[zygos_sim::SimResponse]) -> TwiMaster<SimController, SimClock> {
        let mut sim = SimController::new();
        for &response in responses {
            sim.push_response(response);
        }
        let mut master = TwiMaster::new(sim, SimClock::new());
        master.set_timeout(10);
        master
    }

    #[test]
    fn test_write_runs_one_complete_transaction() {
        let mut master = master_with(SimSlave::new(0x42));
        master.write(0x42, 0x05, &[10, 20, 30]).unwrap();

        let slave = master.controller().slave();
        assert_eq!(slave.reg(0x05), 10);
        assert_eq!(slave.reg(0x06), 20);
        assert_eq!(slave.reg(0x07), 30);
        assert_eq!(
            master.controller().log(),
            &[
                BusEvent::Start,
                BusEvent::AddressWrite(0x42),
                BusEvent::ByteWritten(0x05),
                BusEvent::ByteWritten(10),
                BusEvent::ByteWritten(20),
                BusEvent::ByteWritten(30),
                BusEvent::Stop,
            ]
        );
    }

    #[test]
    fn test_selector_only_write_positions_pointer() {
        let mut master = master_with(SimSlave::new(0x42));
        master.write(0x42, 0x07, &[]).unwrap();

        assert_eq!(master.controller().slave().pointer(), 0x07);
        assert_eq!(
            master.controller().log(),
            &[
                BusEvent::Start,
                BusEvent::AddressWrite(0x42),
                BusEvent::ByteWritten(0x07),
                BusEvent::Stop,
            ]
        );
    }

    #[test]
    fn test_wide_writes_are_big_endian() {
        let mut master = master_with(SimSlave::new(0x42));
        master.write_u16(0x42, 0x10, 0x1234).unwrap();
        master.write_u32(0x42, 0x20, 0xDEADBEEF).unwrap();

        let slave = master.controller().slave();
        assert_eq!(slave.reg(0x10), 0x12);
        assert_eq!(slave.reg(0x11), 0x34);
        assert_eq!(slave.reg(0x20), 0xDE);
        assert_eq!(slave.reg(0x21), 0xAD);
        assert_eq!(slave.reg(0x22), 0xBE);
        assert_eq!(slave.reg(0x23), 0xEF);
    }

    #[test]
    fn test_write_u64_spans_eight_registers() {
        let mut master = master_with(SimSlave::new(0x42));
        master.write_u64(0x42, 0x30, 0x0102030405060708).unwrap();

        let slave = master.controller().slave();
        for offset in 0..8u8 {
            assert_eq!(slave.reg(0x30 + offset), offset + 1);
        }
    }

    #[test]
    fn test_write16_transmits_selector_high_byte_first() {
        let mut master = master_with(SimSlave::wide(0x50));
        master.write16(0x50, 0x0123, &[0xAA]).unwrap();

        assert_eq!(master.controller().slave().reg(0x23), 0xAA);
        assert_eq!(
            master.controller().log(),
            &[
                BusEvent::Start,
                BusEvent::AddressWrite(0x50),
                BusEvent::ByteWritten(0x01),
                BusEvent::ByteWritten(0x23),
                BusEvent::ByteWritten(0xAA),
                BusEvent::Stop,
            ]
        );
    }

    #[test]
    fn test_read_reg_buffers_and_nacks_final_byte() {
        let mut slave = SimSlave::new(0x42);
        slave.load(0x10, &[1, 2, 3]);
        let mut master = master_with(slave);

        master.read_reg(0x42, 0x10, 3).unwrap();

        assert_eq!(master.available(), 3);
        assert_eq!(master.receive(), Some(1));
        assert_eq!(master.receive(), Some(2));
        assert_eq!(master.receive(), Some(3));
        assert_eq!(master.receive(), None);
        assert_eq!(
            master.controller().log(),
            &[
                BusEvent::Start,
                BusEvent::AddressWrite(0x42),
                BusEvent::ByteWritten(0x10),
                BusEvent::RepeatedStart,
                BusEvent::AddressRead(0x42),
                BusEvent::ByteRead { acked: true },
                BusEvent::ByteRead { acked: true },
                BusEvent::ByteRead { acked: false },
                BusEvent::Stop,
            ]
        );
    }

    #[test]
    fn test_register_write_read_round_trip() {
        let mut master = master_with(SimSlave::new(0x42));

        master.write(0x42, 0x05, &[0x10, 0x20, 0x30]).unwrap();
        master.read_reg(0x42, 0x05, 3).unwrap();

        assert_eq!(master.receive(), Some(0x10));
        assert_eq!(master.receive(), Some(0x20));
        assert_eq!(master.receive(), Some(0x30));
        assert_eq!(master.receive(), None);
    }

    #[test]
    fn test_plain_read_continues_from_current_pointer() {
        let mut slave = SimSlave::new(0x42);
        slave.load(0x10, &[1, 2, 3, 4, 5]);
        let mut master = master_with(slave);

        master.read_reg(0x42, 0x10, 2).unwrap();
        master.read(0x42, 2).unwrap();

        assert_eq!(master.receive(), Some(3));
        assert_eq!(master.receive(), Some(4));
    }

    #[test]
    fn test_zero_count_read_transfers_one_byte() {
        let mut slave = SimSlave::new(0x42);
        slave.load(0x00, &[0x77]);
        let mut master = master_with(slave);

        master.read(0x42, 0).unwrap();

        assert_eq!(master.available(), 1);
        assert_eq!(master.receive(), Some(0x77));
        let reads: Vec<BusEvent, 64> = master
            .controller()
            .log()
            .iter()
            .copied()
            .filter(|e| matches!(e, BusEvent::ByteRead { .. }))
            .collect();
        assert_eq!(reads.as_slice(), &[BusEvent::ByteRead { acked: false }]);
    }

    #[test]
    fn test_oversized_read_clamps_to_buffer_capacity() {
        let mut master = master_with(SimSlave::new(0x42));
        master.read(0x42, 200).unwrap();

        assert_eq!(master.available(), RECEIVE_BUFFER_SIZE as u8);
        let reads = master
            .controller()
            .log()
            .iter()
            .filter(|e| matches!(e, BusEvent::ByteRead { .. }))
            .count();
        assert_eq!(reads, RECEIVE_BUFFER_SIZE);
    }

    #[test]
    fn test_read_reg_into_fills_caller_buffer_only() {
        let mut slave = SimSlave::new(0x42);
        slave.load(0x10, &[9, 8, 7]);
        let mut master = master_with(slave);

        let mut buf = [0u8; 3];
        master.read_reg_into(0x42, 0x10, &mut buf).unwrap();

        assert_eq!(buf, [9, 8, 7]);
        assert_eq!(master.available(), 0);
    }

    #[test]
    fn test_read_into_empty_slice_still_transfers() {
        let mut master = master_with(SimSlave::new(0x42));
        master.read_into(0x42, &mut []).unwrap();

        let reads = master
            .controller()
            .log()
            .iter()
            .filter(|e| matches!(e, BusEvent::ByteRead { .. }))
            .count();
        assert_eq!(reads, 1);
    }

    #[test]
    fn test_read16_positions_through_wide_selector() {
        let mut slave = SimSlave::wide(0x50);
        slave.load(0x23, &[0xCA, 0xFE]);
        let mut master = master_with(slave);

        let mut buf = [0u8; 2];
        master.read16_into(0x50, 0x0123, &mut buf).unwrap();
        assert_eq!(buf, [0xCA, 0xFE]);
    }

    #[test]
    fn test_address_nack_reports_raw_status_and_stops() {
        // Probe an address nobody answers.
        let mut master = master_with(SimSlave::new(0x42));
        let error = master.write(0x13, 0x00, &[1]).unwrap_err();

        assert_eq!(error, Error::Nack(BusStatus::SlaWriteNack));
        assert_eq!(error.code(), 0x20);
        // The engine freed the bus with a stop after the refusal.
        assert_eq!(master.controller().log().last(), Some(&BusEvent::Stop));
    }

    #[test]
    fn test_data_nack_reports_raw_status() {
        let mut slave = SimSlave::new(0x42);
        slave.nack_write_at(1);
        let mut master = master_with(slave);

        let error = master.write(0x42, 0x00, &[0xAA]).unwrap_err();
        assert_eq!(error, Error::Nack(BusStatus::DataSentNack));
        assert_eq!(error.code(), 0x30);
    }

    #[test]
    fn test_failed_read_keeps_partial_data() {
        use zygos_sim::SimResponse::{Data, Status};
        let mut master = scripted(&[
            Status(code::START),
            Status(code::SLA_READ_ACK),
            Data(code::DATA_RECEIVED_ACK, 0x11),
            Status(code::ARBITRATION_LOST),
        ]);

        let error = master.read(0x42, 3).unwrap_err();
        assert_eq!(error, Error::Fault(BusStatus::ArbitrationLost));
        assert_eq!(master.available(), 1);
        assert_eq!(master.receive(), Some(0x11));
    }

    #[test]
    fn test_timeout_step_codes() {
        use zygos_sim::SimResponse::{Hang, Status};

        // Step 1: initial start hangs.
        let mut master = scripted(&[Hang]);
        assert_eq!(master.write(0x42, 0, &[]).unwrap_err().code(), 1);

        // Step 2: SLA+W hangs.
        let mut master = scripted(&[Status(code::START), Hang]);
        assert_eq!(master.write(0x42, 0, &[]).unwrap_err().code(), 2);

        // Step 3: payload byte hangs.
        let mut master = scripted(&[
            Status(code::START),
            Status(code::SLA_WRITE_ACK),
            Hang,
        ]);
        assert_eq!(master.write(0x42, 0, &[]).unwrap_err().code(), 3);

        // Step 3 again: a selector byte is a data send, wide or not.
        let mut master = scripted(&[
            Status(code::START),
            Status(code::SLA_WRITE_ACK),
            Status(code::DATA_SENT_ACK),
            Hang,
        ]);
        assert_eq!(master.read16(0x50, 0x0123, 1).unwrap_err().code(), 3);

        // Step 4: repeated start hangs.
        let mut master = scripted(&[
            Status(code::START),
            Status(code::SLA_WRITE_ACK),
            Status(code::DATA_SENT_ACK),
            Hang,
        ]);
        assert_eq!(master.read_reg(0x42, 0x10, 1).unwrap_err().code(), 4);

        // Step 5: SLA+R hangs.
        let mut master = scripted(&[
            Status(code::START),
            Status(code::SLA_WRITE_ACK),
            Status(code::DATA_SENT_ACK),
            Status(code::REPEATED_START),
            Hang,
        ]);
        assert_eq!(master.read_reg(0x42, 0x10, 1).unwrap_err().code(), 5);

        // Step 6: receive hangs.
        let mut master = scripted(&[Status(code::START), Status(code::SLA_READ_ACK), Hang]);
        assert_eq!(master.read(0x42, 1).unwrap_err().code(), 6);
    }

    #[test]
    fn test_stop_timeout_is_step_seven() {
        // Stall the stop after a clean write body.
        let mut sim = SimController::new();
        sim.push_status(code::START);
        sim.push_status(code::SLA_WRITE_ACK);
        sim.push_status(code::DATA_SENT_ACK);
        sim.stall_stops();
        let mut master = TwiMaster::new(sim, SimClock::new());
        master.set_timeout(10);

        let error = master.write(0x42, 0x00, &[]).unwrap_err();
        assert_eq!(error, Error::Timeout(TransactionStep::Stop));
        assert_eq!(error.code(), 7);
    }

    #[test]
    fn test_timeout_runs_exactly_one_recovery() {
        use zygos_sim::SimResponse::{Hang, Status};
        let mut master = scripted(&[Status(code::START), Status(code::SLA_READ_ACK), Hang]);

        let error = master.read(0x42, 2).unwrap_err();
        assert_eq!(error, Error::Timeout(TransactionStep::DataReceive));
        assert_eq!(master.controller().releases(), 1);
        // A timed-out transaction is abandoned, not stopped.
        assert_eq!(master.controller().stops(), 0);
    }

    #[test]
    fn test_scan_finds_the_attached_device() {
        let mut master = master_with(SimSlave::new(0x42));
        let found = master.scan().unwrap();
        assert_eq!(found.as_slice(), &[0x42]);
        // The caller's timeout setting survives the sweep.
        assert_eq!(master.timeout(), 50);
    }

    #[test]
    fn test_scan_aborts_and_restores_timeout_on_bus_hang() {
        use zygos_sim::SimResponse::Hang;
        let mut master = scripted(&[Hang]);
        master.set_timeout(55);

        let error = master.scan().unwrap_err();
        assert_eq!(error, Error::Timeout(TransactionStep::Start));
        assert_eq!(master.timeout(), 55);
    }

    #[test]
    fn test_end_releases_the_controller() {
        let mut master = master_with(SimSlave::new(0x42));
        master.end();
        assert_eq!(master.controller().releases(), 1);
    }
}
