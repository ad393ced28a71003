//! Bus-with-slave double
//!
//! [`SimBus`] implements [`TwiController`] over a little bus model with a
//! single [`SimSlave`] attached. Status codes fall out of the model rather
//! than a script, and every wire-level event is recorded, so tests can
//! assert both what a transaction produced and the exact order it was
//! produced in.

use heapless::Vec;

use zygos_hal::controller::{ctrl, TwiController};
use zygos_hal::status::code;

/// One observed wire-level event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    Start,
    RepeatedStart,
    /// SLA+W for this 7-bit address.
    AddressWrite(u8),
    /// SLA+R for this 7-bit address.
    AddressRead(u8),
    ByteWritten(u8),
    ByteRead { acked: bool },
    Stop,
}

/// Register-file slave device.
///
/// Models the common selector-addressed part: the first one or two bytes
/// written after SLA+W load the register pointer (most significant byte
/// first), later writes store through the pointer and reads stream from
/// it. The pointer survives stop conditions, so a plain read continues
/// where the previous access ended.
#[derive(Debug)]
pub struct SimSlave {
    address: u8,
    selector_width: u8,
    regs: [u8; 256],
    pointer: u16,
    pending_selector: u16,
    selector_remaining: u8,
    written_count: u8,
    nack_at: Option<u8>,
}

impl SimSlave {
    /// Slave with a one-byte register selector.
    pub fn new(address: u8) -> Self {
        Self::with_width(address, 1)
    }

    /// Slave with a two-byte register selector, EEPROM style.
    pub fn wide(address: u8) -> Self {
        Self::with_width(address, 2)
    }

    fn with_width(address: u8, selector_width: u8) -> Self {
        Self {
            address,
            selector_width,
            regs: [0; 256],
            pointer: 0,
            pending_selector: 0,
            selector_remaining: 0,
            written_count: 0,
            nack_at: None,
        }
    }

    /// Preload registers starting at `at`.
    pub fn load(&mut self, at: u8, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.regs[(usize::from(at) + i) % 256] = b;
        }
    }

    /// Read back one register.
    pub fn reg(&self, at: u8) -> u8 {
        self.regs[usize::from(at)]
    }

    /// Current register pointer.
    pub fn pointer(&self) -> u16 {
        self.pointer
    }

    /// NACK the `index`-th byte written after SLA+W (zero-based, selector
    /// bytes included). The byte is still stored first; real parts latch
    /// before they decline.
    pub fn nack_write_at(&mut self, index: u8) {
        self.nack_at = Some(index);
    }

    fn begin_write(&mut self) {
        self.selector_remaining = self.selector_width;
        self.pending_selector = 0;
        self.written_count = 0;
    }

    fn accept(&mut self, byte: u8) -> u8 {
        if self.selector_remaining > 0 {
            self.pending_selector = (self.pending_selector << 8) | u16::from(byte);
            self.selector_remaining -= 1;
            if self.selector_remaining == 0 {
                self.pointer = self.pending_selector;
            }
        } else {
            self.regs[usize::from(self.pointer as u8)] = byte;
            self.pointer = self.pointer.wrapping_add(1);
        }
        let index = self.written_count;
        self.written_count = self.written_count.saturating_add(1);
        if self.nack_at == Some(index) {
            code::DATA_SENT_NACK
        } else {
            code::DATA_SENT_ACK
        }
    }

    fn emit(&mut self) -> u8 {
        let byte = self.regs[usize::from(self.pointer as u8)];
        self.pointer = self.pointer.wrapping_add(1);
        byte
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Started,
    Writing,
    Reading,
}

/// A [`TwiController`] modeling a bus with one [`SimSlave`] attached.
#[derive(Debug)]
pub struct SimBus {
    slave: SimSlave,
    phase: Phase,
    control: u8,
    status_reg: u8,
    data_reg: u8,
    log: Vec<BusEvent, 256>,
    releases: u32,
}

impl SimBus {
    pub fn new(slave: SimSlave) -> Self {
        Self {
            slave,
            phase: Phase::Idle,
            control: 0,
            status_reg: code::IDLE,
            data_reg: 0,
            log: Vec::new(),
            releases: 0,
        }
    }

    /// Everything that happened on the wire, in order.
    pub fn log(&self) -> &[BusEvent] {
        &self.log
    }

    /// Number of full controller releases (all-zero control writes).
    pub fn releases(&self) -> u32 {
        self.releases
    }

    pub fn slave(&self) -> &SimSlave {
        &self.slave
    }

    pub fn slave_mut(&mut self) -> &mut SimSlave {
        &mut self.slave
    }

    fn record(&mut self, event: BusEvent) {
        // Best effort: exchanges longer than the log simply stop logging.
        let _ = self.log.push(event);
    }

    fn complete(&mut self, bits: u8, status: u8) {
        self.status_reg = status;
        self.control = bits;
    }
}

impl TwiController for SimBus {
    fn write_control(&mut self, bits: u8) {
        if bits == 0 {
            self.releases += 1;
            self.control = 0;
            self.phase = Phase::Idle;
            return;
        }
        if bits & ctrl::FLAG == 0 {
            self.control = bits;
            return;
        }
        if bits & ctrl::STOP != 0 {
            self.record(BusEvent::Stop);
            self.phase = Phase::Idle;
            self.status_reg = code::IDLE;
            self.control = bits & !(ctrl::FLAG | ctrl::STOP);
            return;
        }
        if bits & ctrl::START != 0 {
            let (event, status) = if self.phase == Phase::Idle {
                (BusEvent::Start, code::START)
            } else {
                (BusEvent::RepeatedStart, code::REPEATED_START)
            };
            self.record(event);
            self.phase = Phase::Started;
            self.complete(bits, status);
            return;
        }
        match self.phase {
            Phase::Started => {
                let sla = self.data_reg;
                let address = sla >> 1;
                if sla & 1 == 0 {
                    self.record(BusEvent::AddressWrite(address));
                    if address == self.slave.address {
                        self.slave.begin_write();
                        self.phase = Phase::Writing;
                        self.complete(bits, code::SLA_WRITE_ACK);
                    } else {
                        self.complete(bits, code::SLA_WRITE_NACK);
                    }
                } else {
                    self.record(BusEvent::AddressRead(address));
                    if address == self.slave.address {
                        self.phase = Phase::Reading;
                        self.complete(bits, code::SLA_READ_ACK);
                    } else {
                        self.complete(bits, code::SLA_READ_NACK);
                    }
                }
            }
            Phase::Writing => {
                let byte = self.data_reg;
                self.record(BusEvent::ByteWritten(byte));
                let status = self.slave.accept(byte);
                self.complete(bits, status);
            }
            Phase::Reading => {
                let acked = bits & ctrl::ACK != 0;
                self.data_reg = self.slave.emit();
                self.record(BusEvent::ByteRead { acked });
                let status = if acked {
                    code::DATA_RECEIVED_ACK
                } else {
                    code::DATA_RECEIVED_NACK
                };
                self.complete(bits, status);
            }
            Phase::Idle => {
                // Armed with no start on the wire; nothing useful happens.
                self.complete(bits, code::IDLE);
            }
        }
    }

    fn control(&mut self) -> u8 {
        self.control
    }

    fn status(&mut self) -> u8 {
        self.status_reg
    }

    fn write_data(&mut self, byte: u8) {
        self.data_reg = byte;
    }

    fn read_data(&mut self) -> u8 {
        self.data_reg
    }
}
