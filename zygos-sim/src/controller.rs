//! Scripted controller double
//!
//! [`SimController`] implements [`TwiController`] over a queue of scripted
//! outcomes. Each armed bus action consumes the next [`SimResponse`];
//! stop requests and lockup releases are handled structurally and never
//! consume from the script, so a test scripts exactly the status codes the
//! hardware would produce.

use heapless::Vec;

use zygos_hal::controller::{ctrl, TwiController};

/// Outcome of one armed bus action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimResponse {
    /// Complete with this status register value.
    Status(u8),
    /// Complete with this status value and latch a byte into the data
    /// register, as a receive would.
    Data(u8, u8),
    /// Never complete; the completion flag stays clear until the caller
    /// gives up.
    Hang,
}

/// A [`TwiController`] that replays scripted outcomes.
#[derive(Debug, Default)]
pub struct SimController {
    script: Vec<SimResponse, 32>,
    cursor: usize,
    latency: u8,
    countdown: u8,
    pending: Option<(u8, Option<u8>)>,
    stop_hangs: bool,
    control: u8,
    status_reg: u8,
    data_reg: u8,
    written: Vec<u8, 32>,
    stops: u32,
    releases: u32,
}

impl SimController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome for the next armed action.
    pub fn push_response(&mut self, response: SimResponse) {
        if self.script.push(response).is_err() {
            panic!("sim script overflow");
        }
    }

    /// Queue a plain status outcome.
    pub fn push_status(&mut self, status: u8) {
        self.push_response(SimResponse::Status(status));
    }

    /// Queue a receive outcome: status plus the byte the data register
    /// will hold.
    pub fn push_data(&mut self, status: u8, byte: u8) {
        self.push_response(SimResponse::Data(status, byte));
    }

    /// Queue an action that never completes.
    pub fn push_hang(&mut self) {
        self.push_response(SimResponse::Hang);
    }

    /// Require `polls` reads of the control register before a queued
    /// outcome becomes visible. Default is zero (immediate).
    pub fn set_latency(&mut self, polls: u8) {
        self.latency = polls;
    }

    /// Make stop conditions hang: the stop bit never clears.
    pub fn stall_stops(&mut self) {
        self.stop_hangs = true;
    }

    /// Every byte written to the data register, addresses included, in
    /// write order.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Current control register contents, without the poll side effects
    /// of [`TwiController::control`].
    pub fn control_value(&self) -> u8 {
        self.control
    }

    /// Number of stop conditions requested.
    pub fn stops(&self) -> u32 {
        self.stops
    }

    /// Number of full controller releases (all-zero control writes).
    pub fn releases(&self) -> u32 {
        self.releases
    }

    /// Scripted outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len() - self.cursor
    }
}

impl TwiController for SimController {
    fn write_control(&mut self, bits: u8) {
        if bits == 0 {
            // Lockup release: peripheral off, lines freed, state dropped.
            self.releases += 1;
            self.control = 0;
            self.pending = None;
            return;
        }
        if bits & ctrl::FLAG == 0 {
            // Enable or re-enable without arming anything.
            self.control = bits;
            return;
        }
        if bits & ctrl::STOP != 0 {
            self.stops += 1;
            self.control = if self.stop_hangs {
                bits & !ctrl::FLAG
            } else {
                bits & !(ctrl::FLAG | ctrl::STOP)
            };
            return;
        }
        // Start, transmit or receive: consume the next scripted outcome.
        self.control = bits & !ctrl::FLAG;
        match self.script.get(self.cursor).copied() {
            Some(SimResponse::Status(status)) => {
                self.cursor += 1;
                self.pending = Some((status, None));
                self.countdown = self.latency;
            }
            Some(SimResponse::Data(status, byte)) => {
                self.cursor += 1;
                self.pending = Some((status, Some(byte)));
                self.countdown = self.latency;
            }
            Some(SimResponse::Hang) => {
                self.cursor += 1;
            }
            // Script exhausted: the action hangs and the flag never sets.
            None => {}
        }
    }

    fn control(&mut self) -> u8 {
        if let Some((status, byte)) = self.pending {
            if self.countdown == 0 {
                self.status_reg = status;
                if let Some(b) = byte {
                    self.data_reg = b;
                }
                self.control |= ctrl::FLAG;
                self.pending = None;
            } else {
                self.countdown -= 1;
            }
        }
        self.control
    }

    fn status(&mut self) -> u8 {
        self.status_reg
    }

    fn write_data(&mut self, byte: u8) {
        self.data_reg = byte;
        if self.written.push(byte).is_err() {
            panic!("sim write log overflow");
        }
    }

    fn read_data(&mut self) -> u8 {
        self.data_reg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zygos_hal::status::code;

    fn arm(sim: &mut SimController, bits: u8) {
        sim.write_control(ctrl::FLAG | ctrl::ENABLE | bits);
    }

    #[test]
    fn test_script_consumed_in_order() {
        let mut sim = SimController::new();
        sim.push_status(code::START);
        sim.push_status(code::SLA_WRITE_ACK);

        arm(&mut sim, ctrl::START);
        assert_ne!(sim.control() & ctrl::FLAG, 0);
        assert_eq!(sim.status(), code::START);

        arm(&mut sim, 0);
        assert_ne!(sim.control() & ctrl::FLAG, 0);
        assert_eq!(sim.status(), code::SLA_WRITE_ACK);
        assert_eq!(sim.remaining(), 0);
    }

    #[test]
    fn test_latency_delays_completion() {
        let mut sim = SimController::new();
        sim.set_latency(2);
        sim.push_status(code::START);

        arm(&mut sim, ctrl::START);
        assert_eq!(sim.control() & ctrl::FLAG, 0);
        assert_eq!(sim.control() & ctrl::FLAG, 0);
        assert_ne!(sim.control() & ctrl::FLAG, 0);
    }

    #[test]
    fn test_hang_never_completes() {
        let mut sim = SimController::new();
        sim.push_hang();
        arm(&mut sim, ctrl::START);
        for _ in 0..100 {
            assert_eq!(sim.control() & ctrl::FLAG, 0);
        }
    }

    #[test]
    fn test_stop_does_not_consume_script() {
        let mut sim = SimController::new();
        sim.push_status(code::START);

        sim.write_control(ctrl::FLAG | ctrl::ENABLE | ctrl::STOP);
        assert_eq!(sim.stops(), 1);
        assert_eq!(sim.control() & ctrl::STOP, 0);
        assert_eq!(sim.remaining(), 1);
    }

    #[test]
    fn test_stalled_stop_keeps_stop_bit() {
        let mut sim = SimController::new();
        sim.stall_stops();
        sim.write_control(ctrl::FLAG | ctrl::ENABLE | ctrl::STOP);
        assert_ne!(sim.control() & ctrl::STOP, 0);
    }

    #[test]
    fn test_release_counts_and_clears_pending() {
        let mut sim = SimController::new();
        sim.push_hang();
        arm(&mut sim, 0);
        sim.write_control(0);
        sim.write_control(ctrl::ENABLE | ctrl::ACK);
        assert_eq!(sim.releases(), 1);
        assert_eq!(sim.control(), ctrl::ENABLE | ctrl::ACK);
    }

    #[test]
    fn test_data_response_latches_byte() {
        let mut sim = SimController::new();
        sim.push_data(code::DATA_RECEIVED_ACK, 0xAB);
        arm(&mut sim, ctrl::ACK);
        assert_ne!(sim.control() & ctrl::FLAG, 0);
        assert_eq!(sim.read_data(), 0xAB);
    }

    #[test]
    fn test_written_log_records_data_writes() {
        let mut sim = SimController::new();
        sim.write_data(0xA0);
        sim.write_data(0x11);
        assert_eq!(sim.written(), &[0xA0, 0x11]);
    }
}
