//! Fixed receive buffer
//!
//! Buffered reads land here: a small fixed store refilled per read
//! transaction and drained one byte at a time. Draining tracks a cursor
//! instead of shifting bytes, so a half-drained buffer keeps its
//! remaining bytes in arrival order.

use heapless::Vec;

/// Capacity of the receive buffer in bytes.
pub const RECEIVE_BUFFER_SIZE: usize = 32;

/// Backing store for buffered reads.
///
/// Each buffered read resets the buffer before filling it, so at most one
/// transaction's worth of data is ever held. A read that fails midway
/// leaves the bytes received so far available.
#[derive(Debug, Default)]
pub struct ReceiveBuffer {
    data: Vec<u8, RECEIVE_BUFFER_SIZE>,
    drained: u8,
}

impl ReceiveBuffer {
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            drained: 0,
        }
    }

    /// Discard all contents and rewind the drain cursor.
    pub fn reset(&mut self) {
        self.data.clear();
        self.drained = 0;
    }

    /// Append one received byte. A full buffer drops the byte; fill paths
    /// clamp their counts to the capacity beforehand.
    pub(crate) fn push(&mut self, byte: u8) {
        let _ = self.data.push(byte);
    }

    /// Bytes received but not yet drained.
    pub fn available(&self) -> u8 {
        self.data.len() as u8 - self.drained
    }

    /// The oldest undrained byte, if any.
    pub fn take(&mut self) -> Option<u8> {
        let index = usize::from(self.drained);
        if index >= self.data.len() {
            return None;
        }
        self.drained += 1;
        Some(self.data[index])
    }
}
