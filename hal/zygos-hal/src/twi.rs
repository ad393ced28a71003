//! Two-wire bus configuration

/// Two-wire bus configuration.
#[derive(Debug, Clone, Copy)]
pub struct TwiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Drive the internal pull-ups on SDA/SCL
    pub pullups: bool,
}

impl Default for TwiConfig {
    fn default() -> Self {
        Self {
            frequency: 100_000, // 100kHz standard mode
            pullups: true,
        }
    }
}

impl TwiConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        frequency: 100_000,
        pullups: true,
    };

    /// Fast mode (400 kHz), the ceiling for AVR-class controllers
    pub const FAST: Self = Self {
        frequency: 400_000,
        pullups: true,
    };
}
