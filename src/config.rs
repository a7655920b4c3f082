//! Driver configuration
//!
//! A [`Config`] is fixed when the handle is built and never changes
//! afterwards.

use crate::timeout::Timing;

/// Core clock assumed by [`Config::default`] (MSI range 11, 48 MHz)
pub const DEFAULT_CORE_CLOCK_HZ: u32 = 48_000_000;

/// SPI clock divisor applied to the bus clock
///
/// The discriminant is the value of the BR field of the SPI control
/// register, already shifted into place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BaudPrescaler {
    /// fPCLK / 2
    Div2 = 0 << 3,
    /// fPCLK / 4
    Div4 = 1 << 3,
    /// fPCLK / 8
    #[default]
    Div8 = 2 << 3,
    /// fPCLK / 16
    Div16 = 3 << 3,
    /// fPCLK / 32
    Div32 = 4 << 3,
    /// fPCLK / 64
    Div64 = 5 << 3,
    /// fPCLK / 128
    Div128 = 6 << 3,
    /// fPCLK / 256
    Div256 = 7 << 3,
}

impl BaudPrescaler {
    /// Raw BR field bits
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Divisor applied to the bus clock
    pub const fn divisor(self) -> u32 {
        2 << (self.bits() >> 3)
    }
}

/// Whether [`SubGhz::init`](crate::SubGhz::init) must take the radio out of
/// reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetMode {
    /// Radio is held in reset; initialization releases it and waits for
    /// confirmation.
    Full,
    /// Radio is already running (for example when the host wakes from
    /// standby while the radio kept its state); reset is left alone.
    RfReady,
}

/// Static driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// SPI clock divisor programmed at init
    pub baud_prescaler: BaudPrescaler,
    /// Poll budgets for every bounded wait
    pub timing: Timing,
}

impl Config {
    /// Configuration with budgets derived from the core clock in Hz.
    pub const fn new(core_clock_hz: u32) -> Self {
        Self {
            baud_prescaler: BaudPrescaler::Div8,
            timing: Timing::from_core_clock(core_clock_hz),
        }
    }

    /// Replaces the SPI clock divisor.
    pub const fn with_baud_prescaler(mut self, baud_prescaler: BaudPrescaler) -> Self {
        self.baud_prescaler = baud_prescaler;
        self
    }

    /// Replaces the poll budgets.
    pub const fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_CORE_CLOCK_HZ)
    }
}
