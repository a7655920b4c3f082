//! Driver errors
//!
//! Two views of the same faults are kept:
//! - [`Error`] is returned by the call that hit the fault.
//! - [`ErrorCode`] is the sticky bitmask stored in the handle, readable with
//!   [`SubGhz::error`](crate::SubGhz::error) until the next transaction
//!   overwrites it.
//!
//! Usage-contract failures ([`Error::Busy`]) and decoding failures of typed
//! responses are reported only through [`Error`]; they never touch the
//! stored [`ErrorCode`].

use core::fmt;

use bitflags::bitflags;
use embedded_hal::spi::ErrorKind;

/// Error returned by driver operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The handle is not `Ready` or its lock is held.
    ///
    /// Nothing was sent on the bus; the caller owns the retry policy.
    Busy,
    /// A transmit-empty / receive-ready wait or the reset confirmation
    /// wait ran out of budget.
    Timeout,
    /// The radio busy signal never dropped within the busy budget.
    RfBusyTimeout,
    /// The SPI peripheral reported a hard error.
    Spi(ErrorKind),
    /// A typed response could not be decoded.
    InvalidResponse,
    /// A typed command carried an opcode the radio does not implement.
    UnknownOpcode(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("radio handle busy"),
            Self::Timeout => f.write_str("bus wait timed out"),
            Self::RfBusyTimeout => f.write_str("radio busy signal timed out"),
            Self::Spi(kind) => write!(f, "spi error: {kind}"),
            Self::InvalidResponse => f.write_str("invalid response from radio"),
            Self::UnknownOpcode(op) => write!(f, "unknown opcode {op:#04x}"),
        }
    }
}

bitflags! {
    /// Sticky record of the bus faults seen by the last operation
    ///
    /// Empty means no error.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ErrorCode: u8 {
        /// A bounded bus or reset wait expired
        const TIMEOUT = 1 << 0;
        /// The radio busy gate never cleared
        const RF_BUSY = 1 << 1;
        /// The SPI peripheral reported a hard error
        const SPI = 1 << 2;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ErrorCode {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ErrorCode({=u8:#04x})", self.bits())
    }
}

impl ErrorCode {
    /// Flag recorded for a returned error, empty for errors that are not
    /// bus faults.
    pub fn from_error(error: Error) -> Self {
        match error {
            Error::Timeout => Self::TIMEOUT,
            Error::RfBusyTimeout => Self::RF_BUSY,
            Error::Spi(_) => Self::SPI,
            Error::Busy | Error::InvalidResponse | Error::UnknownOpcode(_) => Self::empty(),
        }
    }
}
