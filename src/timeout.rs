//! Bounded spin waits
//!
//! Every hardware wait in the driver is a countdown over a polled condition.
//! The condition is expressed as an [`nb::Result`]: `WouldBlock` means "not
//! yet", `Ok` ends the wait, and any other error aborts it immediately.
//!
//! Budgets are counted in polls, not in time. [`Timing::from_core_clock`]
//! derives them from the CPU frequency so that one budget spans roughly the
//! same wall-clock time on any clock configuration.

use embedded_hal_nb::nb;

/// Default wait length in milliseconds for bus and reset waits
pub const DEFAULT_TIMEOUT_MS: u32 = 100;

/// Why a [`spin`] wait ended without success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinError<E> {
    /// The budget ran out before the condition was met
    Expired,
    /// The condition reported a hard error
    Other(E),
}

/// Polls `poll` until it stops returning `WouldBlock`.
///
/// `poll` is invoked at most `budget` times. A budget of zero fails without
/// polling at all.
pub fn spin<T, E, F>(budget: u32, mut poll: F) -> Result<T, SpinError<E>>
where
    F: FnMut() -> nb::Result<T, E>,
{
    let mut remaining = budget;
    while remaining > 0 {
        match poll() {
            Ok(value) => return Ok(value),
            Err(nb::Error::WouldBlock) => remaining -= 1,
            Err(nb::Error::Other(e)) => return Err(SpinError::Other(e)),
        }
        core::hint::spin_loop();
    }
    Err(SpinError::Expired)
}

/// Polls a plain condition until it becomes true.
pub fn spin_until<F>(budget: u32, mut ready: F) -> Result<(), SpinError<core::convert::Infallible>>
where
    F: FnMut() -> bool,
{
    spin(budget, || if ready() { Ok(()) } else { Err(nb::Error::WouldBlock) })
}

/// Busy-waits for a fixed number of iterations.
pub fn settle(iterations: u32) {
    for _ in 0..iterations {
        core::hint::spin_loop();
    }
}

/// Poll budgets used by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Budget for each transmit-empty / receive-ready wait and for the
    /// radio reset confirmation
    pub spi: u32,
    /// Budget for the radio busy gate
    pub busy: u32,
    /// Length of the select pulse that wakes the radio from sleep
    pub wake: u32,
}

impl Timing {
    /// Derives budgets from the core clock frequency in Hz.
    ///
    /// The scale factors match the cost of one polling iteration on a
    /// Cortex-M class core, giving [`DEFAULT_TIMEOUT_MS`] for the `spi` and
    /// `busy` waits and a wake pulse of a few microseconds.
    pub const fn from_core_clock(hz: u32) -> Self {
        let hz = hz as u64;
        Self {
            spi: saturate(DEFAULT_TIMEOUT_MS as u64 * ((hz * 28) >> 19)),
            busy: saturate(DEFAULT_TIMEOUT_MS as u64 * ((hz * 24) >> 20)),
            wake: saturate((hz * 24) >> 16),
        }
    }
}

const fn saturate(value: u64) -> u32 {
    if value > u32::MAX as u64 {
        u32::MAX
    } else {
        value as u32
    }
}
