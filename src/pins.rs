//! [`Control`] over discrete GPIOs
//!
//! For a radio wired to the host with an NSS output, a BUSY input and an
//! NRESET output. The SPI peripheral itself is configured by whoever built
//! the [`FullDuplex`](embedded_hal_nb::spi::FullDuplex) handle, so
//! [`Control::enable_spi`] only records the divisor requested.
//!
//! Pin errors cannot be reported through [`Control`]. A failed write is
//! logged and otherwise ignored, and a failed read of BUSY counts as busy, so a broken busy line
//! ends in [`Error::RfBusyTimeout`](crate::Error::RfBusyTimeout) rather than
//! in a frame sent to a radio that is not listening.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::bus::Control;
use crate::config::BaudPrescaler;

/// Control lines of a discrete radio
pub struct PinControl<NSS, BUSY, RESET> {
    nss: NSS,
    busy: BUSY,
    reset: RESET,
    in_reset: bool,
    prescaler: Option<BaudPrescaler>,
}

impl<NSS, BUSY, RESET> PinControl<NSS, BUSY, RESET> {
    /// Wraps the three control pins.
    ///
    /// The radio is assumed to be in reset until
    /// [`Control::release_reset`] is called.
    pub fn new(nss: NSS, busy: BUSY, reset: RESET) -> Self {
        Self {
            nss,
            busy,
            reset,
            in_reset: true,
            prescaler: None,
        }
    }

    /// Divisor requested by the last [`Control::enable_spi`], `None` while
    /// the bus is disabled.
    pub fn prescaler(&self) -> Option<BaudPrescaler> {
        self.prescaler
    }

    /// Releases the pins.
    pub fn release(self) -> (NSS, BUSY, RESET) {
        (self.nss, self.busy, self.reset)
    }
}

impl<NSS, BUSY, RESET> Control for PinControl<NSS, BUSY, RESET>
where
    NSS: OutputPin,
    BUSY: InputPin,
    RESET: OutputPin,
{
    fn select(&mut self) {
        if self.nss.set_low().is_err() {
            warn!("subghz: NSS low failed");
        }
    }

    fn deselect(&mut self) {
        if self.nss.set_high().is_err() {
            warn!("subghz: NSS high failed");
        }
    }

    fn busy_signal(&mut self) -> bool {
        self.busy.is_high().unwrap_or_else(|_| {
            warn!("subghz: BUSY read failed");
            true
        })
    }

    fn assert_reset(&mut self) {
        if self.reset.set_low().is_err() {
            warn!("subghz: NRESET low failed");
        }
        self.in_reset = true;
    }

    fn release_reset(&mut self) {
        if self.reset.set_high().is_err() {
            warn!("subghz: NRESET high failed");
        }
        self.in_reset = false;
    }

    fn under_reset(&mut self) -> bool {
        self.in_reset
    }

    fn enable_spi(&mut self, prescaler: BaudPrescaler) {
        self.prescaler = Some(prescaler);
    }

    fn disable_spi(&mut self) {
        self.prescaler = None;
    }
}
