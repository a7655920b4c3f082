//! Radio bus backends and byte primitives
//!
//! The driver talks to the radio through two injected capabilities:
//!
//! - the data path, any [`FullDuplex`] SPI. `WouldBlock` from `write` means
//!   the transmit buffer is not empty yet, `WouldBlock` from `read` means
//!   nothing has been received yet.
//! - the control lines, a [`Control`] implementation driving the select
//!   line, the radio reset and reporting the busy signal.
//!
//! On a host with an integrated radio both map onto peripheral registers;
//! [`PinControl`](crate::pins::PinControl) covers a discrete radio wired to
//! GPIOs. Tests substitute a simulated radio for both.

use embedded_hal_nb::spi::FullDuplex;

use crate::config::BaudPrescaler;
use crate::opcode::DUMMY_BYTE;
use crate::timeout::{spin, SpinError};
use crate::Error;

/// Control signals around the radio bus
///
/// Only the select line, the busy signal, reset handling and SPI enable are
/// mandatory. The remaining hooks exist for hosts where the radio interrupt
/// and wakeup signals are routed through the power controller; they default
/// to doing nothing.
pub trait Control {
    /// Drives the select line active (low), framing a transaction.
    fn select(&mut self);

    /// Drives the select line inactive (high).
    fn deselect(&mut self);

    /// Raw radio busy signal.
    fn busy_signal(&mut self) -> bool;

    /// Whether the busy signal is currently meaningful.
    ///
    /// The radio busy signal is only valid while this returns `true`; hosts
    /// without such a qualifier keep the default.
    fn busy_mask(&mut self) -> bool {
        true
    }

    /// Puts the radio into reset.
    fn assert_reset(&mut self);

    /// Takes the radio out of reset.
    fn release_reset(&mut self);

    /// Whether the radio is still held in reset.
    fn under_reset(&mut self) -> bool;

    /// Configures and enables the SPI peripheral.
    fn enable_spi(&mut self, prescaler: BaudPrescaler);

    /// Disables the SPI peripheral.
    fn disable_spi(&mut self);

    /// Unmasks the radio interrupt line towards the host.
    fn enable_irq_line(&mut self) {}

    /// Masks the radio interrupt line.
    fn disable_irq_line(&mut self) {}

    /// Routes the busy signal to the host wakeup logic.
    fn set_busy_wakeup(&mut self, _enabled: bool) {}

    /// Clears a latched busy event.
    fn clear_busy_flag(&mut self) {}
}

impl<T: Control + ?Sized> Control for &mut T {
    fn select(&mut self) {
        T::select(self)
    }

    fn deselect(&mut self) {
        T::deselect(self)
    }

    fn busy_signal(&mut self) -> bool {
        T::busy_signal(self)
    }

    fn busy_mask(&mut self) -> bool {
        T::busy_mask(self)
    }

    fn assert_reset(&mut self) {
        T::assert_reset(self)
    }

    fn release_reset(&mut self) {
        T::release_reset(self)
    }

    fn under_reset(&mut self) -> bool {
        T::under_reset(self)
    }

    fn enable_spi(&mut self, prescaler: BaudPrescaler) {
        T::enable_spi(self, prescaler)
    }

    fn disable_spi(&mut self) {
        T::disable_spi(self)
    }

    fn enable_irq_line(&mut self) {
        T::enable_irq_line(self)
    }

    fn disable_irq_line(&mut self) {
        T::disable_irq_line(self)
    }

    fn set_busy_wakeup(&mut self, enabled: bool) {
        T::set_busy_wakeup(self, enabled)
    }

    fn clear_busy_flag(&mut self) {
        T::clear_busy_flag(self)
    }
}

fn bus_error<E: embedded_hal::spi::Error>(err: SpinError<E>) -> Error {
    match err {
        SpinError::Expired => Error::Timeout,
        SpinError::Other(e) => Error::Spi(e.kind()),
    }
}

/// Clocks one byte out and returns the byte clocked in.
fn exchange<SPI>(spi: &mut SPI, budget: u32, byte: u8) -> Result<u8, Error>
where
    SPI: FullDuplex<u8>,
{
    spin(budget, || spi.write(byte)).map_err(bus_error)?;
    spin(budget, || spi.read()).map_err(bus_error)
}

/// Sends one byte and drains the byte received in exchange.
///
/// The bus is full duplex; leaving the received byte in place would hand
/// it to the next read.
pub fn transmit<SPI>(spi: &mut SPI, budget: u32, byte: u8) -> Result<(), Error>
where
    SPI: FullDuplex<u8>,
{
    exchange(spi, budget, byte).map(|_echo| ())
}

/// Receives one byte by clocking out [`DUMMY_BYTE`].
pub fn receive<SPI>(spi: &mut SPI, budget: u32) -> Result<u8, Error>
where
    SPI: FullDuplex<u8>,
{
    exchange(spi, budget, DUMMY_BYTE)
}
