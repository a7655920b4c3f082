//! Interrupt status decoding and dispatch
//!
//! When the radio raises its interrupt line the host calls
//! [`SubGhz::irq_handler`]. One invocation:
//!
//! 1. reads the 16-bit status word (`GetIrqStatus`, 3 bytes: status byte
//!    then the word, big-endian)
//! 2. clears exactly the bits it read (`ClrIrqStatus`) before reacting, so a
//!    bit raised again in between re-asserts the line instead of being lost
//! 3. walks [`DISPATCH_ORDER`] and reports one [`IrqEvent`] per set bit
//!
//! Nothing is cached between invocations.

use bitflags::bitflags;
use embedded_hal_nb::spi::FullDuplex;

use crate::bus::Control;
use crate::opcode::{GetCmd, SetCmd};
use crate::{Error, SubGhz};

bitflags! {
    /// Radio interrupt status word
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct IrqStatus: u16 {
        /// Packet transmission completed
        const TX_DONE = 1 << 0;
        /// Packet received
        const RX_DONE = 1 << 1;
        /// Preamble detected
        const PREAMBLE_DETECTED = 1 << 2;
        /// Valid sync word detected (FSK)
        const SYNC_WORD_VALID = 1 << 3;
        /// Valid header received (LoRa)
        const HEADER_VALID = 1 << 4;
        /// Header CRC error (LoRa)
        const HEADER_ERROR = 1 << 5;
        /// Payload CRC error
        const CRC_ERROR = 1 << 6;
        /// Channel activity detection finished
        const CAD_DONE = 1 << 7;
        /// Channel activity detected; only meaningful with `CAD_DONE`
        const CAD_DETECTED = 1 << 8;
        /// RX or TX timeout
        const TIMEOUT = 1 << 9;
        /// LR-FHSS frequency hop
        const LR_FHSS_HOP = 1 << 14;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for IrqStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "IrqStatus({=u16:#06x})", self.bits())
    }
}

/// Outcome of a channel activity detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CadStatus {
    /// No activity on the channel
    Clear,
    /// Activity detected
    Detected,
}

/// Radio event decoded from the status word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqEvent {
    /// Transmission completed
    TxDone,
    /// Packet received
    RxDone,
    /// Preamble detected
    PreambleDetected,
    /// Valid sync word detected
    SyncWordValid,
    /// Valid LoRa header received
    HeaderValid,
    /// LoRa header CRC error
    HeaderError,
    /// Payload CRC error
    CrcError,
    /// Channel activity detection finished
    CadDone(CadStatus),
    /// RX or TX timeout
    Timeout,
    /// LR-FHSS frequency hop
    LrFhssHop,
}

/// Bits in the order they are reported, with the event each one maps to
pub const DISPATCH_ORDER: [(IrqStatus, fn(IrqStatus) -> IrqEvent); 10] = [
    (IrqStatus::TX_DONE, |_| IrqEvent::TxDone),
    (IrqStatus::RX_DONE, |_| IrqEvent::RxDone),
    (IrqStatus::PREAMBLE_DETECTED, |_| IrqEvent::PreambleDetected),
    (IrqStatus::SYNC_WORD_VALID, |_| IrqEvent::SyncWordValid),
    (IrqStatus::HEADER_VALID, |_| IrqEvent::HeaderValid),
    (IrqStatus::HEADER_ERROR, |_| IrqEvent::HeaderError),
    (IrqStatus::CRC_ERROR, |_| IrqEvent::CrcError),
    (IrqStatus::CAD_DONE, cad_done),
    (IrqStatus::TIMEOUT, |_| IrqEvent::Timeout),
    (IrqStatus::LR_FHSS_HOP, |_| IrqEvent::LrFhssHop),
];

fn cad_done(status: IrqStatus) -> IrqEvent {
    if status.contains(IrqStatus::CAD_DETECTED) {
        IrqEvent::CadDone(CadStatus::Detected)
    } else {
        IrqEvent::CadDone(CadStatus::Clear)
    }
}

/// Reactions to radio events
///
/// Every method defaults to doing nothing; implement the ones you need.
/// Closures taking an [`IrqEvent`] implement this trait directly.
pub trait IrqCallbacks {
    /// Entry point used by the dispatcher. Routes to the per-event methods
    /// unless overridden.
    fn on_event(&mut self, event: IrqEvent) {
        match event {
            IrqEvent::TxDone => self.tx_done(),
            IrqEvent::RxDone => self.rx_done(),
            IrqEvent::PreambleDetected => self.preamble_detected(),
            IrqEvent::SyncWordValid => self.sync_word_valid(),
            IrqEvent::HeaderValid => self.header_valid(),
            IrqEvent::HeaderError => self.header_error(),
            IrqEvent::CrcError => self.crc_error(),
            IrqEvent::CadDone(status) => self.cad_done(status),
            IrqEvent::Timeout => self.rx_tx_timeout(),
            IrqEvent::LrFhssHop => self.lr_fhss_hop(),
        }
    }

    /// Transmission completed.
    fn tx_done(&mut self) {}

    /// Packet received.
    fn rx_done(&mut self) {}

    /// Preamble detected.
    fn preamble_detected(&mut self) {}

    /// Valid sync word detected.
    fn sync_word_valid(&mut self) {}

    /// Valid LoRa header received.
    fn header_valid(&mut self) {}

    /// LoRa header CRC error.
    fn header_error(&mut self) {}

    /// Payload CRC error.
    fn crc_error(&mut self) {}

    /// Channel activity detection finished.
    fn cad_done(&mut self, _status: CadStatus) {}

    /// RX or TX timeout.
    fn rx_tx_timeout(&mut self) {}

    /// LR-FHSS frequency hop.
    fn lr_fhss_hop(&mut self) {}
}

impl<F> IrqCallbacks for F
where
    F: FnMut(IrqEvent),
{
    fn on_event(&mut self, event: IrqEvent) {
        self(event)
    }
}

/// Reports every event present in `status`, in [`DISPATCH_ORDER`].
pub fn dispatch<C>(status: IrqStatus, callbacks: &mut C)
where
    C: IrqCallbacks + ?Sized,
{
    for (mask, event) in DISPATCH_ORDER.iter() {
        if status.contains(*mask) {
            callbacks.on_event(event(status));
        }
    }
}

impl<SPI, CTL> SubGhz<SPI, CTL>
where
    SPI: FullDuplex<u8>,
    CTL: Control,
{
    /// Services a radio interrupt.
    ///
    /// Must not be called while another transaction holds the handle; it
    /// then fails with [`Error::Busy`] without touching the radio. When the
    /// status read fails, or the clear frame itself fails, no callback runs
    /// and the bits stay pending on the radio.
    ///
    /// A clear frame that went out but was followed by a busy timeout has
    /// already cleared the bits, so they are still dispatched and
    /// [`Error::RfBusyTimeout`] is returned afterwards.
    ///
    /// Returns the status word that was read and cleared.
    pub fn irq_handler<C>(&mut self, callbacks: &mut C) -> Result<IrqStatus, Error>
    where
        C: IrqCallbacks + ?Sized,
    {
        let mut raw = [0u8; 3];
        self.exec_get_cmd(GetCmd::GetIrqStatus, &mut raw)?;
        let cleared = match self.exec_set_cmd(SetCmd::ClrIrqStatus, &raw[1..]) {
            // frame errors take precedence, so the clear was sent
            Err(Error::RfBusyTimeout) => Err(Error::RfBusyTimeout),
            Err(error) => return Err(error),
            Ok(()) => Ok(()),
        };

        let status = IrqStatus::from_bits_retain(u16::from_be_bytes([raw[1], raw[2]]));
        trace!("subghz: irq status {}", status);

        dispatch(status, callbacks);
        cleared.map(|()| status)
    }
}
