//! Radio handle and transaction engine
//!
//! [`SubGhz`] owns the SPI data path and the control lines and serializes
//! every exchange with the radio. Each transaction runs the same sequence:
//!
//! 1. refuse with [`Error::Busy`] unless the handle is `Ready` and unlocked
//! 2. wake the radio if the previous command put it to sleep, then wait for
//!    the busy signal to drop
//! 3. select, exchange the frame bytes, deselect
//! 4. wait for the busy signal again (skipped after `SetSleep`)
//! 5. restore `Ready`, release the lock and report
//!
//! Faults are OR-ed into the handle's [`ErrorCode`] as they are detected and
//! the first one is returned. Select is released and the state restored on
//! every path.
//!
//! # Example
//! ```no_run
//! use embedded_hal_nb::spi::FullDuplex;
//! use subghz::{Config, Control, ResetMode, SetCmd, SubGhz, Error};
//!
//! fn bring_up<SPI, CTL>(spi: SPI, control: CTL) -> Result<SubGhz<SPI, CTL>, Error>
//! where
//!     SPI: FullDuplex<u8>,
//!     CTL: Control,
//! {
//!     let mut radio = SubGhz::new(spi, control, Config::new(48_000_000), ResetMode::Full);
//!     radio.init()?;
//!
//!     // STDBY_RC
//!     radio.exec_set_cmd(SetCmd::SetStandby, &[0x00])?;
//!     radio.write_register(0x06CD, 0x5A)?;
//!     Ok(radio)
//! }
//! ```

use core::convert::Infallible;

use embedded_hal_nb::spi::FullDuplex;
use regiface::{ByteArray, Command, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use crate::bus::{self, Control};
use crate::config::{Config, ResetMode};
use crate::opcode::{self, GetCmd, SetCmd};
use crate::timeout::{settle, spin_until};
use crate::{Error, ErrorCode};

/// Lifecycle state of the handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not initialized; [`SubGhz::init`] will take the radio out of reset
    Reset,
    /// Not initialized; the radio is already out of reset and keeps its
    /// configuration
    ResetRfReady,
    /// Initialized and idle
    Ready,
    /// A transaction, init or deinit is in progress
    Busy,
}

/// Handle to the sub-GHz radio
///
/// There is exactly one per radio; it owns both bus backends until
/// [`release`](SubGhz::release) hands them back.
pub struct SubGhz<SPI, CTL> {
    spi: SPI,
    control: CTL,
    config: Config,
    state: State,
    error: ErrorCode,
    deep_sleep: bool,
    locked: bool,
}

impl<SPI, CTL> SubGhz<SPI, CTL> {
    /// Creates the handle without touching the hardware.
    ///
    /// `reset_mode` selects whether [`init`](SubGhz::init) has to take the
    /// radio out of reset.
    pub fn new(spi: SPI, control: CTL, config: Config, reset_mode: ResetMode) -> Self {
        let state = match reset_mode {
            ResetMode::Full => State::Reset,
            ResetMode::RfReady => State::ResetRfReady,
        };
        Self {
            spi,
            control,
            config,
            state,
            error: ErrorCode::empty(),
            deep_sleep: false,
            locked: false,
        }
    }

    /// Releases the bus backends.
    pub fn release(self) -> (SPI, CTL) {
        (self.spi, self.control)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Faults recorded by the last operation.
    pub fn error(&self) -> ErrorCode {
        self.error
    }

    /// Whether the next transaction starts with a wake pulse.
    pub fn is_deep_sleep(&self) -> bool {
        self.deep_sleep
    }

    /// Configuration fixed at construction.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the exclusivity lock is held.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Takes the exclusivity lock on behalf of the caller.
    ///
    /// While held, every transaction (including the interrupt handler)
    /// fails with [`Error::Busy`]. Used to keep a foreground sequence from
    /// being interleaved with work done from interrupt context.
    pub fn lock(&mut self) -> Result<(), Error> {
        if self.locked {
            return Err(Error::Busy);
        }
        self.locked = true;
        Ok(())
    }

    /// Releases a lock taken with [`lock`](SubGhz::lock).
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    fn acquire(&mut self) -> Result<(), Error> {
        if self.state != State::Ready || self.locked {
            return Err(Error::Busy);
        }
        self.locked = true;
        self.state = State::Busy;
        self.error = ErrorCode::empty();
        Ok(())
    }

    fn restore(&mut self) {
        self.state = State::Ready;
        self.locked = false;
    }

    fn record(&mut self, error: Error) -> Error {
        self.error |= ErrorCode::from_error(error);
        warn!("subghz: {}", error);
        error
    }
}

impl<SPI, CTL> SubGhz<SPI, CTL>
where
    SPI: FullDuplex<u8>,
    CTL: Control,
{
    /// Brings the radio and its bus up.
    ///
    /// From [`State::Reset`] the radio is taken out of reset first and the
    /// release is confirmed within the SPI budget. The bus is only enabled
    /// when that succeeds, but the handle ends up [`State::Ready`] either
    /// way so the caller can inspect or retry.
    pub fn init(&mut self) -> Result<(), Error> {
        let mut status = Ok(());
        let from = self.state;

        if matches!(from, State::Reset | State::ResetRfReady) {
            self.locked = false;
            self.control.enable_irq_line();
        }

        if from == State::Reset {
            self.state = State::Busy;
            self.control.release_reset();

            let control = &mut self.control;
            let released = spin_until(self.config.timing.spi, || !control.under_reset()).is_ok();
            if !released {
                self.error = ErrorCode::TIMEOUT;
                status = Err(Error::Timeout);
                warn!("subghz: radio did not leave reset");
            }

            self.control.deselect();
            self.control.set_busy_wakeup(true);
        }

        self.control.clear_busy_flag();

        if status.is_ok() {
            self.control.enable_spi(self.config.baud_prescaler);
            self.deep_sleep = true;
            self.error = ErrorCode::empty();
        }

        self.state = State::Ready;
        debug!("subghz: init from {} -> Ready", from);
        status
    }

    /// Shuts the bus down and puts the radio back into reset.
    ///
    /// The error code and lock are cleared and the handle returns to
    /// [`State::Reset`] even when the reset confirmation times out; the
    /// timeout is still reported.
    pub fn deinit(&mut self) -> Result<(), Error> {
        self.state = State::Busy;

        self.control.disable_spi();
        self.control.disable_irq_line();
        self.control.set_busy_wakeup(false);
        self.control.clear_busy_flag();
        self.control.assert_reset();

        let control = &mut self.control;
        let status = spin_until(self.config.timing.spi, || control.under_reset())
            .map_err(|_| Error::Timeout);
        if status.is_err() {
            warn!("subghz: radio did not enter reset");
        }

        self.error = ErrorCode::empty();
        self.locked = false;
        self.state = State::Reset;
        debug!("subghz: deinit -> Reset");
        status
    }

    /// Writes `data` to consecutive registers starting at `address`.
    pub fn write_registers(&mut self, address: u16, data: &[u8]) -> Result<(), Error> {
        self.transaction(true, |radio| {
            radio.transmit(opcode::WRITE_REGISTER)?;
            radio.transmit_all(&address.to_be_bytes())?;
            radio.transmit_all(data)
        })
    }

    /// Reads `buf.len()` consecutive registers starting at `address`.
    ///
    /// The status byte the radio sends ahead of the data is consumed.
    pub fn read_registers(&mut self, address: u16, buf: &mut [u8]) -> Result<(), Error> {
        self.transaction(true, |radio| {
            radio.transmit(opcode::READ_REGISTER)?;
            radio.transmit_all(&address.to_be_bytes())?;
            radio.transmit(opcode::NOP)?;
            radio.receive_into(buf)
        })
    }

    /// Writes a single register.
    pub fn write_register(&mut self, address: u16, value: u8) -> Result<(), Error> {
        self.write_registers(address, &[value])
    }

    /// Reads a single register.
    pub fn read_register(&mut self, address: u16) -> Result<u8, Error> {
        let mut value = [0u8; 1];
        self.read_registers(address, &mut value)?;
        Ok(value[0])
    }

    /// Sends a set command with its parameters.
    ///
    /// `SetSleep` and `SetRxDutyCycle` leave the radio asleep, so the next
    /// transaction starts with a wake pulse. After `SetSleep` the busy
    /// signal is not awaited.
    pub fn exec_set_cmd(&mut self, command: SetCmd, payload: &[u8]) -> Result<(), Error> {
        self.transaction(command.raises_busy(), |radio| {
            radio.deep_sleep = command.enters_sleep();
            radio.transmit(command.opcode())?;
            radio.transmit_all(payload)
        })
    }

    /// Sends a get command and reads `buf.len()` bytes back.
    ///
    /// `buf[0]` receives the radio status byte; the response proper starts
    /// at `buf[1]`.
    pub fn exec_get_cmd(&mut self, command: GetCmd, buf: &mut [u8]) -> Result<(), Error> {
        self.get_frame(command, &[], buf)
    }

    /// Writes `data` into the radio data buffer starting at `offset`.
    pub fn write_buffer(&mut self, offset: u8, data: &[u8]) -> Result<(), Error> {
        self.transaction(true, |radio| {
            radio.transmit(opcode::WRITE_BUFFER)?;
            radio.transmit(offset)?;
            radio.transmit_all(data)
        })
    }

    /// Reads `buf.len()` bytes from the radio data buffer starting at
    /// `offset`.
    ///
    /// The status byte the radio sends ahead of the data is consumed.
    pub fn read_buffer(&mut self, offset: u8, buf: &mut [u8]) -> Result<(), Error> {
        self.transaction(true, |radio| {
            radio.transmit(opcode::READ_BUFFER)?;
            radio.transmit(offset)?;
            radio.transmit(opcode::NOP)?;
            radio.receive_into(buf)
        })
    }

    /// Reads a typed register.
    pub fn read_typed_register<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u16>,
    {
        let mut raw_value = R::Array::new();
        self.read_registers(R::id(), raw_value.as_mut())?;
        R::from_bytes(raw_value).map_err(|_| Error::InvalidResponse)
    }

    /// Writes a typed register.
    pub fn write_typed_register<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister<IdType = u16, Error = Infallible>,
    {
        let raw_value = match register.to_bytes() {
            Ok(raw_value) => raw_value,
            Err(never) => match never {},
        };
        self.write_registers(R::id(), raw_value.as_ref())
    }

    /// Executes a typed command.
    ///
    /// Commands without a response go through [`exec_set_cmd`]
    /// (so sleep tracking applies), the others through the get-command
    /// framing, with the status byte as the first response byte.
    ///
    /// [`exec_set_cmd`]: SubGhz::exec_set_cmd
    pub fn execute_command<C>(&mut self, command: C) -> Result<C::ResponseParameters, Error>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
    {
        let request = match command.invoking_parameters().to_bytes() {
            Ok(request) => request,
            Err(never) => match never {},
        };
        let mut raw_response = <C::ResponseParameters as FromByteArray>::Array::new();

        if raw_response.as_ref().is_empty() {
            let command = SetCmd::try_from(C::id())?;
            self.exec_set_cmd(command, request.as_ref())?;
        } else {
            let command = GetCmd::try_from(C::id())?;
            self.get_frame(command, request.as_ref(), raw_response.as_mut())?;
        }

        C::ResponseParameters::from_bytes(raw_response).map_err(|_| Error::InvalidResponse)
    }

    fn get_frame(&mut self, command: GetCmd, params: &[u8], buf: &mut [u8]) -> Result<(), Error> {
        self.transaction(true, |radio| {
            radio.transmit(command.opcode())?;
            radio.transmit_all(params)?;
            radio.receive_into(buf)
        })
    }

    fn transaction<T, F>(&mut self, wait_after: bool, frame: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Self) -> Result<T, Error>,
    {
        self.acquire()?;

        let ready = self.check_device_ready();

        self.control.select();
        let framed = frame(self);
        self.control.deselect();

        let settled = if wait_after { self.wait_on_busy() } else { Ok(()) };

        self.restore();

        let value = framed?;
        ready?;
        settled?;
        Ok(value)
    }

    /// Wakes a sleeping radio, then waits for it to become ready.
    fn check_device_ready(&mut self) -> Result<(), Error> {
        if self.deep_sleep {
            self.control.select();
            settle(self.config.timing.wake);
            self.control.deselect();
        }
        self.wait_on_busy()
    }

    fn wait_on_busy(&mut self) -> Result<(), Error> {
        let control = &mut self.control;
        let cleared = spin_until(self.config.timing.busy, || {
            let mask = control.busy_mask();
            !(control.busy_signal() && mask)
        })
        .is_ok();

        if cleared {
            Ok(())
        } else {
            Err(self.record(Error::RfBusyTimeout))
        }
    }

    fn transmit(&mut self, byte: u8) -> Result<(), Error> {
        bus::transmit(&mut self.spi, self.config.timing.spi, byte).map_err(|e| self.record(e))
    }

    fn transmit_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        bytes.iter().try_for_each(|&byte| self.transmit(byte))
    }

    fn receive_into(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        for slot in buf.iter_mut() {
            *slot = bus::receive(&mut self.spi, self.config.timing.spi)
                .map_err(|e| self.record(e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BaudPrescaler;
    use crate::timeout::Timing;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    /// Control lines of a radio that is never busy.
    #[derive(Default)]
    struct Idle {
        selects: u32,
        deselects: u32,
        spi: Option<BaudPrescaler>,
    }

    impl Control for Idle {
        fn select(&mut self) {
            self.selects += 1;
        }

        fn deselect(&mut self) {
            self.deselects += 1;
        }

        fn busy_signal(&mut self) -> bool {
            false
        }

        fn assert_reset(&mut self) {}

        fn release_reset(&mut self) {}

        fn under_reset(&mut self) -> bool {
            false
        }

        fn enable_spi(&mut self, prescaler: BaudPrescaler) {
            self.spi = Some(prescaler);
        }

        fn disable_spi(&mut self) {
            self.spi = None;
        }
    }

    /// Each byte sent is answered with `0x00`.
    fn sent(bytes: &[u8]) -> Vec<SpiTransaction<u8>> {
        bytes
            .iter()
            .flat_map(|&b| [SpiTransaction::write(b), SpiTransaction::read(0x00)])
            .collect()
    }

    fn received(bytes: &[u8]) -> Vec<SpiTransaction<u8>> {
        bytes
            .iter()
            .flat_map(|&b| [SpiTransaction::write(opcode::DUMMY_BYTE), SpiTransaction::read(b)])
            .collect()
    }

    fn ready(expectations: &[SpiTransaction<u8>]) -> SubGhz<SpiMock<u8>, Idle> {
        let config = Config::default().with_timing(Timing { spi: 4, busy: 4, wake: 1 });
        let mut radio = SubGhz::new(
            SpiMock::new(expectations),
            Idle::default(),
            config,
            ResetMode::RfReady,
        );
        assert_eq!(radio.init(), Ok(()));
        radio
    }

    fn finish(radio: SubGhz<SpiMock<u8>, Idle>) -> Idle {
        let (mut spi, control) = radio.release();
        spi.done();
        control
    }

    #[test]
    fn register_write_frame() {
        let mut radio = ready(&sent(&[0x0D, 0x06, 0xCD, 0x5A, 0xA5]));
        assert_eq!(radio.write_registers(0x06CD, &[0x5A, 0xA5]), Ok(()));
        assert_eq!(radio.state(), State::Ready);

        let control = finish(radio);
        // wake pulse plus the frame
        assert_eq!(control.selects, 2);
        assert_eq!(control.deselects, 2);
    }

    #[test]
    fn register_read_consumes_status_byte() {
        let mut expectations = sent(&[0x1D, 0x07, 0x40, opcode::NOP]);
        expectations.extend(received(&[0x34, 0x44]));
        let mut radio = ready(&expectations);

        let mut value = [0u8; 2];
        assert_eq!(radio.read_registers(0x0740, &mut value), Ok(()));
        assert_eq!(value, [0x34, 0x44]);
        finish(radio);
    }

    #[test]
    fn get_command_delivers_status_byte() {
        let mut expectations = sent(&[0x12]);
        expectations.extend(received(&[0x24, 0x02, 0x01]));
        let mut radio = ready(&expectations);

        let mut buf = [0u8; 3];
        assert_eq!(radio.exec_get_cmd(GetCmd::GetIrqStatus, &mut buf), Ok(()));
        assert_eq!(buf, [0x24, 0x02, 0x01]);
        finish(radio);
    }

    #[test]
    fn buffer_frames() {
        let mut expectations = sent(&[0x0E, 0x80, 0xDE, 0xAD]);
        expectations.extend(sent(&[0x1E, 0x80, opcode::NOP]));
        expectations.extend(received(&[0xDE, 0xAD]));
        let mut radio = ready(&expectations);

        assert_eq!(radio.write_buffer(0x80, &[0xDE, 0xAD]), Ok(()));
        let mut data = [0u8; 2];
        assert_eq!(radio.read_buffer(0x80, &mut data), Ok(()));
        assert_eq!(data, [0xDE, 0xAD]);
        finish(radio);
    }

    #[test]
    fn set_command_tracks_sleep() {
        let mut expectations = sent(&[0x84, 0x04]);
        expectations.extend(sent(&[0x80, 0x00]));
        let mut radio = ready(&expectations);

        assert_eq!(radio.exec_set_cmd(SetCmd::SetSleep, &[0x04]), Ok(()));
        assert!(radio.is_deep_sleep());
        assert_eq!(radio.exec_set_cmd(SetCmd::SetStandby, &[0x00]), Ok(()));
        assert!(!radio.is_deep_sleep());
        finish(radio);
    }

    #[test]
    fn nothing_is_sent_before_init() {
        let expectations: [SpiTransaction<u8>; 0] = [];
        let mut radio = SubGhz::new(
            SpiMock::new(&expectations),
            Idle::default(),
            Config::default(),
            ResetMode::Full,
        );
        assert_eq!(radio.write_register(0x06CD, 0x01), Err(Error::Busy));
        assert!(radio.error().is_empty());
        let control = finish(radio);
        assert_eq!(control.selects, 0);
    }

    #[test]
    fn lock_is_exclusive() {
        let mut radio = ready(&[]);
        assert_eq!(radio.lock(), Ok(()));
        assert_eq!(radio.lock(), Err(Error::Busy));
        assert_eq!(radio.read_register(0x06CD), Err(Error::Busy));
        radio.unlock();
        assert!(!radio.is_locked());
        finish(radio);
    }
}
