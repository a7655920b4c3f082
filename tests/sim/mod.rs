//! Simulated radio shared by the integration tests
//!
//! Models the radio side of the bus: a register file, the 256-byte data
//! buffer, the IRQ status word, the busy signal, sleep and reset. Both the
//! SPI data path and the control lines are handles onto the same state.

#![allow(dead_code)]

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use embedded_hal::spi::ErrorKind;
use embedded_hal_nb::nb;
use embedded_hal_nb::spi::FullDuplex;
use subghz::{BaudPrescaler, Config, Control, ResetMode, SubGhz, Timing};

const WRITE_REGISTER: u8 = 0x0D;
const READ_REGISTER: u8 = 0x1D;
const WRITE_BUFFER: u8 = 0x0E;
const READ_BUFFER: u8 = 0x1E;
const GET_IRQ_STATUS: u8 = 0x12;
const GET_ERROR: u8 = 0x17;
const CLR_IRQ_STATUS: u8 = 0x02;
const CLR_ERROR: u8 = 0x07;
const SET_SLEEP: u8 = 0x84;

/// Small budgets so that expiry tests stay fast and countable
pub const TIMING: Timing = Timing {
    spi: 50,
    busy: 20,
    wake: 3,
};

pub fn config() -> Config {
    Config::default().with_timing(TIMING)
}

/// Radio side state
pub struct SimState {
    pub registers: Vec<u8>,
    pub buffer: [u8; 256],
    pub irq: u16,
    pub device_errors: u16,
    /// Status byte sent during get-command responses
    pub status: u8,

    pub selected: bool,
    pub asleep: bool,
    frame: Vec<u8>,
    /// Every completed select..deselect window; empty ones are wake pulses
    pub frames: Vec<Vec<u8>>,
    pending: Option<u8>,

    /// Busy polls reporting high after each command
    pub busy_after_command: u32,
    /// Busy polls reporting high after a wake pulse
    pub busy_after_wake: u32,
    busy_remaining: u32,
    pub busy_stuck: bool,
    /// Busy sticks high once a frame with this opcode completes
    pub busy_stuck_after: Option<u8>,
    pub busy_mask: bool,
    pub busy_polls: u32,

    /// Transmit-empty never sets
    pub tx_stall: bool,
    /// Receive-ready never sets
    pub rx_stall: bool,
    /// Transmit-empty never sets for this opcode
    pub stall_opcode: Option<u8>,
    pub fault: Option<ErrorKind>,
    pub write_polls: u32,
    pub read_polls: u32,

    pub in_reset: bool,
    pub reset_stuck: bool,
    pub reset_polls: u32,

    pub spi: Option<BaudPrescaler>,
    pub irq_line: bool,
    pub busy_wakeup: bool,
    pub busy_flag_clears: u32,
}

impl SimState {
    fn new() -> Self {
        Self {
            registers: vec![0; 0x1_0000],
            buffer: [0; 256],
            irq: 0,
            device_errors: 0,
            // STDBY_RC, data available
            status: 0x24,
            selected: false,
            asleep: false,
            frame: Vec::new(),
            frames: Vec::new(),
            pending: None,
            busy_after_command: 2,
            busy_after_wake: 2,
            busy_remaining: 0,
            busy_stuck: false,
            busy_stuck_after: None,
            busy_mask: true,
            busy_polls: 0,
            tx_stall: false,
            rx_stall: false,
            stall_opcode: None,
            fault: None,
            write_polls: 0,
            read_polls: 0,
            in_reset: true,
            reset_stuck: false,
            reset_polls: 0,
            spi: None,
            irq_line: false,
            busy_wakeup: false,
            busy_flag_clears: 0,
        }
    }

    /// Frames that carried at least one byte.
    pub fn commands(&self) -> Vec<Vec<u8>> {
        self.frames.iter().filter(|f| !f.is_empty()).cloned().collect()
    }

    pub fn last_frame(&self) -> Option<&[u8]> {
        self.frames.last().map(|f| f.as_slice())
    }

    fn respond(&self) -> u8 {
        let frame = &self.frame;
        let index = frame.len() - 1;
        match frame[0] {
            READ_REGISTER if index >= 4 => {
                let address = u16::from_be_bytes([frame[1], frame[2]])
                    .wrapping_add((index - 4) as u16);
                self.registers[address as usize]
            }
            READ_BUFFER if index >= 3 => {
                self.buffer[frame[1].wrapping_add((index - 3) as u8) as usize]
            }
            GET_IRQ_STATUS => word_response(self.status, self.irq, index),
            GET_ERROR => word_response(self.status, self.device_errors, index),
            _ => self.status,
        }
    }

    fn finish_frame(&mut self) {
        let frame = std::mem::take(&mut self.frame);
        match frame.first().copied() {
            Some(WRITE_REGISTER) if frame.len() > 3 => {
                let address = u16::from_be_bytes([frame[1], frame[2]]);
                for (i, byte) in frame[3..].iter().enumerate() {
                    self.registers[address.wrapping_add(i as u16) as usize] = *byte;
                }
            }
            Some(WRITE_BUFFER) if frame.len() > 2 => {
                for (i, byte) in frame[2..].iter().enumerate() {
                    self.buffer[frame[1].wrapping_add(i as u8) as usize] = *byte;
                }
            }
            Some(CLR_IRQ_STATUS) if frame.len() >= 3 => {
                self.irq &= !u16::from_be_bytes([frame[1], frame[2]]);
            }
            Some(CLR_ERROR) => self.device_errors = 0,
            Some(SET_SLEEP) => self.asleep = true,
            _ => {}
        }
        if frame.first().is_some() && frame.first().copied() == self.busy_stuck_after {
            self.busy_stuck = true;
        }
        if !frame.is_empty() && !self.asleep {
            self.busy_remaining = self.busy_after_command;
        }
        self.frames.push(frame);
    }
}

fn word_response(status: u8, word: u16, index: usize) -> u8 {
    match index {
        1 => status,
        2 => word.to_be_bytes()[0],
        3 => word.to_be_bytes()[1],
        _ => 0,
    }
}

/// Handle onto the simulated radio
#[derive(Clone)]
pub struct Sim {
    state: Rc<RefCell<SimState>>,
}

impl Sim {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState::new())),
        }
    }

    pub fn spi(&self) -> SimSpi {
        SimSpi {
            state: Rc::clone(&self.state),
        }
    }

    pub fn control(&self) -> SimControl {
        SimControl {
            state: Rc::clone(&self.state),
        }
    }

    pub fn state(&self) -> RefMut<'_, SimState> {
        self.state.borrow_mut()
    }
}

pub type Radio = SubGhz<SimSpi, SimControl>;

/// Handle that has not been initialized yet.
pub fn radio(reset_mode: ResetMode) -> (Radio, Sim) {
    let sim = Sim::new();
    if reset_mode == ResetMode::RfReady {
        sim.state().in_reset = false;
    }
    (SubGhz::new(sim.spi(), sim.control(), config(), reset_mode), sim)
}

/// Initialized handle with an empty bus log.
pub fn ready_radio() -> (Radio, Sim) {
    let (mut radio, sim) = radio(ResetMode::Full);
    assert_eq!(radio.init(), Ok(()));
    sim.state().frames.clear();
    (radio, sim)
}

/// Data path of the simulated radio
pub struct SimSpi {
    state: Rc<RefCell<SimState>>,
}

impl embedded_hal::spi::ErrorType for SimSpi {
    type Error = ErrorKind;
}

impl FullDuplex<u8> for SimSpi {
    fn read(&mut self) -> nb::Result<u8, ErrorKind> {
        let mut state = self.state.borrow_mut();
        state.read_polls += 1;
        if state.rx_stall {
            return Err(nb::Error::WouldBlock);
        }
        state.pending.take().ok_or(nb::Error::WouldBlock)
    }

    fn write(&mut self, word: u8) -> nb::Result<(), ErrorKind> {
        let mut state = self.state.borrow_mut();
        state.write_polls += 1;
        if let Some(kind) = state.fault {
            return Err(nb::Error::Other(kind));
        }
        let opcode_stalled = state.frame.is_empty() && state.stall_opcode == Some(word);
        if state.tx_stall || opcode_stalled {
            return Err(nb::Error::WouldBlock);
        }
        let response = if state.selected {
            state.frame.push(word);
            state.respond()
        } else {
            0xFF
        };
        state.pending = Some(response);
        Ok(())
    }
}

/// Control lines of the simulated radio
pub struct SimControl {
    state: Rc<RefCell<SimState>>,
}

impl Control for SimControl {
    fn select(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.asleep {
            state.asleep = false;
            state.busy_remaining = state.busy_after_wake;
        }
        state.selected = true;
    }

    fn deselect(&mut self) {
        let mut state = self.state.borrow_mut();
        state.selected = false;
        state.finish_frame();
    }

    fn busy_signal(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        state.busy_polls += 1;
        if state.busy_stuck || state.asleep {
            return true;
        }
        if state.busy_remaining > 0 {
            state.busy_remaining -= 1;
            true
        } else {
            false
        }
    }

    fn busy_mask(&mut self) -> bool {
        self.state.borrow().busy_mask
    }

    fn assert_reset(&mut self) {
        let mut state = self.state.borrow_mut();
        if !state.reset_stuck {
            state.in_reset = true;
        }
    }

    fn release_reset(&mut self) {
        let mut state = self.state.borrow_mut();
        if !state.reset_stuck {
            state.in_reset = false;
        }
    }

    fn under_reset(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        state.reset_polls += 1;
        state.in_reset
    }

    fn enable_spi(&mut self, prescaler: BaudPrescaler) {
        self.state.borrow_mut().spi = Some(prescaler);
    }

    fn disable_spi(&mut self) {
        self.state.borrow_mut().spi = None;
    }

    fn enable_irq_line(&mut self) {
        self.state.borrow_mut().irq_line = true;
    }

    fn disable_irq_line(&mut self) {
        self.state.borrow_mut().irq_line = false;
    }

    fn set_busy_wakeup(&mut self, enabled: bool) {
        self.state.borrow_mut().busy_wakeup = enabled;
    }

    fn clear_busy_flag(&mut self) {
        self.state.borrow_mut().busy_flag_clears += 1;
    }
}
