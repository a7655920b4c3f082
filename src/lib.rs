#![cfg_attr(not(test), no_std)]
//! Sub-GHz radio transaction driver
//!
//! Blocking, `no_std` driver for an SX126x-class radio core reached over a
//! dedicated SPI bus, as found integrated in the STM32WL or wired to a host
//! as a discrete SX1261/2. It frames every exchange with the radio and keeps
//! the bus protocol honest:
//!
//! - the select line frames each command
//! - the busy signal is awaited before and after each command
//! - a sleeping radio is woken before it is talked to
//! - every wait is bounded and reported
//!
//! # Architecture
//! - [`device`]: the [`SubGhz`] handle, lifecycle and transaction engine
//! - [`bus`]: the [`Control`] trait and byte-level bus primitives; the data
//!   path is any [`embedded_hal_nb::spi::FullDuplex`] implementation
//! - [`pins`]: [`Control`] over plain GPIOs for discrete radios
//! - [`irq`]: interrupt status decoding and dispatch
//! - [`opcode`]: frame opcodes
//! - [`commands`] and [`registers`]: typed commands and registers on top of
//!   the raw frames, built with `regiface`
//! - [`config`] and [`timeout`]: bus clock and spin budgets
//!
//! Faults are returned as [`Error`] and additionally recorded in the
//! handle's sticky [`ErrorCode`]. With the `defmt` feature the driver logs
//! lifecycle transitions, timeouts and interrupt status words.
//!
//! # Example
//! ```no_run
//! use embedded_hal_nb::spi::FullDuplex;
//! use subghz::{
//!     commands::{SetStandby, StandbyConfig},
//!     registers::NodeAddress,
//!     Config, Control, Error, IrqEvent, ResetMode, SubGhz,
//! };
//!
//! fn run<SPI: FullDuplex<u8>, CTL: Control>(spi: SPI, control: CTL) -> Result<(), Error> {
//!     let mut radio = SubGhz::new(spi, control, Config::default(), ResetMode::Full);
//!     radio.init()?;
//!
//!     radio.execute_command(SetStandby { config: StandbyConfig::Rc })?;
//!     radio.write_typed_register(NodeAddress { address: 0x5A })?;
//!
//!     // from the radio interrupt
//!     radio.irq_handler(&mut |event: IrqEvent| {
//!         if event == IrqEvent::TxDone {
//!             // next packet
//!         }
//!     })?;
//!     Ok(())
//! }
//! ```

#[macro_use]
mod fmt;

pub mod bus;
pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod irq;
pub mod opcode;
pub mod pins;
pub mod registers;
pub mod timeout;

pub use bus::Control;
pub use config::{BaudPrescaler, Config, ResetMode};
pub use device::{State, SubGhz};
pub use error::{Error, ErrorCode};
pub use irq::{CadStatus, IrqCallbacks, IrqEvent, IrqStatus};
pub use opcode::{GetCmd, SetCmd};
pub use pins::PinControl;
pub use timeout::Timing;
