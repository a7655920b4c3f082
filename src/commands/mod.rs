//! Typed radio commands
//!
//! Each command implements [`regiface::Command`] and is run through
//! [`SubGhz::execute_command`](crate::SubGhz::execute_command). Commands
//! whose response is [`NoParameters`](regiface::NoParameters) go out as set
//! commands; everything else is framed as a get command and its response
//! starts with the radio [`Status`] byte.
//!
//! - operational: sleep, standby and RX duty cycling
//! - dio: IRQ masks and IRQ status
//! - status: status byte and device errors

mod dio;
mod operational;
mod status;

pub use dio::*;
pub use operational::*;
pub use status::*;
