//! Operating mode commands
//!
//! Sleep, standby and RX duty cycling. Both `SetSleep` and `SetRxDutyCycle`
//! leave the radio asleep, so the handle wakes it before the next
//! transaction.

use bitflags::bitflags;
use core::convert::Infallible;

use regiface::{Command, NoParameters, ToByteArray};

use crate::opcode::SetCmd;

bitflags! {
    /// Sleep mode options
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SleepConfig: u8 {
        /// Keep the configuration while asleep (warm start). Cleared means
        /// cold start with every register back to its reset value.
        const WARM_START = 1 << 2;
        /// Wake up on RTC timeout as well as on NSS
        const RTC_WAKEUP = 1 << 0;
    }
}

impl ToByteArray for SleepConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

/// SetSleep command (0x84)
///
/// The radio stops answering until woken by NSS (or the RTC). The busy
/// signal stays high while asleep, so the handle does not wait for it after
/// this command.
#[derive(Debug, Clone)]
pub struct SetSleep {
    /// Sleep configuration
    pub config: SleepConfig,
}

impl Command for SetSleep {
    type IdType = u8;
    type CommandParameters = SleepConfig;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        SetCmd::SetSleep.opcode()
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

/// Oscillator kept running in standby
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StandbyConfig {
    /// RC 13 MHz oscillator
    Rc = 0,
    /// 32 MHz crystal or TCXO, for faster transitions to TX and RX
    Hse = 1,
}

impl ToByteArray for StandbyConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self as u8])
    }
}

/// SetStandby command (0x80)
#[derive(Debug, Clone)]
pub struct SetStandby {
    /// Standby oscillator
    pub config: StandbyConfig,
}

impl Command for SetStandby {
    type IdType = u8;
    type CommandParameters = StandbyConfig;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        SetCmd::SetStandby.opcode()
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

/// RX duty cycle periods
///
/// Both periods are in steps of 15.625 µs and only the low 24 bits are
/// sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxDutyCycleConfig {
    /// Time spent listening
    pub rx_period: u32,
    /// Time spent asleep between listening windows
    pub sleep_period: u32,
}

impl ToByteArray for RxDutyCycleConfig {
    type Error = Infallible;
    type Array = [u8; 6];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let mut bytes = [0u8; 6];
        bytes[0..3].copy_from_slice(&self.rx_period.to_be_bytes()[1..]);
        bytes[3..6].copy_from_slice(&self.sleep_period.to_be_bytes()[1..]);
        Ok(bytes)
    }
}

/// SetRxDutyCycle command (0x94)
///
/// Alternates between RX and sleep until a packet is received. The radio is
/// asleep most of the time, so the next transaction starts with a wake
/// pulse.
#[derive(Debug, Clone)]
pub struct SetRxDutyCycle {
    /// Listening and sleeping periods
    pub config: RxDutyCycleConfig,
}

impl Command for SetRxDutyCycle {
    type IdType = u8;
    type CommandParameters = RxDutyCycleConfig;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        SetCmd::SetRxDutyCycle.opcode()
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_config_encoding() {
        assert_eq!(SleepConfig::empty().to_bytes(), Ok([0x00]));
        assert_eq!(
            (SleepConfig::WARM_START | SleepConfig::RTC_WAKEUP).to_bytes(),
            Ok([0x05])
        );
    }

    #[test]
    fn duty_cycle_periods_are_24_bit_big_endian() {
        let config = RxDutyCycleConfig {
            rx_period: 0x0012_3456,
            sleep_period: 0xFFAB_CDEF,
        };
        assert_eq!(config.to_bytes(), Ok([0x12, 0x34, 0x56, 0xAB, 0xCD, 0xEF]));
    }

    #[test]
    fn ids_match_opcodes() {
        assert_eq!(SetSleep::id(), 0x84);
        assert_eq!(SetStandby::id(), 0x80);
        assert_eq!(SetRxDutyCycle::id(), 0x94);
    }
}
