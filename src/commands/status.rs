//! Status and device error commands

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{Command, FromByteArray, NoParameters, ToByteArray};

use crate::opcode::{GetCmd, SetCmd};

/// Operating mode reported in the status byte (bits 6:4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Standby on the RC 13 MHz oscillator
    StandbyRc = 0x2,
    /// Standby on the 32 MHz oscillator
    StandbyHse = 0x3,
    /// Frequency synthesis
    Fs = 0x4,
    /// Receiving
    Rx = 0x5,
    /// Transmitting
    Tx = 0x6,
}

impl TryFrom<u8> for OperatingMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x2 => Ok(Self::StandbyRc),
            0x3 => Ok(Self::StandbyHse),
            0x4 => Ok(Self::Fs),
            0x5 => Ok(Self::Rx),
            0x6 => Ok(Self::Tx),
            other => Err(other),
        }
    }
}

/// Outcome of the last command reported in the status byte (bits 3:1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandStatus {
    /// Data is ready to be read
    DataAvailable = 0x2,
    /// Command timed out
    Timeout = 0x3,
    /// Command could not be decoded
    ProcessingError = 0x4,
    /// Command failed to execute
    ExecutionFailure = 0x5,
    /// Transmission completed
    TxDone = 0x6,
}

impl TryFrom<u8> for CommandStatus {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x2 => Ok(Self::DataAvailable),
            0x3 => Ok(Self::Timeout),
            0x4 => Ok(Self::ProcessingError),
            0x5 => Ok(Self::ExecutionFailure),
            0x6 => Ok(Self::TxDone),
            other => Err(other),
        }
    }
}

/// Radio status byte
///
/// Sent first in every get-command response. Reserved field values are
/// kept rather than rejected; a radio that was just woken often reports
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(u8);

impl Status {
    /// Byte as received.
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Current operating mode, `None` for reserved values.
    pub fn mode(self) -> Option<OperatingMode> {
        OperatingMode::try_from((self.0 >> 4) & 0x7).ok()
    }

    /// Outcome of the last command, `None` for reserved values.
    pub fn command_status(self) -> Option<CommandStatus> {
        CommandStatus::try_from((self.0 >> 1) & 0x7).ok()
    }
}

impl From<u8> for Status {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl FromByteArray for Status {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self(bytes[0]))
    }
}

/// GetStatus command (0xC0)
#[derive(Debug, Clone)]
pub struct GetStatus;

impl Command for GetStatus {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = Status;

    fn id() -> Self::IdType {
        GetCmd::GetStatus.opcode()
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

bitflags! {
    /// Faults latched by the radio
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DeviceErrors: u16 {
        /// RC 64 kHz calibration failed
        const RC64K_CALIBRATION = 1 << 0;
        /// RC 13 MHz calibration failed
        const RC13M_CALIBRATION = 1 << 1;
        /// PLL calibration failed
        const PLL_CALIBRATION = 1 << 2;
        /// ADC calibration failed
        const ADC_CALIBRATION = 1 << 3;
        /// Image calibration failed
        const IMAGE_CALIBRATION = 1 << 4;
        /// 32 MHz oscillator failed to start
        const HSE_START = 1 << 5;
        /// PLL failed to lock
        const PLL_LOCK = 1 << 6;
        /// PA ramp failed
        const PA_RAMP = 1 << 8;
    }
}

/// Response to [`GetDeviceErrors`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceErrorsResponse {
    /// Radio status byte
    pub status: Status,
    /// Latched faults
    pub errors: DeviceErrors,
}

impl FromByteArray for DeviceErrorsResponse {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: Status(bytes[0]),
            errors: DeviceErrors::from_bits_retain(u16::from_be_bytes([bytes[1], bytes[2]])),
        })
    }
}

/// GetDeviceErrors command (0x17)
#[derive(Debug, Clone)]
pub struct GetDeviceErrors;

impl Command for GetDeviceErrors {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = DeviceErrorsResponse;

    fn id() -> Self::IdType {
        GetCmd::GetError.opcode()
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// Parameter byte of [`ClearDeviceErrors`], always zero
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearErrorsParams;

impl ToByteArray for ClearErrorsParams {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([0x00])
    }
}

/// ClearDeviceErrors command (0x07)
#[derive(Debug, Clone)]
pub struct ClearDeviceErrors;

impl Command for ClearDeviceErrors {
    type IdType = u8;
    type CommandParameters = ClearErrorsParams;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        SetCmd::ClrError.opcode()
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        ClearErrorsParams
    }
}
