//! IRQ configuration and status commands
//!
//! The same [`IrqStatus`] bit layout is used for the enable mask, the DIO
//! routing masks, the status word and the clear mask.

use core::convert::Infallible;

use regiface::{Command, FromByteArray, NoParameters, ToByteArray};

use super::Status;
use crate::irq::IrqStatus;
use crate::opcode::{GetCmd, SetCmd};

impl ToByteArray for IrqStatus {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.bits().to_be_bytes())
    }
}

/// IRQ enable mask and routing to the interrupt lines
///
/// An interrupt reaches a line only when its bit is set both in `irq_mask`
/// and in that line's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DioIrqConfig {
    /// Interrupts the radio raises at all
    pub irq_mask: IrqStatus,
    /// Interrupts routed to line 1
    pub dio1_mask: IrqStatus,
    /// Interrupts routed to line 2
    pub dio2_mask: IrqStatus,
    /// Interrupts routed to line 3
    pub dio3_mask: IrqStatus,
}

impl ToByteArray for DioIrqConfig {
    type Error = Infallible;
    type Array = [u8; 8];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let mut bytes = [0u8; 8];
        bytes[0..2].copy_from_slice(&self.irq_mask.bits().to_be_bytes());
        bytes[2..4].copy_from_slice(&self.dio1_mask.bits().to_be_bytes());
        bytes[4..6].copy_from_slice(&self.dio2_mask.bits().to_be_bytes());
        bytes[6..8].copy_from_slice(&self.dio3_mask.bits().to_be_bytes());
        Ok(bytes)
    }
}

/// SetDioIrqParams command (0x08)
#[derive(Debug, Clone)]
pub struct SetDioIrqParams {
    /// Masks to program
    pub config: DioIrqConfig,
}

impl Command for SetDioIrqParams {
    type IdType = u8;
    type CommandParameters = DioIrqConfig;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        SetCmd::CfgDioIrq.opcode()
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

/// Response to [`GetIrqStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqStatusResponse {
    /// Radio status byte
    pub status: Status,
    /// Pending interrupts, unknown bits included
    pub irq: IrqStatus,
}

impl FromByteArray for IrqStatusResponse {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: Status::from(bytes[0]),
            irq: IrqStatus::from_bits_retain(u16::from_be_bytes([bytes[1], bytes[2]])),
        })
    }
}

/// GetIrqStatus command (0x12)
///
/// Reading does not clear anything; pending bits stay set until
/// [`ClearIrqStatus`].
#[derive(Debug, Clone)]
pub struct GetIrqStatus;

impl Command for GetIrqStatus {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = IrqStatusResponse;

    fn id() -> Self::IdType {
        GetCmd::GetIrqStatus.opcode()
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// ClearIrqStatus command (0x02)
#[derive(Debug, Clone)]
pub struct ClearIrqStatus {
    /// Bits to clear
    pub irq: IrqStatus,
}

impl Command for ClearIrqStatus {
    type IdType = u8;
    type CommandParameters = IrqStatus;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        SetCmd::ClrIrqStatus.opcode()
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.irq
    }
}
