//! Radio opcodes
//!
//! The radio understands four frame shapes, each selected by its first byte:
//! - set commands ([`SetCmd`]): opcode followed by parameters, no response
//! - get commands ([`GetCmd`]): opcode followed by the status byte and the
//!   response
//! - register access ([`WRITE_REGISTER`], [`READ_REGISTER`]): opcode and a
//!   16-bit big-endian address
//! - buffer access ([`WRITE_BUFFER`], [`READ_BUFFER`]): opcode and an 8-bit
//!   offset into the 256-byte data buffer

use crate::Error;

/// Write one or more registers
pub const WRITE_REGISTER: u8 = 0x0D;
/// Read one or more registers
pub const READ_REGISTER: u8 = 0x1D;
/// Write into the data buffer
pub const WRITE_BUFFER: u8 = 0x0E;
/// Read from the data buffer
pub const READ_BUFFER: u8 = 0x1E;

/// Byte clocked out while reading
pub const DUMMY_BYTE: u8 = 0xFF;
/// Byte clocked out in place of the status byte of register and buffer reads
pub const NOP: u8 = 0x00;

macro_rules! opcodes {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u8)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            /// Opcode byte sent on the bus
            pub const fn opcode(self) -> u8 {
                self as u8
            }
        }

        impl TryFrom<u8> for $name {
            type Error = Error;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(Self::$variant), )+
                    unknown => Err(Error::UnknownOpcode(unknown)),
                }
            }
        }
    };
}

opcodes! {
    /// Commands that configure the radio and return nothing
    pub enum SetCmd {
        /// Enter sleep mode
        SetSleep = 0x84,
        /// Enter standby mode
        SetStandby = 0x80,
        /// Enter frequency synthesis mode
        SetFs = 0xC1,
        /// Start transmission
        SetTx = 0x83,
        /// Start reception
        SetRx = 0x82,
        /// Stop the RX timer on preamble or sync word detection
        SetStopRxTimerOnPreamble = 0x9F,
        /// Cycle between reception and sleep
        SetRxDutyCycle = 0x94,
        /// Start channel activity detection
        SetCad = 0xC5,
        /// Transmit an unmodulated carrier
        SetTxContinuousWave = 0xD1,
        /// Transmit an infinite preamble
        SetTxContinuousPreamble = 0xD2,
        /// Select the packet type
        SetPacketType = 0x8A,
        /// Set the RF frequency
        SetRfFrequency = 0x86,
        /// Set output power and ramp time
        SetTxParams = 0x8E,
        /// Set PA duty cycle and output stage selection
        SetPaConfig = 0x95,
        /// Set the mode entered after TX or RX
        SetTxRxFallbackMode = 0x93,
        /// Set channel activity detection parameters
        SetCadParams = 0x88,
        /// Set TX and RX base addresses in the data buffer
        SetBufferBaseAddress = 0x8F,
        /// Set modulation parameters
        SetModulationParams = 0x8B,
        /// Set packet parameters
        SetPacketParams = 0x8C,
        /// Set the LoRa symbol timeout
        SetLoRaSymbTimeout = 0xA0,
        /// Select LDO or SMPS regulation
        SetRegulatorMode = 0x96,
        /// Run calibration blocks
        Calibrate = 0x89,
        /// Run image calibration over a frequency band
        CalibrateImage = 0x98,
        /// Configure TCXO control
        SetTcxoMode = 0x97,
        /// Configure RF switch control
        SetRfSwitchMode = 0x9D,
        /// Configure IRQ masks and line mapping
        CfgDioIrq = 0x08,
        /// Clear IRQ status bits
        ClrIrqStatus = 0x02,
        /// Clear device errors
        ClrError = 0x07,
    }
}

opcodes! {
    /// Commands that return data after the status byte
    pub enum GetCmd {
        /// Status byte only
        GetStatus = 0xC0,
        /// Current packet type
        GetPacketType = 0x11,
        /// Length and start of the last received payload
        GetRxBufferStatus = 0x13,
        /// Status of the last received packet
        GetPacketStatus = 0x14,
        /// Instantaneous RSSI
        GetRssiInst = 0x15,
        /// Reception statistics
        GetStats = 0x10,
        /// Reset reception statistics
        ResetStats = 0x00,
        /// IRQ status word
        GetIrqStatus = 0x12,
        /// Device error flags
        GetError = 0x17,
    }
}

impl SetCmd {
    /// Whether the radio is left asleep once this command completes, so the
    /// next transaction has to wake it first.
    pub const fn enters_sleep(self) -> bool {
        matches!(self, Self::SetSleep | Self::SetRxDutyCycle)
    }

    /// Whether the radio raises its busy signal after this command.
    ///
    /// A sleeping radio never drops busy, so waiting for it would always
    /// time out.
    pub const fn raises_busy(self) -> bool {
        !matches!(self, Self::SetSleep)
    }
}
