//! Packet engine registers
//!
//! Address filtering, CRC and sync word settings used by the generic
//! (FSK) packet engine, plus the LoRa sync word.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Implements the byte conversions for a register holding one value that
/// converts to and from a big-endian byte array.
macro_rules! value_register {
    ($name:ident, $field:ident: u8) => {
        impl FromByteArray for $name {
            type Error = Infallible;
            type Array = [u8; 1];

            fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
                Ok(Self { $field: bytes[0] })
            }
        }

        impl ToByteArray for $name {
            type Error = Infallible;
            type Array = [u8; 1];

            fn to_bytes(self) -> Result<Self::Array, Self::Error> {
                Ok([self.$field])
            }
        }
    };
    ($name:ident, $field:ident: u16) => {
        impl FromByteArray for $name {
            type Error = Infallible;
            type Array = [u8; 2];

            fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
                Ok(Self {
                    $field: u16::from_be_bytes(bytes),
                })
            }
        }

        impl ToByteArray for $name {
            type Error = Infallible;
            type Array = [u8; 2];

            fn to_bytes(self) -> Result<Self::Array, Self::Error> {
                Ok(self.$field.to_be_bytes())
            }
        }
    };
    ($name:ident, $field:ident: [u8; $n:literal]) => {
        impl FromByteArray for $name {
            type Error = Infallible;
            type Array = [u8; $n];

            fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
                Ok(Self { $field: bytes })
            }
        }

        impl ToByteArray for $name {
            type Error = Infallible;
            type Array = [u8; $n];

            fn to_bytes(self) -> Result<Self::Array, Self::Error> {
                Ok(self.$field)
            }
        }
    };
}

/// Node address for packet filtering (0x06CD)
#[register(0x06CDu16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister, WritableRegister)]
pub struct NodeAddress {
    /// Address matched against the address byte of received packets
    pub address: u8,
}

value_register!(NodeAddress, address: u8);

/// Broadcast address for packet filtering (0x06CE)
///
/// Only checked when filtering accepts broadcast packets as well.
#[register(0x06CEu16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister, WritableRegister)]
pub struct BroadcastAddress {
    /// Broadcast address
    pub address: u8,
}

value_register!(BroadcastAddress, address: u8);

/// CRC seed (0x06BC)
///
/// `0x1D0F` for CCITT, `0xFFFF` for IBM.
#[register(0x06BCu16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct CrcInitialValue {
    /// Initial CRC register value
    pub value: u16,
}

impl Default for CrcInitialValue {
    fn default() -> Self {
        Self { value: 0x1D0F }
    }
}

value_register!(CrcInitialValue, value: u16);

/// CRC polynomial (0x06BE)
///
/// `0x1021` for CCITT, `0x8005` for IBM.
#[register(0x06BEu16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct CrcPolynomial {
    /// Polynomial, leading term implied
    pub value: u16,
}

impl Default for CrcPolynomial {
    fn default() -> Self {
        Self { value: 0x1021 }
    }
}

value_register!(CrcPolynomial, value: u16);

/// Generic packet sync word (0x06C0..=0x06C7)
///
/// Only the first bytes up to the configured sync word length are
/// compared.
#[register(0x06C0u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ReadableRegister, WritableRegister)]
pub struct SyncWord {
    /// Sync word bytes, first transmitted first
    pub value: [u8; 8],
}

value_register!(SyncWord, value: [u8; 8]);

/// LoRa sync word (0x0740)
///
/// `0x3444` for public networks, `0x1424` for private ones.
#[register(0x0740u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct LoraSyncWord {
    /// Sync word
    pub value: u16,
}

impl Default for LoraSyncWord {
    fn default() -> Self {
        Self { value: 0x1424 }
    }
}

value_register!(LoraSyncWord, value: u16);
