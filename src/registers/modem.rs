//! LoRa modem configuration registers
//!
//! This module contains the registers that define the modulation:
//! - Bandwidth, coding rate and header mode (modem config 1)
//! - Spreading factor and payload CRC (modem config 2)
//! - Low data rate optimization and AGC (modem config 3)
//! - Detection optimize/threshold pair required by SF6
//!
//! The setters in [`crate::Radio`] always read-modify-write modem config 1
//! and 2 so that fields they do not own keep their current value.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Modem config 1 register (address: 0x1D)
#[register(0x1Du8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct ModemConfig1 {
    /// Bandwidth table index, bits 7:4
    pub bandwidth: u8,
    /// Coding rate code (`denominator - 4`), bits 3:1
    pub coding_rate: u8,
    /// Implicit header mode, bit 0
    pub implicit_header: bool,
}

/// Modem config 2 register (address: 0x1E)
#[register(0x1Eu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct ModemConfig2 {
    /// Spreading factor, bits 7:4
    pub spreading_factor: u8,
    /// Continuous transmit mode, bit 3
    pub tx_continuous: bool,
    /// Payload CRC generation and check, bit 2
    pub crc_on: bool,
    /// RX single timeout MSB, bits 1:0
    pub symb_timeout_msb: u8,
}

/// Modem config 3 register (address: 0x26)
///
/// The driver writes a fixed value during init: AGC on, low data rate
/// optimization off.
#[register(0x26u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct ModemConfig3 {
    /// Mandatory when a symbol lasts longer than 16 ms, bit 3
    pub low_data_rate_optimize: bool,
    /// LNA gain set by the AGC loop, bit 2
    pub agc_auto_on: bool,
}

impl Default for ModemConfig3 {
    fn default() -> Self {
        Self {
            low_data_rate_optimize: false,
            agc_auto_on: true,
        }
    }
}

/// Detection optimize register (address: 0x31)
///
/// 0xC5 for SF6, 0xC3 for SF7 to SF12.
#[register(0x31u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct DetectionOptimize {
    /// Detection optimize value, 0xC5 for SF6 and 0xC3 otherwise
    pub value: u8,
}

/// Detection threshold register (address: 0x37)
///
/// 0x0C for SF6, 0x0A for SF7 to SF12.
#[register(0x37u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct DetectionThreshold {
    /// Detection threshold, 0x0C for SF6 and 0x0A otherwise
    pub value: u8,
}

impl FromByteArray for ModemConfig1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            bandwidth: bytes[0] >> 4,
            coding_rate: (bytes[0] >> 1) & 0x07,
            implicit_header: bytes[0] & 0x01 != 0,
        })
    }
}

impl ToByteArray for ModemConfig1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.bandwidth & 0x0F) << 4)
            | ((self.coding_rate & 0x07) << 1)
            | self.implicit_header as u8])
    }
}

impl FromByteArray for ModemConfig2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            spreading_factor: bytes[0] >> 4,
            tx_continuous: bytes[0] & 0x08 != 0,
            crc_on: bytes[0] & 0x04 != 0,
            symb_timeout_msb: bytes[0] & 0x03,
        })
    }
}

impl ToByteArray for ModemConfig2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let tx_continuous = if self.tx_continuous { 0x08 } else { 0x00 };
        let crc_on = if self.crc_on { 0x04 } else { 0x00 };
        Ok([((self.spreading_factor & 0x0F) << 4)
            | tx_continuous
            | crc_on
            | (self.symb_timeout_msb & 0x03)])
    }
}

impl FromByteArray for ModemConfig3 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            low_data_rate_optimize: bytes[0] & 0x08 != 0,
            agc_auto_on: bytes[0] & 0x04 != 0,
        })
    }
}

impl ToByteArray for ModemConfig3 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let ldro = if self.low_data_rate_optimize { 0x08 } else { 0x00 };
        let agc = if self.agc_auto_on { 0x04 } else { 0x00 };
        Ok([ldro | agc])
    }
}

impl FromByteArray for DetectionOptimize {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for DetectionOptimize {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}

impl FromByteArray for DetectionThreshold {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for DetectionThreshold {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}
