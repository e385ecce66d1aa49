//! RF-related registers
//!
//! This module contains registers related to RF configuration including:
//! - Carrier frequency synthesizer word
//! - Power amplifier selection and output level
//! - High power (+20 dBm) PA DAC setting
//! - Low noise amplifier gain and boost
//!
//! The frequency word is derived from the 32 MHz crystal; see
//! [`crate::config::frf_from_hz`].

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Carrier frequency registers (addresses: 0x06 MSB, 0x07 MID, 0x08 LSB)
///
/// `f_rf = frf * 32 MHz / 2^19`. Only the low 24 bits of `frf` are
/// transferred; the registers take effect once the LSB has been written.
#[register(0x06u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct Frequency {
    /// 24-bit synthesizer word
    pub frf: u32,
}

/// Error type for PA DAC conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPaDac(pub u8);

/// PA configuration register (address: 0x09)
///
/// # Output power
/// - PA_BOOST: `Pout = 17 - (15 - output_power)` dBm
/// - RFO: `Pout = Pmax - (15 - output_power)`, `Pmax = 10.8 + 0.6 * max_power`
#[register(0x09u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PaConfig {
    /// Route the output to PA_BOOST (true) or RFO (false), bit 7
    pub pa_boost: bool,
    /// Maximum power selection for RFO, bits 6:4
    pub max_power: u8,
    /// Output power, bits 3:0
    pub output_power: u8,
}

impl PaConfig {
    /// Decode a raw register value
    pub fn from_byte(value: u8) -> Self {
        Self {
            pa_boost: value & 0x80 != 0,
            max_power: (value >> 4) & 0x07,
            output_power: value & 0x0F,
        }
    }

    /// Encode to the raw register value
    pub fn to_byte(self) -> u8 {
        let boost = if self.pa_boost { 0x80 } else { 0x00 };
        boost | ((self.max_power & 0x07) << 4) | (self.output_power & 0x0F)
    }
}

/// PA DAC register (address: 0x4D)
///
/// Enables the +20 dBm option on PA_BOOST.
///
/// # Important Notes
/// - HighPower must only be used with PA_BOOST
/// - Duty cycle must stay at or below 1% with HighPower enabled
#[register(0x4Du8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub enum PaDac {
    /// Default PA_BOOST operation, up to +17 dBm
    Default,
    /// +20 dBm on PA_BOOST
    HighPower,
}

impl Default for PaDac {
    fn default() -> Self {
        Self::Default
    }
}

impl PaDac {
    /// Convert a raw byte value to PaDac
    pub fn from_byte(value: u8) -> Result<Self, InvalidPaDac> {
        match value {
            0x84 => Ok(Self::Default),
            0x87 => Ok(Self::HighPower),
            invalid => Err(InvalidPaDac(invalid)),
        }
    }

    /// Convert PaDac to its raw byte value
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Default => 0x84,
            Self::HighPower => 0x87,
        }
    }
}

/// LNA register (address: 0x0C)
///
/// # Important Notes
/// - `boost_hf` = 0b11 selects the 150% LNA current on the high frequency port
/// - The driver sets `boost_hf` during init and leaves the gain to the AGC
#[register(0x0Cu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct Lna {
    /// LNA gain setting, bits 7:5 (0b001 = maximum gain)
    pub gain: u8,
    /// Low frequency port boost, bits 4:3
    pub boost_lf: u8,
    /// High frequency port boost, bits 1:0
    pub boost_hf: u8,
    /// Reserved bit 2, kept as read
    reserved: bool,
}

impl Lna {
    /// `boost_hf` value for maximum LNA current
    pub const BOOST_HF_ON: u8 = 0b11;
}

impl FromByteArray for Frequency {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            frf: u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]),
        })
    }
}

impl ToByteArray for Frequency {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [_, msb, mid, lsb] = self.frf.to_be_bytes();
        Ok([msb, mid, lsb])
    }
}

impl FromByteArray for PaConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from_byte(bytes[0]))
    }
}

impl ToByteArray for PaConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for PaDac {
    type Error = InvalidPaDac;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Self::from_byte(bytes[0])
    }
}

impl ToByteArray for PaDac {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.to_byte()])
    }
}

impl FromByteArray for Lna {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            gain: (bytes[0] >> 5) & 0x07,
            boost_lf: (bytes[0] >> 3) & 0x03,
            reserved: bytes[0] & 0x04 != 0,
            boost_hf: bytes[0] & 0x03,
        })
    }
}

impl ToByteArray for Lna {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let reserved = if self.reserved { 0x04 } else { 0x00 };
        Ok([((self.gain & 0x07) << 5)
            | ((self.boost_lf & 0x03) << 3)
            | reserved
            | (self.boost_hf & 0x03)])
    }
}
