//! System-related registers
//!
//! This module contains registers for device-level control:
//! - Operating mode selection (LoRa long-range mode plus the mode code)
//! - Silicon version identification
//!
//! The operating mode register is written on every mode transition; the
//! version register is only read during initialization.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Silicon version reported by every SX1276/77/78/79
pub const SX127X_VERSION: u8 = 0x12;

/// Error type for operating mode conversion
///
/// Carries the 3-bit mode code that has no [`OperatingMode`] counterpart
/// (frequency synthesis or CAD modes, which this driver never commands).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidMode(pub u8);

/// Operating mode of the radio
///
/// The discriminant is the 3-bit mode code of the operating mode register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Lowest power; FIFO not accessible. Required to switch into LoRa mode.
    Sleep = 0b000,
    /// Crystal oscillator running; configuration changes are made here
    Standby = 0b001,
    /// Transmit the FIFO content, then fall back to Standby
    Transmit = 0b011,
    /// Listen until told otherwise; each packet raises RxDone
    ReceiveContinuous = 0b101,
    /// Listen for a single packet, then fall back to Standby
    ReceiveSingle = 0b110,
}

impl OperatingMode {
    /// Convert a 3-bit mode code to an OperatingMode
    pub fn from_code(code: u8) -> Result<Self, InvalidMode> {
        match code & 0x07 {
            0b000 => Ok(Self::Sleep),
            0b001 => Ok(Self::Standby),
            0b011 => Ok(Self::Transmit),
            0b101 => Ok(Self::ReceiveContinuous),
            0b110 => Ok(Self::ReceiveSingle),
            invalid => Err(InvalidMode(invalid)),
        }
    }

    /// The 3-bit mode code
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Operating mode register (address: 0x01)
///
/// # Important Notes
/// - `long_range_mode` selects the LoRa modem and may only be changed in Sleep
/// - The driver always writes it set, so every transition is a single
///   register write of `0x80 | mode`
/// - Bits 6:3 (shared register access, low frequency mode) are written as zero
#[register(0x01u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct OpMode {
    /// LoRa (true) or FSK/OOK (false) modem
    pub long_range_mode: bool,
    /// Operating mode code
    pub mode: OperatingMode,
}

impl OpMode {
    /// Register value commanding `mode` with the LoRa modem selected
    pub fn lora(mode: OperatingMode) -> Self {
        Self {
            long_range_mode: true,
            mode,
        }
    }
}

/// Version register (address: 0x42)
///
/// Holds the silicon revision. SX1276/77/78/79 report [`SX127X_VERSION`];
/// a value of zero usually means the chip has not come out of reset yet.
#[register(0x42u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct Version {
    /// Full revision number (bits 7:4) and metal mask revision (bits 3:0)
    pub value: u8,
}

impl FromByteArray for OpMode {
    type Error = InvalidMode;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            long_range_mode: bytes[0] & 0x80 != 0,
            mode: OperatingMode::from_code(bytes[0])?,
        })
    }
}

impl ToByteArray for OpMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let lora = if self.long_range_mode { 0x80 } else { 0x00 };
        Ok([lora | self.mode.code()])
    }
}

impl FromByteArray for Version {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}
