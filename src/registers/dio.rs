//! Interrupt and DIO registers
//!
//! This module contains registers for interrupt handling:
//! - IRQ flags (status and write-one-to-clear acknowledgement)
//! - DIO0..DIO3 signal mapping
//!
//! The driver maps RxDone onto DIO0 and uses the rising edge of that line to
//! start the receive capture. TxDone is polled through the flags register.

use bitflags::bitflags;
use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

bitflags! {
    /// LoRa interrupt flags
    ///
    /// Flags stay set until cleared by writing a one to their bit position.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqFlags: u8 {
        /// No valid packet received within the RX single timeout
        const RX_TIMEOUT = 1 << 7;
        /// Packet reception complete
        const RX_DONE = 1 << 6;
        /// Payload CRC failed
        const PAYLOAD_CRC_ERROR = 1 << 5;
        /// Valid header received in RX
        const VALID_HEADER = 1 << 4;
        /// FIFO payload transmission complete
        const TX_DONE = 1 << 3;
        /// CAD complete
        const CAD_DONE = 1 << 2;
        /// FHSS change channel
        const FHSS_CHANGE_CHANNEL = 1 << 1;
        /// Valid LoRa signal detected during CAD
        const CAD_DETECTED = 1;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for IrqFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "IrqFlags({=u8:#04x})", self.bits())
    }
}

/// IRQ flags register (address: 0x12)
///
/// Reading returns the pending interrupt sources. Writing clears every flag
/// whose bit is set in the written value; [`IrqStatus::clear_all`] clears
/// them all.
#[register(0x12u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct IrqStatus {
    /// Pending (on read) or to-be-cleared (on write) flags
    pub flags: IrqFlags,
}

impl IrqStatus {
    /// Acknowledge exactly `flags`
    pub fn clear(flags: IrqFlags) -> Self {
        Self { flags }
    }

    /// Acknowledge every flag (`0xFF`)
    pub fn clear_all() -> Self {
        Self {
            flags: IrqFlags::all(),
        }
    }
}

/// DIO mapping 1 register (address: 0x40)
///
/// Selects which internal signal is routed to DIO0..DIO3. In LoRa mode a
/// `dio0` value of 0b00 routes RxDone, 0b01 TxDone and 0b10 CadDone.
#[register(0x40u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct DioMapping1 {
    /// DIO0 mapping, bits 7:6
    pub dio0: u8,
    /// DIO1 mapping, bits 5:4
    pub dio1: u8,
    /// DIO2 mapping, bits 3:2
    pub dio2: u8,
    /// DIO3 mapping, bits 1:0
    pub dio3: u8,
}

impl DioMapping1 {
    /// DIO0 mapping value routing RxDone
    pub const DIO0_RX_DONE: u8 = 0b00;
    /// DIO0 mapping value routing TxDone
    pub const DIO0_TX_DONE: u8 = 0b01;

    /// Mapping with RxDone on DIO0 and every other line at its reset default
    pub fn rx_done() -> Self {
        Self {
            dio0: Self::DIO0_RX_DONE,
            ..Self::default()
        }
    }
}

impl FromByteArray for IrqStatus {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: IrqFlags::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for IrqStatus {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits()])
    }
}

impl FromByteArray for DioMapping1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            dio0: (bytes[0] >> 6) & 0x03,
            dio1: (bytes[0] >> 4) & 0x03,
            dio2: (bytes[0] >> 2) & 0x03,
            dio3: bytes[0] & 0x03,
        })
    }
}

impl ToByteArray for DioMapping1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([((self.dio0 & 0x03) << 6)
            | ((self.dio1 & 0x03) << 4)
            | ((self.dio2 & 0x03) << 2)
            | (self.dio3 & 0x03)])
    }
}
