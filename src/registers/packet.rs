//! Packet handling related registers
//!
//! This module contains registers for moving payloads in and out of the
//! 256 byte FIFO and for describing the received packet:
//! - FIFO address pointer and TX/RX base addresses
//! - Received byte count and start address of the last packet
//! - Payload length for transmission
//! - Preamble length and sync word
//! - Packet RSSI and SNR
//!
//! Transmit and receive share the whole FIFO: both base addresses are set to
//! zero, which is safe because the radio is half-duplex.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Offset subtracted from the raw RSSI register value to obtain dBm
pub const RSSI_OFFSET: i16 = 157;

/// FIFO address pointer register (address: 0x0D)
///
/// Position of the next FIFO data register access. Auto-increments on every
/// read or write of the FIFO data register.
#[register(0x0Du8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct FifoAddrPtr {
    /// FIFO offset of the next data register access
    pub address: u8,
}

/// FIFO TX base address register (address: 0x0E)
///
/// Where the modulator starts reading the payload on entering Transmit.
#[register(0x0Eu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct FifoTxBaseAddr {
    /// FIFO offset where transmit payloads start
    pub address: u8,
}

/// FIFO RX base address register (address: 0x0F)
///
/// Where the demodulator starts writing received payloads.
#[register(0x0Fu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct FifoRxBaseAddr {
    /// FIFO offset where received payloads start
    pub address: u8,
}

/// FIFO RX current address register (address: 0x10)
///
/// Start address of the last packet received. Read-only.
#[register(0x10u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct FifoRxCurrentAddr {
    /// FIFO offset of the first byte of the last packet
    pub address: u8,
}

/// RX byte count register (address: 0x13)
///
/// Number of payload bytes of the last packet received. Read-only.
#[register(0x13u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct RxNbBytes {
    /// Payload bytes received
    pub count: u8,
}

/// Payload length register (address: 0x22)
///
/// Number of FIFO bytes to transmit in explicit header mode.
#[register(0x22u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PayloadLength {
    /// Payload bytes to transmit
    pub length: u8,
}

/// Preamble length registers (addresses: 0x20, 0x21)
///
/// Number of preamble symbols, not counting the 4.25 fixed symbols.
/// Default: 8
#[register(0x20u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct PreambleLength {
    /// Preamble length in symbols, MSB at 0x20
    pub symbols: u16,
}

impl Default for PreambleLength {
    fn default() -> Self {
        Self { symbols: 8 }
    }
}

/// LoRa sync word register (address: 0x39)
///
/// # Standard Values
/// - Private networks: 0x12 (default)
/// - LoRaWAN public network: 0x34
#[register(0x39u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct SyncWord {
    /// Sync word; 0x12 private, 0x34 LoRaWAN public
    pub value: u8,
}

impl Default for SyncWord {
    fn default() -> Self {
        Self { value: 0x12 }
    }
}

/// Packet RSSI register (address: 0x1A)
///
/// Signal strength of the last packet received;
/// `dBm = value - RSSI_OFFSET` on the high frequency port.
#[register(0x1Au8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct PacketRssi {
    /// Raw RSSI of the last packet
    pub value: u8,
}

impl PacketRssi {
    /// Signal strength in dBm
    pub fn dbm(self) -> i16 {
        i16::from(self.value) - RSSI_OFFSET
    }
}

/// Packet SNR register (address: 0x19)
///
/// Estimated SNR of the last packet in two's complement quarter-dB steps.
/// 0x1B next door is the instantaneous RSSI, not the SNR.
#[register(0x19u8)]
#[derive(Debug, Clone, Copy, ReadableRegister)]
pub struct PacketSnr {
    /// SNR in quarter-dB steps, two's complement
    pub value: i8,
}

impl PacketSnr {
    /// SNR in dB, rounded toward zero
    pub fn db(self) -> i8 {
        self.value / 4
    }
}

macro_rules! single_byte {
    ($ty:ident, $field:ident) => {
        impl FromByteArray for $ty {
            type Error = Infallible;
            type Array = [u8; 1];

            fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
                Ok(Self { $field: bytes[0] })
            }
        }
    };
    ($ty:ident, $field:ident, writable) => {
        single_byte!($ty, $field);

        impl ToByteArray for $ty {
            type Error = Infallible;
            type Array = [u8; 1];

            fn to_bytes(self) -> Result<Self::Array, Self::Error> {
                Ok([self.$field])
            }
        }
    };
}

single_byte!(FifoAddrPtr, address, writable);
single_byte!(FifoTxBaseAddr, address, writable);
single_byte!(FifoRxBaseAddr, address, writable);
single_byte!(FifoRxCurrentAddr, address);
single_byte!(RxNbBytes, count);
single_byte!(PayloadLength, length, writable);
single_byte!(SyncWord, value, writable);
single_byte!(PacketRssi, value);

impl FromByteArray for PreambleLength {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            symbols: u16::from_be_bytes(bytes),
        })
    }
}

impl ToByteArray for PreambleLength {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.symbols.to_be_bytes())
    }
}

impl FromByteArray for PacketSnr {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            value: bytes[0] as i8,
        })
    }
}
