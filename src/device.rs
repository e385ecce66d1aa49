//! SX127x Register Bus
//!
//! This module provides the lowest layer of the driver: single-byte register
//! transactions over an SPI bus with a dedicated chip-select line.
//!
//! Every transaction is bracketed by chip-select (active low):
//! - Write: `[addr | 0x80, value]`, two bytes out
//! - Read: `[addr & 0x7F]` out, one byte clocked in
//!
//! On top of the raw frames, [`Device`] offers typed access to the register
//! definitions in [`crate::registers`]. Registers wider than one byte (the
//! 24-bit carrier frequency, the 16-bit preamble length) are transferred as a
//! run of single-byte frames at ascending addresses, most significant first.
//!
//! # Example
//! ```no_run
//! use sx127x::{Device, registers::Version};
//!
//! # fn demo<SPI, CS>(spi: SPI, cs: CS) -> Result<(), sx127x::Error>
//! # where SPI: embedded_hal::spi::SpiBus, CS: embedded_hal::digital::OutputPin {
//! let mut device = Device::new(spi, cs);
//!
//! // Typed read
//! let version: Version = device.read_register()?;
//!
//! // Raw frame
//! device.write_byte(0x39, 0x12)?;
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use regiface::{errors::Error as RegifaceError, ByteArray, ReadableRegister, WritableRegister};

/// Address bit set on write frames
const WRITE_FLAG: u8 = 0x80;

/// Mask applied to the address byte of read frames
const ADDRESS_MASK: u8 = 0x7F;

/// FIFO data register
pub const REG_FIFO: u8 = 0x00;

/// Register bus of the SX127x radio.
///
/// Owns the SPI bus and the chip-select line. No address or value validation
/// is performed; callers are expected to stick to the register map.
pub struct Device<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> Device<SPI, CS> {
    /// Creates a new Device wrapping the provided SPI bus and chip-select pin.
    ///
    /// # Arguments
    /// * `spi` - An SPI bus implementing [`SpiBus`]
    /// * `cs` - The chip-select (NSS) output, active low
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    /// Releases the underlying SPI bus and chip-select pin.
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}

impl<SPI, CS> Device<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Drives chip-select high, leaving the bus idle.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - the chip-select line could not be driven
    pub fn deselect(&mut self) -> Result<(), RegifaceError> {
        self.cs.set_high().map_err(|_| RegifaceError::BusError)
    }

    /// Writes one byte to a register.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI or chip-select failure
    pub fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), RegifaceError> {
        self.frame(|spi| spi.write(&[addr | WRITE_FLAG, value]))
    }

    /// Reads one byte from a register.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI or chip-select failure
    pub fn read_byte(&mut self, addr: u8) -> Result<u8, RegifaceError> {
        let mut value = [0u8; 1];
        self.frame(|spi| {
            spi.write(&[addr & ADDRESS_MASK])?;
            spi.read(&mut value)
        })?;
        Ok(value[0])
    }

    /// Reads a typed register value from the device.
    ///
    /// # Type Parameters
    /// * `R` - Register type implementing ReadableRegister with u8 ID
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    /// * `RegifaceError::DeserializationError` - Failed to parse register value
    pub fn read_register<R>(&mut self) -> Result<R, RegifaceError>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();

        for (offset, byte) in raw_value.as_mut().iter_mut().enumerate() {
            *byte = self.read_byte(R::id().wrapping_add(offset as u8))?;
        }

        R::from_bytes(raw_value).map_err(|_| RegifaceError::DeserializationError)
    }

    /// Writes a typed register value to the device.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn write_register<R>(&mut self, register: R) -> Result<(), RegifaceError>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = match register.to_bytes() {
            Ok(raw_value) => raw_value,
            Err(never) => match never {},
        };

        for (offset, byte) in raw_value.as_ref().iter().enumerate() {
            self.write_byte(R::id().wrapping_add(offset as u8), *byte)?;
        }
        Ok(())
    }

    /// Reads a register, applies `f` to it and writes the result back.
    ///
    /// Fields not touched by `f` keep the value read from the device.
    pub fn modify_register<R, F>(&mut self, f: F) -> Result<(), RegifaceError>
    where
        R: ReadableRegister<IdType = u8> + WritableRegister<IdType = u8, Error = Infallible>,
        F: FnOnce(&mut R),
    {
        let mut register = self.read_register::<R>()?;
        f(&mut register);
        self.write_register(register)
    }

    /// Writes `bytes` to the FIFO, one frame per byte, starting at the
    /// current FIFO address pointer.
    pub fn write_fifo(&mut self, bytes: &[u8]) -> Result<(), RegifaceError> {
        bytes
            .iter()
            .try_for_each(|&byte| self.write_byte(REG_FIFO, byte))
    }

    /// Fills `bytes` from the FIFO, one frame per byte, starting at the
    /// current FIFO address pointer.
    pub fn read_fifo(&mut self, bytes: &mut [u8]) -> Result<(), RegifaceError> {
        for byte in bytes.iter_mut() {
            *byte = self.read_byte(REG_FIFO)?;
        }
        Ok(())
    }

    fn frame<F>(&mut self, f: F) -> Result<(), RegifaceError>
    where
        F: FnOnce(&mut SPI) -> Result<(), SPI::Error>,
    {
        self.cs.set_low().map_err(|_| RegifaceError::BusError)?;

        let result = f(&mut self.spi).and_then(|()| self.spi.flush());

        // chip-select is released even when the transfer failed
        let released = self.cs.set_high();

        result.map_err(|_| RegifaceError::BusError)?;
        released.map_err(|_| RegifaceError::BusError)
    }
}
