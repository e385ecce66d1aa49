//! Operating mode control
//!
//! Every transition is a single write of the operating mode register with the
//! LoRa bit set. No transition is refused; the driver only keeps to two rules
//! on its own paths: configuration happens in Sleep or Standby, and Transmit
//! is always followed by ReceiveContinuous.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;
use regiface::errors::Error as RegifaceError;

use super::Radio;
use crate::registers::{OpMode, OperatingMode};

impl<SPI, CS, RESET, DIO0, D> Radio<SPI, CS, RESET, DIO0, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RESET: OutputPin,
    DIO0: InputPin,
    D: DelayNs,
{
    /// Commands `mode`.
    pub fn set_mode(&mut self, mode: OperatingMode) -> Result<(), RegifaceError> {
        self.device.write_register(OpMode::lora(mode))?;
        trace!("mode {}", mode);
        self.mode = mode;
        Ok(())
    }

    /// Reads the operating mode back from the device.
    ///
    /// # Errors
    /// * `RegifaceError::DeserializationError` - the device is in a mode this
    ///   driver never commands (frequency synthesis or CAD)
    pub fn read_mode(&mut self) -> Result<OperatingMode, RegifaceError> {
        Ok(self.device.read_register::<OpMode>()?.mode)
    }

    /// Enters Sleep.
    pub fn sleep(&mut self) -> Result<(), RegifaceError> {
        self.set_mode(OperatingMode::Sleep)
    }

    /// Enters Standby.
    pub fn standby(&mut self) -> Result<(), RegifaceError> {
        self.set_mode(OperatingMode::Standby)
    }

    /// Starts listening continuously.
    pub fn receive_continuous(&mut self) -> Result<(), RegifaceError> {
        self.set_mode(OperatingMode::ReceiveContinuous)
    }

    /// Listens for a single packet; the device falls back to Standby afterwards.
    pub fn receive_single(&mut self) -> Result<(), RegifaceError> {
        self.set_mode(OperatingMode::ReceiveSingle)
    }
}

impl<SPI, CS, RESET, DIO0, D> Radio<SPI, CS, RESET, DIO0, D> {
    /// The mode last commanded. Single-shot modes may have fallen back to
    /// Standby on the device since.
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }
}
