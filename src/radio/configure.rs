//! Modulation and output configuration
//!
//! Each setter converts its argument with the pure functions in
//! [`crate::config`] and writes the result, preserving register fields it
//! does not own. The mirrored [`RadioConfig`](crate::RadioConfig) is updated
//! after the write succeeds.
//!
//! Call these in Sleep or Standby. Changing modulation while receiving or
//! transmitting is not supported by the hardware.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;
use regiface::errors::Error as RegifaceError;

use super::Radio;
use crate::config::{
    bandwidth_code, check_spreading_factor, clamp_coding_rate, coding_rate_code,
    detection_settings, frf_from_hz, pa_settings, RadioConfig,
};
use crate::error::ConfigError;
use crate::registers::{
    Frequency, ModemConfig1, ModemConfig2, PreambleLength, SyncWord,
};

impl<SPI, CS, RESET, DIO0, D> Radio<SPI, CS, RESET, DIO0, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RESET: OutputPin,
    DIO0: InputPin,
    D: DelayNs,
{
    /// Writes every field of `config`.
    pub fn apply_config(&mut self, config: RadioConfig) -> Result<(), ConfigError> {
        check_spreading_factor(config.spreading_factor)?;

        self.set_frequency(config.frequency_hz)?;
        self.set_bandwidth(config.bandwidth_hz)?;
        self.set_spreading_factor(config.spreading_factor)?;
        self.set_coding_rate(config.coding_rate_denom)?;
        self.set_tx_power(config.tx_power_dbm, config.pa_boost)?;
        if config.crc_enabled {
            self.enable_crc()?;
        } else {
            self.disable_crc()?;
        }
        Ok(())
    }

    /// Sets the carrier frequency.
    ///
    /// The synthesizer word is `round(hz / 61.03515625)`; there is no band
    /// check.
    pub fn set_frequency(&mut self, hz: f64) -> Result<(), RegifaceError> {
        self.device.write_register(Frequency {
            frf: frf_from_hz(hz),
        })?;
        self.config.frequency_hz = hz;
        Ok(())
    }

    /// Sets the signal bandwidth to the first supported value at or above `hz`.
    ///
    /// Requests above 250 kHz write code 9, see
    /// [`OVERSIZE_BANDWIDTH_CODE`](crate::config::OVERSIZE_BANDWIDTH_CODE).
    pub fn set_bandwidth(&mut self, hz: u32) -> Result<(), RegifaceError> {
        let code = bandwidth_code(hz);
        self.device
            .modify_register(|reg: &mut ModemConfig1| reg.bandwidth = code)?;
        self.config.bandwidth_hz = hz;
        Ok(())
    }

    /// Sets the spreading factor.
    ///
    /// # Errors
    /// * `ConfigError::SpreadingFactorOutOfRange` - `sf` outside 6..=12,
    ///   nothing is written
    pub fn set_spreading_factor(&mut self, sf: u8) -> Result<(), ConfigError> {
        let sf = check_spreading_factor(sf)?;

        let (optimize, threshold) = detection_settings(sf);
        self.device.write_register(optimize)?;
        self.device.write_register(threshold)?;
        self.device
            .modify_register(|reg: &mut ModemConfig2| reg.spreading_factor = sf)?;

        self.config.spreading_factor = sf;
        Ok(())
    }

    /// Sets the coding rate to 4/`denom`; `denom` is clamped to 5..=8.
    pub fn set_coding_rate(&mut self, denom: u8) -> Result<(), RegifaceError> {
        let code = coding_rate_code(denom);
        self.device
            .modify_register(|reg: &mut ModemConfig1| reg.coding_rate = code)?;
        self.config.coding_rate_denom = clamp_coding_rate(denom);
        Ok(())
    }

    /// Sets the output power.
    ///
    /// With `use_boost` the output is PA_BOOST, 2..=17 dBm or a forced
    /// 20 dBm for anything above 17. Without it the output is RFO, 0..=14 dBm.
    /// Out of range requests are clamped.
    pub fn set_tx_power(&mut self, dbm: i8, use_boost: bool) -> Result<(), RegifaceError> {
        let pa = pa_settings(dbm, use_boost);
        if let Some(dac) = pa.dac {
            self.device.write_register(dac)?;
        }
        self.device.write_register(pa.config)?;

        self.config.tx_power_dbm = pa.effective_dbm;
        self.config.pa_boost = use_boost;
        Ok(())
    }

    /// Enables payload CRC generation and checking.
    pub fn enable_crc(&mut self) -> Result<(), RegifaceError> {
        self.set_crc(true)
    }

    /// Disables payload CRC generation and checking.
    pub fn disable_crc(&mut self) -> Result<(), RegifaceError> {
        self.set_crc(false)
    }

    fn set_crc(&mut self, enabled: bool) -> Result<(), RegifaceError> {
        self.device
            .modify_register(|reg: &mut ModemConfig2| reg.crc_on = enabled)?;
        self.config.crc_enabled = enabled;
        Ok(())
    }

    /// Sets the LoRa sync word. Radios only hear packets with a matching word.
    pub fn set_sync_word(&mut self, value: u8) -> Result<(), RegifaceError> {
        self.device.write_register(SyncWord { value })
    }

    /// Sets the preamble length in symbols.
    pub fn set_preamble_length(&mut self, symbols: u16) -> Result<(), RegifaceError> {
        self.device.write_register(PreambleLength { symbols })
    }
}
