//! Radio configuration and register encodings
//!
//! Everything in here is a pure mapping from engineering units (Hz, dBm,
//! spreading factor, coding rate denominator) to register values. The
//! [`Radio`](crate::Radio) setters call these and then write the result.

use crate::error::ConfigError;
use crate::registers::{DetectionOptimize, DetectionThreshold, PaConfig, PaDac};

/// Crystal oscillator frequency
pub const FXOSC_HZ: f64 = 32_000_000.0;

/// Frequency synthesizer step, `FXOSC / 2^19` = 61.03515625 Hz
pub const FSTEP_HZ: f64 = FXOSC_HZ / (1u32 << 19) as f64;

/// Signal bandwidths selectable through modem config 1, ascending.
/// The position in this table is the register code.
pub const BANDWIDTHS_HZ: [u32; 9] = [
    7_800, 10_400, 15_600, 20_800, 31_250, 41_700, 62_500, 125_000, 250_000,
];

/// Code written when a requested bandwidth exceeds every table entry.
///
/// The datasheet lists 9 as 500 kHz, which is not usable in the lower bands
/// and is not part of [`BANDWIDTHS_HZ`]; the code is passed through unchanged.
pub const OVERSIZE_BANDWIDTH_CODE: u8 = 9;

/// Valid spreading factors
pub const SPREADING_FACTORS: core::ops::RangeInclusive<u8> = 6..=12;

/// Largest payload the FIFO and the payload length field can carry
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Modulation and output settings applied during init and kept current by
/// every setter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfig {
    /// Carrier frequency in Hz
    pub frequency_hz: f64,
    /// Requested signal bandwidth in Hz
    pub bandwidth_hz: u32,
    /// Spreading factor, 6..=12
    pub spreading_factor: u8,
    /// Coding rate denominator, 5..=8 (4/5 .. 4/8)
    pub coding_rate_denom: u8,
    /// Output power in dBm
    pub tx_power_dbm: i8,
    /// Output routed to PA_BOOST
    pub pa_boost: bool,
    /// Payload CRC generated on transmit and checked on receive
    pub crc_enabled: bool,
}

impl Default for RadioConfig {
    /// 915 MHz, 125 kHz, SF7, CR 4/5, 17 dBm on PA_BOOST, CRC on
    fn default() -> Self {
        Self {
            frequency_hz: 915e6,
            bandwidth_hz: 125_000,
            spreading_factor: 7,
            coding_rate_denom: 5,
            tx_power_dbm: 17,
            pa_boost: true,
            crc_enabled: true,
        }
    }
}

/// Bounds for the transmit-done wait in [`Radio::send`](crate::Radio::send)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxTiming {
    /// Delay between two reads of the IRQ flags register
    pub poll_interval_ms: u32,
    /// Give up and report a timeout after this long
    pub timeout_ms: u32,
}

impl Default for TxTiming {
    /// 10 ms polling, 12 s limit (a 255 byte SF12 / 125 kHz packet is on air
    /// for a little under 10 s)
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            timeout_ms: 12_000,
        }
    }
}

/// Power amplifier register values for one output power request
#[derive(Debug, Clone, Copy)]
pub struct PaSettings {
    /// PA DAC value to write, `None` when the DAC is left alone (RFO path)
    pub dac: Option<PaDac>,
    /// PA config value to write
    pub config: PaConfig,
    /// Output power after forcing and clamping
    pub effective_dbm: i8,
}

/// Synthesizer word for `hz`: `round(hz / FSTEP_HZ)`, truncated to 24 bits.
///
/// There is no band check; out of range values program whatever word the
/// arithmetic yields. Negative and NaN inputs produce 0.
pub fn frf_from_hz(hz: f64) -> u32 {
    let steps = hz / FSTEP_HZ + 0.5;
    ((steps as u64) & 0x00FF_FFFF) as u32
}

/// Bandwidth register code: index of the first table entry at or above `hz`,
/// or [`OVERSIZE_BANDWIDTH_CODE`] if there is none.
pub fn bandwidth_code(hz: u32) -> u8 {
    BANDWIDTHS_HZ
        .iter()
        .position(|&bw| hz <= bw)
        .map_or(OVERSIZE_BANDWIDTH_CODE, |i| i as u8)
}

/// Rejects spreading factors outside 6..=12.
pub fn check_spreading_factor(sf: u8) -> Result<u8, ConfigError> {
    if SPREADING_FACTORS.contains(&sf) {
        Ok(sf)
    } else {
        Err(ConfigError::SpreadingFactorOutOfRange(sf))
    }
}

/// Detection optimize and threshold values for a (valid) spreading factor.
///
/// SF6 needs its own pair (datasheet section 4.1.1.2); SF7..12 share one.
pub fn detection_settings(sf: u8) -> (DetectionOptimize, DetectionThreshold) {
    if sf == 6 {
        (
            DetectionOptimize { value: 0xC5 },
            DetectionThreshold { value: 0x0C },
        )
    } else {
        (
            DetectionOptimize { value: 0xC3 },
            DetectionThreshold { value: 0x0A },
        )
    }
}

/// Coding rate denominator clamped to 5..=8
pub fn clamp_coding_rate(denom: u8) -> u8 {
    denom.clamp(5, 8)
}

/// Coding rate register code for a denominator, clamped to 5..=8 first
pub fn coding_rate_code(denom: u8) -> u8 {
    clamp_coding_rate(denom) - 4
}

/// PA register values for an output power request.
///
/// With PA_BOOST, anything above 17 dBm is forced to 20 dBm with the high
/// power DAC; the result is clamped to 2..=20 and encoded as
/// `0x80 | (dbm - 2)`. Without it, power is clamped to 0..=14 and encoded as
/// `0x70 | dbm`.
pub fn pa_settings(dbm: i8, use_boost: bool) -> PaSettings {
    if use_boost {
        let (dac, dbm) = if dbm > 17 {
            (PaDac::HighPower, 20)
        } else {
            (PaDac::Default, dbm)
        };
        let dbm = dbm.clamp(2, 20);
        PaSettings {
            dac: Some(dac),
            config: PaConfig::from_byte(0x80 | (dbm - 2) as u8),
            effective_dbm: dbm,
        }
    } else {
        let dbm = dbm.clamp(0, 14);
        PaSettings {
            dac: None,
            config: PaConfig::from_byte(0x70 | dbm as u8),
            effective_dbm: dbm,
        }
    }
}
