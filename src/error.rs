//! Driver error types
//!
//! Bus failures surface as [`regiface::errors::Error`], the same type the
//! register layer returns. The driver-level enums below wrap it so that `?`
//! lifts a bus failure into whichever operation was in flight.

use regiface::errors::Error as RegifaceError;

/// Errors raised while constructing and initializing a [`Radio`](crate::Radio).
///
/// Any of these leaves the handle unusable; discard it and construct a new one.
#[derive(Debug)]
pub enum InitError {
    /// SPI or chip-select failure
    Bus(RegifaceError),
    /// The reset line could not be driven
    Reset,
    /// The version register did not report the SX127x silicon identifier.
    /// Carries the value that was read back.
    UnexpectedVersion(u8),
    /// A caller supplied [`RadioConfig`](crate::RadioConfig) was rejected
    InvalidConfig(ConfigError),
}

/// Errors raised by configuration setters.
#[derive(Debug)]
pub enum ConfigError {
    /// SPI or chip-select failure
    Bus(RegifaceError),
    /// Spreading factor outside 6..=12. Nothing was written to the device.
    SpreadingFactorOutOfRange(u8),
}

/// Errors raised by the transmit path.
#[derive(Debug)]
pub enum TransmitError {
    /// SPI or chip-select failure
    Bus(RegifaceError),
    /// Payload longer than the 255 byte FIFO/length field.
    /// Carries the rejected length; nothing was written to the device.
    PayloadTooLarge(usize),
    /// The transmit-done flag never appeared within the configured bound
    Timeout,
}

impl From<RegifaceError> for InitError {
    fn from(err: RegifaceError) -> Self {
        Self::Bus(err)
    }
}

impl From<RegifaceError> for ConfigError {
    fn from(err: RegifaceError) -> Self {
        Self::Bus(err)
    }
}

impl From<RegifaceError> for TransmitError {
    fn from(err: RegifaceError) -> Self {
        Self::Bus(err)
    }
}

impl From<ConfigError> for InitError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Bus(err) => Self::Bus(err),
            other => Self::InvalidConfig(other),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InitError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bus(_) => defmt::write!(f, "InitError::Bus"),
            Self::Reset => defmt::write!(f, "InitError::Reset"),
            Self::UnexpectedVersion(v) => {
                defmt::write!(f, "InitError::UnexpectedVersion({=u8:#04x})", v)
            }
            Self::InvalidConfig(err) => defmt::write!(f, "InitError::InvalidConfig({})", err),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bus(_) => defmt::write!(f, "ConfigError::Bus"),
            Self::SpreadingFactorOutOfRange(sf) => {
                defmt::write!(f, "ConfigError::SpreadingFactorOutOfRange({=u8})", sf)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TransmitError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bus(_) => defmt::write!(f, "TransmitError::Bus"),
            Self::PayloadTooLarge(len) => {
                defmt::write!(f, "TransmitError::PayloadTooLarge({=usize})", len)
            }
            Self::Timeout => defmt::write!(f, "TransmitError::Timeout"),
        }
    }
}
