//! SX127x LoRa radio
//!
//! [`Radio`] composes the register bus, the control lines and the received
//! packet [`Mailbox`] into a half-duplex packet radio:
//!
//! - [`mode`]: operating mode transitions
//! - [`configure`]: modulation and output power setters
//! - [`transmit`]: the blocking, bounded send path
//! - [`receive`]: the DIO0-triggered capture path and the host-side queries
//!
//! By default the radio sits in ReceiveContinuous; every transmission returns
//! there once the packet is out.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;
use regiface::errors::Error as RegifaceError;

use crate::config::{check_spreading_factor, RadioConfig, TxTiming};
use crate::device::Device;
use crate::error::InitError;
use crate::packet::Mailbox;
use crate::registers::{
    DioMapping1, FifoRxBaseAddr, FifoTxBaseAddr, Lna, ModemConfig3, OperatingMode, PacketRssi,
    PacketSnr, Version, SX127X_VERSION,
};

pub mod configure;
pub mod mode;
pub mod receive;
pub mod transmit;

pub use receive::RxEvent;

/// How long the reset line is held low, and how long to wait after release
const RESET_HOLD_MS: u32 = 10;

/// Version register reads before giving up on a non-zero answer
const VERSION_ATTEMPTS: usize = 5;

/// FIFO offset where transmit payloads are loaded
pub(crate) const FIFO_TX_BASE: u8 = 0x00;

/// FIFO offset where received payloads land
pub(crate) const FIFO_RX_BASE: u8 = 0x00;

/// SX127x LoRa radio driver.
///
/// Generic over the SPI bus, chip-select, reset and DIO0 pins and a delay
/// provider.
pub struct Radio<SPI, CS, RESET, DIO0, D> {
    device: Device<SPI, CS>,
    reset: RESET,
    dio0: DIO0,
    delay: D,
    config: RadioConfig,
    tx_timing: TxTiming,
    mode: OperatingMode,
    dio0_was_high: bool,
    mailbox: Mailbox,
}

impl<SPI, CS, RESET, DIO0, D> Radio<SPI, CS, RESET, DIO0, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RESET: OutputPin,
    DIO0: InputPin,
    D: DelayNs,
{
    /// Resets and initializes the radio with [`RadioConfig::default`].
    ///
    /// # Arguments
    /// * `spi` - SPI bus the radio is on
    /// * `cs` - chip-select (NSS) output
    /// * `reset` - reset (NRESET) output
    /// * `dio0` - DIO0 input, signals RxDone
    /// * `delay` - delay provider for the reset pulse and transmit polling
    ///
    /// # Errors
    /// * `InitError::UnexpectedVersion` - no SX127x answered
    /// * `InitError::Reset` - the reset line could not be driven
    /// * `InitError::Bus` - SPI or chip-select failure
    pub fn new(spi: SPI, cs: CS, reset: RESET, dio0: DIO0, delay: D) -> Result<Self, InitError> {
        Self::with_config(spi, cs, reset, dio0, delay, RadioConfig::default())
    }

    /// Resets and initializes the radio with `config`.
    ///
    /// The spreading factor is checked before the device is touched.
    pub fn with_config(
        spi: SPI,
        cs: CS,
        reset: RESET,
        dio0: DIO0,
        delay: D,
        config: RadioConfig,
    ) -> Result<Self, InitError> {
        check_spreading_factor(config.spreading_factor)?;

        let mut radio = Self {
            device: Device::new(spi, cs),
            reset,
            dio0,
            delay,
            config,
            tx_timing: TxTiming::default(),
            mode: OperatingMode::Standby,
            dio0_was_high: false,
            mailbox: Mailbox::new(),
        };
        radio.init()?;
        Ok(radio)
    }

    /// Runs the reset and init sequence again with the current configuration.
    ///
    /// Any unretrieved packet stays in the mailbox.
    pub fn reinitialize(&mut self) -> Result<(), InitError> {
        self.init()
    }

    fn init(&mut self) -> Result<(), InitError> {
        self.device.deselect()?;
        self.reset()?;

        let version = self.probe_version()?;
        debug!("SX127x version: {=u8:#04x}", version);
        if version != SX127X_VERSION {
            warn!("unexpected SX127x version {=u8:#04x}", version);
            return Err(InitError::UnexpectedVersion(version));
        }

        self.sleep()?;
        self.apply_config(self.config)?;

        self.device
            .write_register(FifoTxBaseAddr { address: FIFO_TX_BASE })?;
        self.device
            .write_register(FifoRxBaseAddr { address: FIFO_RX_BASE })?;
        self.device
            .modify_register(|lna: &mut Lna| lna.boost_hf = Lna::BOOST_HF_ON)?;
        self.device.write_register(ModemConfig3::default())?;

        self.standby()?;
        self.receive_continuous()?;
        self.device.write_register(DioMapping1::rx_done())?;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), InitError> {
        self.reset.set_low().map_err(|_| InitError::Reset)?;
        self.delay.delay_ms(RESET_HOLD_MS);
        self.reset.set_high().map_err(|_| InitError::Reset)?;
        self.delay.delay_ms(RESET_HOLD_MS);
        Ok(())
    }

    /// First non-zero version answer, or zero after every attempt read zero
    fn probe_version(&mut self) -> Result<u8, RegifaceError> {
        let mut version = 0;
        for _ in 0..VERSION_ATTEMPTS {
            version = self.device.read_register::<Version>()?.value;
            if version != 0 {
                break;
            }
        }
        Ok(version)
    }

    /// Reads the silicon version register.
    pub fn version(&mut self) -> Result<u8, RegifaceError> {
        Ok(self.device.read_register::<Version>()?.value)
    }

    /// RSSI of the last received packet in dBm (`register - 157`).
    pub fn rssi(&mut self) -> Result<i16, RegifaceError> {
        Ok(self.device.read_register::<PacketRssi>()?.dbm())
    }

    /// SNR of the last received packet in dB.
    pub fn packet_snr(&mut self) -> Result<i8, RegifaceError> {
        Ok(self.device.read_register::<PacketSnr>()?.db())
    }
}

impl<SPI, CS, RESET, DIO0, D> Radio<SPI, CS, RESET, DIO0, D> {
    /// The configuration as last written to the device
    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    /// Bounds used by the transmit-done wait
    pub fn tx_timing(&self) -> TxTiming {
        self.tx_timing
    }

    /// Replaces the bounds used by the transmit-done wait
    pub fn set_tx_timing(&mut self, timing: TxTiming) {
        self.tx_timing = timing;
    }

    /// Releases the bus, the pins and the delay provider.
    pub fn release(self) -> (SPI, CS, RESET, DIO0, D) {
        let (spi, cs) = self.device.release();
        (spi, cs, self.reset, self.dio0, self.delay)
    }
}
