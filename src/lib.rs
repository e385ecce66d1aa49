#![no_std]
//! SX127x LoRa Radio Driver
//!
//! This crate turns a Semtech SX1276/77/78/79 transceiver, attached through
//! an SPI bus and three control lines, into a half-duplex LoRa packet radio.
//!
//! # Features
//! - Frequency, bandwidth, spreading factor, coding rate and output power
//!   configuration in engineering units
//! - Bounded, blocking (or async) transmission of up to 255 bytes
//! - Interrupt driven reception with a single-slot, interrupt safe mailbox
//! - RSSI, SNR and CRC outcome reporting
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: the register bus
//!   - Chip-select framed single-byte register reads and writes
//!   - Typed register access built on `regiface`
//!
//! - [`registers`]: Register definitions for LoRa mode
//!
//! - [`config`]: [`RadioConfig`], [`TxTiming`] and the pure unit to register
//!   encodings
//!
//! - [`radio`]: the [`Radio`] façade
//!   - [`radio::mode`]: operating mode transitions
//!   - [`radio::configure`]: setters
//!   - [`radio::transmit`]: send path
//!   - [`radio::receive`]: DIO0 capture routine and packet retrieval
//!
//! - [`packet`]: received packet types and the [`Mailbox`]
//!
//! # Usage
//! Construct a [`Radio`] with the bus, pins and a delay. Construction resets
//! the chip, checks its version and applies [`RadioConfig::default`]
//! (915 MHz, 125 kHz, SF7, CR 4/5, 17 dBm on PA_BOOST, CRC on), leaving the
//! radio in ReceiveContinuous with RxDone routed to DIO0.
//!
//! Run [`Radio::on_data_ready`] from the DIO0 rising edge interrupt (or use
//! [`Radio::poll_data_ready`] / [`Radio::wait_for_data_ready_async`]), then
//! collect packets with [`Radio::get_packet`].
//!
//! The capture routine takes `&mut Radio`, so a radio shared between the
//! interrupt handler and the main loop has to live behind a lock of its own,
//! e.g. a `critical_section::Mutex<RefCell<Option<Radio<..>>>>` that both
//! sides borrow inside `critical_section::with`. The internal [`Mailbox`] only
//! orders the packet hand-off within the driver; it does not make the
//! [`Radio`] itself shareable.
//!
//! # Important Notes
//! - Configure in Sleep or Standby
//! - Only one received packet is buffered; a newer one replaces it
//! - Packets failing their CRC are dropped; [`Radio::has_crc_error`] reports it
//!
//! # Example
//! ```no_run
//! use embedded_hal::{delay::DelayNs, digital::{InputPin, OutputPin}, spi::SpiBus};
//! use sx127x::{InitError, Radio};
//!
//! fn bring_up<SPI, CS, RST, DIO0, D>(
//!     spi: SPI, cs: CS, reset: RST, dio0: DIO0, delay: D,
//! ) -> Result<(), InitError>
//! where
//!     SPI: SpiBus, CS: OutputPin, RST: OutputPin, DIO0: InputPin, D: DelayNs,
//! {
//!     let mut radio = Radio::new(spi, cs, reset, dio0, delay)?;
//!     radio.send(b"hello").ok();
//!
//!     if let Some(packet) = radio.get_packet(true, false) {
//!         let _ = (packet.payload, packet.rssi_dbm);
//!     }
//!     Ok(())
//! }
//! ```

#[macro_use]
mod fmt;

pub use regiface::errors::Error;

pub mod config;
pub mod device;
pub mod error;
pub mod packet;
pub mod radio;
pub mod registers;

pub use config::{RadioConfig, TxTiming};
pub use device::Device;
pub use error::{ConfigError, InitError, TransmitError};
pub use packet::{Mailbox, Packet, Payload, ReceivedPacket};
pub use radio::{Radio, RxEvent};
pub use registers::OperatingMode;
