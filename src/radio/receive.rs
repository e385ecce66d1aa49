//! Receive path
//!
//! [`Radio::on_data_ready`] is the capture routine for the DIO0 rising edge.
//! It only performs register transactions and never waits. A good packet is
//! read completely (payload, then RSSI) before it is posted to the mailbox in
//! one critical section; a CRC failure only sets the sticky CRC indicator.
//!
//! The host side ([`Radio::is_packet_received`], [`Radio::get_packet`],
//! [`Radio::has_crc_error`]) only looks at the mailbox and takes `&self`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;
use embedded_hal_async::digital::Wait;
use regiface::errors::Error as RegifaceError;

use super::Radio;
use crate::config::MAX_PAYLOAD_LEN;
use crate::packet::{Packet, ReceivedPacket};
use crate::registers::{
    FifoAddrPtr, FifoRxCurrentAddr, IrqFlags, IrqStatus, PacketRssi, RxNbBytes,
};

/// Outcome of one run of the capture routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxEvent {
    /// A packet was captured and posted to the mailbox
    Received,
    /// The payload failed its CRC; nothing was posted
    CrcError,
    /// Neither RxDone nor a CRC error was pending
    Spurious,
}

impl<SPI, CS, RESET, DIO0, D> Radio<SPI, CS, RESET, DIO0, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RESET: OutputPin,
    DIO0: InputPin,
    D: DelayNs,
{
    /// Capture routine, to be run on every DIO0 rising edge.
    pub fn on_data_ready(&mut self) -> Result<RxEvent, RegifaceError> {
        let flags = self.device.read_register::<IrqStatus>()?.flags;

        if flags.contains(IrqFlags::PAYLOAD_CRC_ERROR) {
            warn!("payload CRC error");
            self.mailbox.post_crc_error();
            self.device
                .write_register(IrqStatus::clear(IrqFlags::PAYLOAD_CRC_ERROR))?;
            return Ok(RxEvent::CrcError);
        }

        if !flags.contains(IrqFlags::RX_DONE) {
            trace!("spurious DIO0 edge, flags {}", flags);
            return Ok(RxEvent::Spurious);
        }

        // CRC error may have been latched since the first read
        let recheck = self.device.read_register::<IrqStatus>()?.flags;
        let event = if recheck.contains(IrqFlags::PAYLOAD_CRC_ERROR) {
            warn!("payload CRC error after RxDone");
            self.mailbox.post_crc_error();
            RxEvent::CrcError
        } else {
            let packet = self.read_packet()?;
            debug!(
                "rx {=usize} bytes, rssi {=i16} dBm",
                packet.payload.len(),
                packet.rssi_dbm
            );
            if self.mailbox.post(packet) {
                debug!("unretrieved packet overwritten");
            }
            RxEvent::Received
        };

        self.device
            .write_register(IrqStatus::clear(IrqFlags::RX_DONE))?;
        self.device.write_register(IrqStatus::clear_all())?;
        Ok(event)
    }

    /// Samples DIO0 and runs the capture routine on a low to high transition.
    ///
    /// For hosts without an edge interrupt; call it often enough not to miss
    /// a low phase between packets.
    pub fn poll_data_ready(&mut self) -> Result<Option<RxEvent>, RegifaceError> {
        let high = self.dio0.is_high().map_err(|_| RegifaceError::BusError)?;
        let rising = high && !self.dio0_was_high;
        self.dio0_was_high = high;

        if rising {
            self.on_data_ready().map(Some)
        } else {
            Ok(None)
        }
    }

    fn read_packet(&mut self) -> Result<ReceivedPacket, RegifaceError> {
        let start = self.device.read_register::<FifoRxCurrentAddr>()?.address;
        self.device.write_register(FifoAddrPtr { address: start })?;

        let count = usize::from(self.device.read_register::<RxNbBytes>()?.count);
        let mut buffer = [0u8; MAX_PAYLOAD_LEN];
        self.device.read_fifo(&mut buffer[..count])?;

        let rssi = self.device.read_register::<PacketRssi>()?;

        Ok(ReceivedPacket {
            payload: buffer[..count].iter().copied().collect(),
            rssi_dbm: rssi.dbm(),
            crc_error: false,
        })
    }
}

impl<SPI, CS, RESET, DIO0, D> Radio<SPI, CS, RESET, DIO0, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RESET: OutputPin,
    DIO0: InputPin + Wait,
    D: DelayNs,
{
    /// Waits for the next DIO0 rising edge, then runs the capture routine.
    pub async fn wait_for_data_ready_async(&mut self) -> Result<RxEvent, RegifaceError> {
        self.dio0
            .wait_for_rising_edge()
            .await
            .map_err(|_| RegifaceError::BusError)?;
        self.on_data_ready()
    }
}

impl<SPI, CS, RESET, DIO0, D> Radio<SPI, CS, RESET, DIO0, D> {
    /// Whether a packet is waiting in the mailbox
    pub fn is_packet_received(&self) -> bool {
        self.mailbox.has_packet()
    }

    /// Takes the waiting packet, if any. The mailbox is empty afterwards.
    ///
    /// # Arguments
    /// * `include_rssi` - fill in [`Packet::rssi_dbm`]
    /// * `include_crc_info` - fill in [`Packet::crc_error`] with the sticky
    ///   CRC indicator
    pub fn get_packet(&self, include_rssi: bool, include_crc_info: bool) -> Option<Packet> {
        let (packet, crc_error) = self.mailbox.take()?;
        Some(Packet {
            payload: packet.payload,
            rssi_dbm: include_rssi.then_some(packet.rssi_dbm),
            crc_error: include_crc_info.then_some(crc_error),
        })
    }

    /// Whether the most recent reception attempt failed its CRC
    pub fn has_crc_error(&self) -> bool {
        self.mailbox.crc_error()
    }
}
