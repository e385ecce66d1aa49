//! Received packets and the interrupt-to-host hand-off
//!
//! The receive capture runs from the DIO0 edge handler and may preempt the
//! host at any point. It builds a complete [`ReceivedPacket`] before touching
//! shared state, then installs it in the [`Mailbox`] inside one critical
//! section. The host never observes a half-written slot.
//!
//! The mailbox holds one packet. A second packet arriving before the first
//! was taken replaces it.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::config::MAX_PAYLOAD_LEN;

/// Payload storage, sized for the largest LoRa packet
pub type Payload = heapless::Vec<u8, MAX_PAYLOAD_LEN>;

/// A packet captured by the receive path
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceivedPacket {
    /// Payload bytes as read from the FIFO
    pub payload: Payload,
    /// Signal strength at capture time, `register - 157`
    pub rssi_dbm: i16,
    /// Payload CRC outcome. Packets that failed the CRC are never delivered,
    /// so this is `false` for every packet handed out by the mailbox.
    pub crc_error: bool,
}

/// A packet as returned by [`Radio::get_packet`](crate::Radio::get_packet)
///
/// The optional fields are present only when requested.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    /// Payload bytes
    pub payload: Payload,
    /// Packet RSSI in dBm, when requested
    pub rssi_dbm: Option<i16>,
    /// The sticky CRC indicator at retrieval time
    pub crc_error: Option<bool>,
}

#[derive(Debug, Default)]
struct Slot {
    packet: Option<ReceivedPacket>,
    last_crc_error: bool,
}

/// Single-slot packet buffer shared between the capture routine and the host
///
/// Also carries the sticky CRC indicator, which describes the most recent
/// reception attempt regardless of whether it produced a packet.
pub struct Mailbox {
    slot: Mutex<RefCell<Slot>>,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(Slot {
                packet: None,
                last_crc_error: false,
            })),
        }
    }

    /// Installs a good packet, replacing any unretrieved one, and clears the
    /// sticky CRC indicator.
    ///
    /// Returns true when an unretrieved packet was overwritten.
    pub(crate) fn post(&self, packet: ReceivedPacket) -> bool {
        critical_section::with(|cs| {
            let mut slot = self.slot.borrow_ref_mut(cs);
            slot.last_crc_error = false;
            slot.packet.replace(packet).is_some()
        })
    }

    /// Records a CRC failure. The slot is left untouched.
    pub(crate) fn post_crc_error(&self) {
        critical_section::with(|cs| {
            self.slot.borrow_ref_mut(cs).last_crc_error = true;
        })
    }

    /// Whether a packet is waiting to be taken
    pub fn has_packet(&self) -> bool {
        critical_section::with(|cs| self.slot.borrow_ref(cs).packet.is_some())
    }

    /// The sticky CRC indicator
    pub fn crc_error(&self) -> bool {
        critical_section::with(|cs| self.slot.borrow_ref(cs).last_crc_error)
    }

    /// Removes and returns the waiting packet together with the sticky CRC
    /// indicator, read in the same critical section.
    pub fn take(&self) -> Option<(ReceivedPacket, bool)> {
        critical_section::with(|cs| {
            let mut slot = self.slot.borrow_ref_mut(cs);
            let crc_error = slot.last_crc_error;
            slot.packet.take().map(|packet| (packet, crc_error))
        })
    }
}
