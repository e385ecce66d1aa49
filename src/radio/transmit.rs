//! Transmit path
//!
//! A send loads the payload into the FIFO from Standby, enters Transmit and
//! polls the IRQ flags until TxDone, at the interval and up to the limit in
//! [`TxTiming`](crate::TxTiming). The radio always ends up back in
//! ReceiveContinuous, also after a timeout.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;
use regiface::errors::Error as RegifaceError;

use super::{Radio, FIFO_TX_BASE};
use crate::config::MAX_PAYLOAD_LEN;
use crate::error::TransmitError;
use crate::registers::{FifoAddrPtr, IrqFlags, IrqStatus, OperatingMode, PayloadLength};

impl<SPI, CS, RESET, DIO0, D> Radio<SPI, CS, RESET, DIO0, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RESET: OutputPin,
    DIO0: InputPin,
    D: DelayNs,
{
    /// Transmits `data` and blocks until the packet is out.
    ///
    /// # Errors
    /// * `TransmitError::PayloadTooLarge` - more than 255 bytes, nothing written
    /// * `TransmitError::Timeout` - TxDone did not appear in time
    /// * `TransmitError::Bus` - SPI or chip-select failure
    pub fn send(&mut self, data: &[u8]) -> Result<(), TransmitError> {
        self.load_payload(data)?;

        let timing = self.tx_timing;
        let interval = timing.poll_interval_ms.max(1);
        let mut waited = 0u32;
        while !self.tx_done()? {
            if waited >= timing.timeout_ms {
                return self.abandon_transmit(waited);
            }
            self.delay.delay_ms(interval);
            waited = waited.saturating_add(interval);
        }

        self.finish_transmit()
    }

    /// Same as [`send`](Self::send), but yields to the executor between polls.
    pub async fn send_async<A>(&mut self, data: &[u8], delay: &mut A) -> Result<(), TransmitError>
    where
        A: embedded_hal_async::delay::DelayNs,
    {
        self.load_payload(data)?;

        let timing = self.tx_timing;
        let interval = timing.poll_interval_ms.max(1);
        let mut waited = 0u32;
        while !self.tx_done()? {
            if waited >= timing.timeout_ms {
                return self.abandon_transmit(waited);
            }
            delay.delay_ms(interval).await;
            waited = waited.saturating_add(interval);
        }

        self.finish_transmit()
    }

    fn load_payload(&mut self, data: &[u8]) -> Result<(), TransmitError> {
        if data.len() > MAX_PAYLOAD_LEN {
            return Err(TransmitError::PayloadTooLarge(data.len()));
        }

        self.standby()?;
        self.device
            .write_register(FifoAddrPtr { address: FIFO_TX_BASE })?;
        self.device.write_fifo(data)?;
        self.device.write_register(PayloadLength {
            length: data.len() as u8,
        })?;
        self.set_mode(OperatingMode::Transmit)?;

        debug!("tx {=usize} bytes", data.len());
        Ok(())
    }

    fn tx_done(&mut self) -> Result<bool, RegifaceError> {
        let status = self.device.read_register::<IrqStatus>()?;
        Ok(status.flags.contains(IrqFlags::TX_DONE))
    }

    fn finish_transmit(&mut self) -> Result<(), TransmitError> {
        self.device
            .write_register(IrqStatus::clear(IrqFlags::TX_DONE))?;
        self.receive_continuous()?;
        Ok(())
    }

    fn abandon_transmit(&mut self, waited_ms: u32) -> Result<(), TransmitError> {
        warn!("no TxDone after {=u32} ms", waited_ms);
        self.receive_continuous()?;
        Err(TransmitError::Timeout)
    }
}
