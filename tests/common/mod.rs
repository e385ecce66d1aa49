//! Simulated SX127x for integration tests
//!
//! `Chip` models the register file, the FIFO with its auto-incrementing
//! address pointer, write-one-to-clear IRQ flags and the DIO0 line. The fake
//! bus, pins and delay share one chip through `Rc<RefCell<_>>`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi::{self, SpiBus};
use sx127x::Radio;

pub const REG_FIFO: u8 = 0x00;
pub const REG_OP_MODE: u8 = 0x01;
pub const REG_FRF_MSB: u8 = 0x06;
pub const REG_FRF_MID: u8 = 0x07;
pub const REG_FRF_LSB: u8 = 0x08;
pub const REG_PA_CONFIG: u8 = 0x09;
pub const REG_LNA: u8 = 0x0C;
pub const REG_FIFO_ADDR_PTR: u8 = 0x0D;
pub const REG_FIFO_TX_BASE: u8 = 0x0E;
pub const REG_FIFO_RX_BASE: u8 = 0x0F;
pub const REG_FIFO_RX_CURRENT: u8 = 0x10;
pub const REG_IRQ_FLAGS: u8 = 0x12;
pub const REG_RX_NB_BYTES: u8 = 0x13;
pub const REG_RSSI: u8 = 0x1A;
pub const REG_PKT_SNR: u8 = 0x19;
pub const REG_MODEM_CONFIG_1: u8 = 0x1D;
pub const REG_MODEM_CONFIG_2: u8 = 0x1E;
pub const REG_PREAMBLE_MSB: u8 = 0x20;
pub const REG_PREAMBLE_LSB: u8 = 0x21;
pub const REG_PAYLOAD_LENGTH: u8 = 0x22;
pub const REG_MODEM_CONFIG_3: u8 = 0x26;
pub const REG_DETECTION_OPTIMIZE: u8 = 0x31;
pub const REG_DETECTION_THRESHOLD: u8 = 0x37;
pub const REG_SYNC_WORD: u8 = 0x39;
pub const REG_DIO_MAPPING_1: u8 = 0x40;
pub const REG_VERSION: u8 = 0x42;
pub const REG_PA_DAC: u8 = 0x4D;

pub const IRQ_RX_DONE: u8 = 0x40;
pub const IRQ_CRC_ERROR: u8 = 0x20;
pub const IRQ_TX_DONE: u8 = 0x08;

const MODE_MASK: u8 = 0x07;
const MODE_TX: u8 = 0x03;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Frame {
    Idle,
    Address,
    Write(u8),
    Read(u8),
}

pub struct Chip {
    pub regs: [u8; 128],
    pub fifo: [u8; 256],
    pub dio0: bool,
    pub cs_low: bool,
    frame: Frame,
    /// Every register write, in order, as (address, value)
    pub writes: Vec<(u8, u8)>,
    /// Levels driven on the reset line, in order
    pub reset_levels: Vec<bool>,
    /// Answers for version reads, consumed front first
    pub version_script: VecDeque<u8>,
    pub version_reads: usize,
    /// Payloads that left the antenna
    pub air: Vec<Vec<u8>>,
    /// IRQ flag reads in Transmit before TxDone is raised; `None` never raises
    pub tx_polls_until_done: Option<usize>,
    pending_tx: Option<usize>,
    /// IRQ flag reads after which the CRC error flag latches
    pub crc_latch_after_reads: Option<usize>,
    /// Every SPI transfer fails while set
    pub spi_fault: bool,
    pub delays_ms: Vec<u32>,
}

impl Chip {
    pub fn new() -> Self {
        let mut regs = [0u8; 128];
        regs[REG_OP_MODE as usize] = 0x09;
        regs[REG_LNA as usize] = 0x20;
        regs[REG_MODEM_CONFIG_1 as usize] = 0x72;
        regs[REG_MODEM_CONFIG_2 as usize] = 0x70;
        regs[REG_PREAMBLE_LSB as usize] = 0x08;
        regs[REG_PAYLOAD_LENGTH as usize] = 0x01;
        regs[REG_SYNC_WORD as usize] = 0x12;
        regs[REG_VERSION as usize] = 0x12;
        regs[REG_PA_DAC as usize] = 0x84;
        Self {
            regs,
            fifo: [0u8; 256],
            dio0: false,
            cs_low: false,
            frame: Frame::Idle,
            writes: Vec::new(),
            reset_levels: Vec::new(),
            version_script: VecDeque::new(),
            version_reads: 0,
            air: Vec::new(),
            tx_polls_until_done: Some(0),
            pending_tx: None,
            crc_latch_after_reads: None,
            spi_fault: false,
            delays_ms: Vec::new(),
        }
    }

    pub fn reg(&self, addr: u8) -> u8 {
        self.regs[addr as usize]
    }

    /// Last value written to `addr`, if any
    pub fn last_write(&self, addr: u8) -> Option<u8> {
        self.writes
            .iter()
            .rev()
            .find(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
    }

    pub fn writes_to(&self, addr: u8) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn frf(&self) -> u32 {
        u32::from_be_bytes([
            0,
            self.reg(REG_FRF_MSB),
            self.reg(REG_FRF_MID),
            self.reg(REG_FRF_LSB),
        ])
    }

    /// Lands `payload` in the FIFO the way the demodulator does and raises DIO0.
    pub fn receive(&mut self, payload: &[u8], rssi_raw: u8) {
        let base = self.reg(REG_FIFO_RX_BASE);
        for (i, byte) in payload.iter().enumerate() {
            self.fifo[base.wrapping_add(i as u8) as usize] = *byte;
        }
        self.regs[REG_FIFO_RX_CURRENT as usize] = base;
        self.regs[REG_RX_NB_BYTES as usize] = payload.len() as u8;
        self.regs[REG_RSSI as usize] = rssi_raw;
        self.regs[REG_IRQ_FLAGS as usize] |= IRQ_RX_DONE;
        self.dio0 = true;
    }

    /// A packet whose payload CRC failed
    pub fn receive_corrupt(&mut self, payload: &[u8]) {
        self.receive(payload, 0);
        self.regs[REG_IRQ_FLAGS as usize] |= IRQ_CRC_ERROR;
    }

    /// DIO0 follows RxDone; drop it once the flags were cleared
    pub fn settle_dio0(&mut self) {
        self.dio0 = self.reg(REG_IRQ_FLAGS) & IRQ_RX_DONE != 0;
    }

    fn write_reg(&mut self, addr: u8, value: u8) {
        self.writes.push((addr, value));
        match addr {
            REG_FIFO => {
                let ptr = self.reg(REG_FIFO_ADDR_PTR);
                self.fifo[ptr as usize] = value;
                self.regs[REG_FIFO_ADDR_PTR as usize] = ptr.wrapping_add(1);
            }
            REG_IRQ_FLAGS => self.regs[addr as usize] &= !value,
            REG_OP_MODE => {
                self.regs[addr as usize] = value;
                if value & MODE_MASK == MODE_TX {
                    self.start_tx();
                }
            }
            _ => self.regs[addr as usize] = value,
        }
    }

    fn read_reg(&mut self, addr: u8) -> u8 {
        match addr {
            REG_FIFO => {
                let ptr = self.reg(REG_FIFO_ADDR_PTR);
                self.regs[REG_FIFO_ADDR_PTR as usize] = ptr.wrapping_add(1);
                self.fifo[ptr as usize]
            }
            REG_VERSION => {
                self.version_reads += 1;
                self.version_script
                    .pop_front()
                    .unwrap_or(self.reg(REG_VERSION))
            }
            REG_IRQ_FLAGS => {
                if let Some(remaining) = self.pending_tx {
                    if remaining == 0 {
                        self.finish_tx();
                    } else {
                        self.pending_tx = Some(remaining - 1);
                    }
                }
                let flags = self.reg(REG_IRQ_FLAGS);
                if let Some(reads) = self.crc_latch_after_reads {
                    if reads <= 1 {
                        self.crc_latch_after_reads = None;
                        self.regs[REG_IRQ_FLAGS as usize] |= IRQ_CRC_ERROR;
                    } else {
                        self.crc_latch_after_reads = Some(reads - 1);
                    }
                }
                flags
            }
            _ => self.reg(addr),
        }
    }

    fn start_tx(&mut self) {
        let base = self.reg(REG_FIFO_TX_BASE);
        let len = self.reg(REG_PAYLOAD_LENGTH);
        let payload = (0..len)
            .map(|i| self.fifo[base.wrapping_add(i) as usize])
            .collect();
        self.air.push(payload);
        self.pending_tx = self.tx_polls_until_done;
    }

    fn finish_tx(&mut self) {
        self.pending_tx = None;
        self.regs[REG_IRQ_FLAGS as usize] |= IRQ_TX_DONE;
        // falls back to standby
        self.regs[REG_OP_MODE as usize] = (self.reg(REG_OP_MODE) & !MODE_MASK) | 0x01;
    }
}

pub type SharedChip = Rc<RefCell<Chip>>;

pub struct FakeSpi(pub SharedChip);
pub struct FakeCs(pub SharedChip);
pub struct FakeReset(pub SharedChip);
pub struct FakeDio0(pub SharedChip);
pub struct FakeDelay(pub SharedChip);

#[derive(Debug)]
pub struct SpiFault;

impl spi::Error for SpiFault {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

impl spi::ErrorType for FakeSpi {
    type Error = SpiFault;
}

impl SpiBus for FakeSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), SpiFault> {
        let mut chip = self.0.borrow_mut();
        assert!(chip.cs_low, "SPI read with chip-select released");
        if chip.spi_fault {
            return Err(SpiFault);
        }
        for word in words.iter_mut() {
            let frame = chip.frame;
            match frame {
                Frame::Read(addr) => {
                    *word = chip.read_reg(addr);
                    if addr != REG_FIFO {
                        chip.frame = Frame::Read(addr.wrapping_add(1));
                    }
                }
                other => panic!("read clocked in during {other:?}"),
            }
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), SpiFault> {
        let mut chip = self.0.borrow_mut();
        assert!(chip.cs_low, "SPI write with chip-select released");
        if chip.spi_fault {
            return Err(SpiFault);
        }
        for &word in words {
            let frame = chip.frame;
            match frame {
                Frame::Address => {
                    chip.frame = if word & 0x80 != 0 {
                        Frame::Write(word & 0x7F)
                    } else {
                        Frame::Read(word)
                    };
                }
                Frame::Write(addr) => {
                    chip.write_reg(addr, word);
                    if addr != REG_FIFO {
                        chip.frame = Frame::Write(addr.wrapping_add(1));
                    }
                }
                other => panic!("byte {word:#04x} written during {other:?}"),
            }
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), SpiFault> {
        self.write(write)?;
        self.read(read)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), SpiFault> {
        let (first, rest) = words.split_at_mut(1);
        self.write(first)?;
        self.read(rest)
    }

    fn flush(&mut self) -> Result<(), SpiFault> {
        Ok(())
    }
}

impl digital::ErrorType for FakeCs {
    type Error = Infallible;
}

impl OutputPin for FakeCs {
    fn set_low(&mut self) -> Result<(), Infallible> {
        let mut chip = self.0.borrow_mut();
        assert!(!chip.cs_low, "chip-select asserted twice");
        chip.cs_low = true;
        chip.frame = Frame::Address;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        let mut chip = self.0.borrow_mut();
        chip.cs_low = false;
        chip.frame = Frame::Idle;
        Ok(())
    }
}

impl digital::ErrorType for FakeReset {
    type Error = Infallible;
}

impl OutputPin for FakeReset {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().reset_levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().reset_levels.push(true);
        Ok(())
    }
}

impl digital::ErrorType for FakeDio0 {
    type Error = Infallible;
}

impl InputPin for FakeDio0 {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.borrow().dio0)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.borrow().dio0)
    }
}

/// Edges are taken as having already happened; tests raise them beforehand.
impl embedded_hal_async::digital::Wait for FakeDio0 {
    async fn wait_for_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    async fn wait_for_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().delays_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().delays_ms.push(ms);
    }
}

impl embedded_hal_async::delay::DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().delays_ms.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().delays_ms.push(ms);
    }
}

pub type TestRadio = Radio<FakeSpi, FakeCs, FakeReset, FakeDio0, FakeDelay>;

pub fn parts(chip: &SharedChip) -> (FakeSpi, FakeCs, FakeReset, FakeDio0, FakeDelay) {
    (
        FakeSpi(chip.clone()),
        FakeCs(chip.clone()),
        FakeReset(chip.clone()),
        FakeDio0(chip.clone()),
        FakeDelay(chip.clone()),
    )
}

/// A chip and a radio initialized on it with the default configuration
pub fn radio() -> (TestRadio, SharedChip) {
    radio_on(Chip::new())
}

pub fn radio_on(chip: Chip) -> (TestRadio, SharedChip) {
    let chip = Rc::new(RefCell::new(chip));
    let (spi, cs, reset, dio0, delay) = parts(&chip);
    let radio = Radio::new(spi, cs, reset, dio0, delay).expect("init");
    chip.borrow_mut().writes.clear();
    chip.borrow_mut().delays_ms.clear();
    (radio, chip)
}
