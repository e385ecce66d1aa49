//! Register bus framing against embedded-hal-mock

use embedded_hal::spi::{self, SpiBus};
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
use sx127x::registers::{Frequency, ModemConfig2, PacketSnr, PreambleLength, Version};
use sx127x::{Device, Error};

fn frames(n: usize) -> Vec<PinTransaction> {
    (0..n)
        .flat_map(|_| {
            [
                PinTransaction::set(State::Low),
                PinTransaction::set(State::High),
            ]
        })
        .collect()
}

fn write_frame(addr: u8, value: u8) -> [SpiTransaction<u8>; 2] {
    [
        SpiTransaction::write_vec(vec![addr | 0x80, value]),
        SpiTransaction::flush(),
    ]
}

fn read_frame(addr: u8, value: u8) -> [SpiTransaction<u8>; 3] {
    [
        SpiTransaction::write(addr & 0x7F),
        SpiTransaction::read(value),
        SpiTransaction::flush(),
    ]
}

#[test]
fn write_byte_sends_two_byte_frame() {
    let mut spi = SpiMock::new(&write_frame(0x39, 0x34));
    let mut cs = PinMock::new(&frames(1));

    let mut device = Device::new(spi.clone(), cs.clone());
    device.write_byte(0x39, 0x34).unwrap();

    spi.done();
    cs.done();
}

#[test]
fn read_byte_masks_address() {
    let mut spi = SpiMock::new(&read_frame(0x42, 0x12));
    let mut cs = PinMock::new(&frames(1));

    let mut device = Device::new(spi.clone(), cs.clone());
    // the write flag never leaks into a read frame
    assert_eq!(device.read_byte(0xC2).unwrap(), 0x12);

    spi.done();
    cs.done();
}

#[test]
fn frequency_is_three_frames_msb_first() {
    let expectations: Vec<_> = [(0x06, 0xE4), (0x07, 0xC0), (0x08, 0x00)]
        .into_iter()
        .flat_map(|(addr, value)| write_frame(addr, value))
        .collect();
    let mut spi = SpiMock::new(&expectations);
    let mut cs = PinMock::new(&frames(3));

    let mut device = Device::new(spi.clone(), cs.clone());
    device.write_register(Frequency { frf: 0xE4_C000 }).unwrap();

    spi.done();
    cs.done();
}

#[test]
fn typed_read_decodes() {
    let mut spi = SpiMock::new(&read_frame(0x42, 0x12));
    let mut cs = PinMock::new(&frames(1));

    let mut device = Device::new(spi.clone(), cs.clone());
    let version: Version = device.read_register().unwrap();
    assert_eq!(version.value, 0x12);

    spi.done();
    cs.done();
}

#[test]
fn preamble_reads_two_frames() {
    let expectations: Vec<_> = [(0x20, 0x01), (0x21, 0x02)]
        .into_iter()
        .flat_map(|(addr, value)| read_frame(addr, value))
        .collect();
    let mut spi = SpiMock::new(&expectations);
    let mut cs = PinMock::new(&frames(2));

    let mut device = Device::new(spi.clone(), cs.clone());
    let preamble: PreambleLength = device.read_register().unwrap();
    assert_eq!(preamble.symbols, 0x0102);

    spi.done();
    cs.done();
}

#[test]
fn modify_keeps_other_fields() {
    let mut expectations = read_frame(0x1E, 0x73).to_vec();
    expectations.extend(write_frame(0x1E, 0x93));
    let mut spi = SpiMock::new(&expectations);
    let mut cs = PinMock::new(&frames(2));

    let mut device = Device::new(spi.clone(), cs.clone());
    device
        .modify_register(|reg: &mut ModemConfig2| reg.spreading_factor = 9)
        .unwrap();

    spi.done();
    cs.done();
}

#[test]
fn fifo_is_one_frame_per_byte() {
    let expectations: Vec<_> = [0xDE, 0xAD, 0xBE]
        .into_iter()
        .flat_map(|value| write_frame(0x00, value))
        .collect();
    let mut spi = SpiMock::new(&expectations);
    let mut cs = PinMock::new(&frames(3));

    let mut device = Device::new(spi.clone(), cs.clone());
    device.write_fifo(&[0xDE, 0xAD, 0xBE]).unwrap();

    spi.done();
    cs.done();
}

#[test]
fn release_returns_parts() {
    let mut spi = SpiMock::<u8>::new(&[]);
    let mut cs = PinMock::new(&[]);

    let device = Device::new(spi.clone(), cs.clone());
    let (_spi, _cs) = device.release();

    spi.done();
    cs.done();
}

#[test]
fn packet_snr_lives_at_0x19() {
    let mut spi = SpiMock::new(&read_frame(0x19, 0xF8));
    let mut cs = PinMock::new(&frames(1));

    let mut device = Device::new(spi.clone(), cs.clone());
    let snr: PacketSnr = device.read_register().unwrap();
    assert_eq!(snr.db(), -2);

    spi.done();
    cs.done();
}

#[derive(Debug)]
struct Fault;

impl spi::Error for Fault {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

/// A bus whose every transfer fails
struct DeadBus;

impl spi::ErrorType for DeadBus {
    type Error = Fault;
}

impl SpiBus for DeadBus {
    fn read(&mut self, _words: &mut [u8]) -> Result<(), Fault> {
        Err(Fault)
    }

    fn write(&mut self, _words: &[u8]) -> Result<(), Fault> {
        Err(Fault)
    }

    fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), Fault> {
        Err(Fault)
    }

    fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Fault> {
        Err(Fault)
    }

    fn flush(&mut self) -> Result<(), Fault> {
        Ok(())
    }
}

#[test]
fn failed_write_still_releases_chip_select() {
    let mut cs = PinMock::new(&frames(1));

    let mut device = Device::new(DeadBus, cs.clone());
    assert!(matches!(device.write_byte(0x39, 0x34), Err(Error::BusError)));

    cs.done();
}

#[test]
fn failed_read_still_releases_chip_select() {
    let mut cs = PinMock::new(&frames(1));

    let mut device = Device::new(DeadBus, cs.clone());
    assert!(matches!(device.read_byte(0x42), Err(Error::BusError)));

    cs.done();
}

#[test]
fn failed_typed_read_stops_at_first_frame() {
    let mut cs = PinMock::new(&frames(1));

    let mut device = Device::new(DeadBus, cs.clone());
    let result: Result<Frequency, _> = device.read_register();
    assert!(matches!(result, Err(Error::BusError)));

    cs.done();
}
