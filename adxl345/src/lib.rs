#![cfg_attr(not(test), no_std)]

use bitbybit::{bitenum, bitfield};
use embedded_hal::spi::{self, Operation, SpiDevice};
use serde::{Deserialize, Serialize};

#[bitenum(u6)]
#[derive(Debug, PartialEq)]
pub enum Addr {
    DevId = 0x00,
    BwRate = 0x2c,
    PowerCtl = 0x2d,
    DataFormat = 0x31,
    DataX0 = 0x32,
    DataY0 = 0x34,
    DataZ0 = 0x36,
}

#[bitfield(u8)]
#[derive(Debug, PartialEq)]
pub struct Instruction {
    #[bits(0..=5, rw)]
    addr: Option<Addr>,
    #[bit(6, rw)]
    multi: bool,
    #[bit(7, rw)]
    read: bool,
}

pub const DEVID: u8 = 0xe5;

/// Measurement range.
#[bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Range {
    #[default]
    G2 = 0b00,
    G4 = 0b01,
    G8 = 0b10,
    G16 = 0b11,
}

/// Output data rate.
#[bitenum(u4, exhaustive = true)]
#[derive(Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataRate {
    Hz3200 = 0b1111,
    Hz1600 = 0b1110,
    Hz800 = 0b1101,
    Hz400 = 0b1100,
    Hz200 = 0b1011,
    #[default]
    Hz100 = 0b1010,
    Hz50 = 0b1001,
    Hz25 = 0b1000,
    Hz12_5 = 0b0111,
    Hz6_25 = 0b0110,
    Hz3_13 = 0b0101,
    Hz1_56 = 0b0100,
    Hz0_78 = 0b0011,
    Hz0_39 = 0b0010,
    Hz0_20 = 0b0001,
    Hz0_10 = 0b0000,
}

impl DataRate {
    /// Nominal output data rate in mHz.
    ///
    /// The rate doubles with each code, 3200 Hz at `0b1111`.
    pub fn millihertz(&self) -> u32 {
        3_200_000 >> (0b1111 - self.raw_value().value())
    }
}

#[bitfield(u8)]
#[derive(Debug, PartialEq)]
pub struct DataFormat {
    #[bits(0..=1, rw)]
    pub range: Range,
    /// Left justified (MSB) mode
    #[bit(2, rw)]
    pub justify: bool,
    /// Fixed 3.9 mg/LSB scale for all ranges
    #[bit(3, rw)]
    pub full_res: bool,
    #[bit(5, rw)]
    pub int_invert: bool,
    /// 3-wire SPI
    #[bit(6, rw)]
    pub spi3: bool,
    #[bit(7, rw)]
    pub self_test: bool,
}

#[bitfield(u8, default = 0x0a)]
#[derive(Debug, PartialEq)]
pub struct BwRate {
    #[bits(0..=3, rw)]
    pub rate: DataRate,
    #[bit(4, rw)]
    pub low_power: bool,
}

#[bitfield(u8, default = 0x00)]
#[derive(Debug, PartialEq)]
pub struct PowerCtl {
    #[bit(2, rw)]
    pub sleep: bool,
    #[bit(3, rw)]
    pub measure: bool,
    #[bit(4, rw)]
    pub auto_sleep: bool,
    #[bit(5, rw)]
    pub link: bool,
}

/// Axis to sample.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    pub fn addr(&self) -> Addr {
        match self {
            Self::X => Addr::DataX0,
            Self::Y => Addr::DataY0,
            Self::Z => Addr::DataZ0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid device ID {0:#04x}")]
    Id(u8),
    #[error("SPI {0}")]
    Bus(spi::ErrorKind),
}

impl<E: spi::Error> From<E> for Error {
    fn from(value: E) -> Self {
        Self::Bus(value.kind())
    }
}

#[derive(Clone, Debug)]
pub struct Adxl345<B> {
    bus: B,
}

impl<B: SpiDevice<u8>> Adxl345<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn release(self) -> B {
        self.bus
    }

    pub fn write_register(&mut self, addr: Addr, value: u8) -> Result<(), Error> {
        Ok(self.bus.write(&[
            Instruction::builder()
                .with_addr(addr)
                .with_multi(false)
                .with_read(false)
                .build()
                .raw_value(),
            value,
        ])?)
    }

    pub fn read_register(&mut self, addr: Addr) -> Result<u8, Error> {
        let mut data = [0];
        self.read(addr, &mut data)?;
        Ok(data[0])
    }

    fn read(&mut self, addr: Addr, data: &mut [u8]) -> Result<(), Error> {
        Ok(self.bus.transaction(&mut [
            Operation::Write(&[Instruction::builder()
                .with_addr(addr)
                .with_multi(data.len() > 1)
                .with_read(true)
                .build()
                .raw_value()]),
            Operation::Read(data),
        ])?)
    }

    /// Check the device ID and start measuring.
    pub fn init(&mut self) -> Result<(), Error> {
        let id = self.read_register(Addr::DevId)?;
        if id != DEVID {
            return Err(Error::Id(id));
        }
        self.write_register(
            Addr::PowerCtl,
            PowerCtl::builder()
                .with_sleep(false)
                .with_measure(true)
                .with_auto_sleep(false)
                .with_link(false)
                .build()
                .raw_value(),
        )?;
        log::info!("ADXL345 initialized");
        Ok(())
    }

    /// Set the range with right justified full resolution samples,
    /// preserving the other DATA_FORMAT bits.
    pub fn set_range(&mut self, range: Range) -> Result<(), Error> {
        let format = self.read_register(Addr::DataFormat)?;
        let format = DataFormat::new_with_raw_value(format);
        self.write_register(
            Addr::DataFormat,
            format
                .with_range(range)
                .with_justify(false)
                .with_full_res(true)
                .raw_value(),
        )
    }

    /// Set the output data rate. Low power mode is cleared.
    pub fn set_data_rate(&mut self, rate: DataRate) -> Result<(), Error> {
        self.write_register(
            Addr::BwRate,
            BwRate::builder()
                .with_rate(rate)
                .with_low_power(false)
                .build()
                .raw_value(),
        )
    }

    pub fn read_axis(&mut self, axis: Axis) -> Result<i16, Error> {
        let mut data = [0; 2];
        self.read(axis.addr(), &mut data)?;
        Ok(i16::from_le_bytes(data))
    }

    /// Read all three axes in one burst.
    pub fn read_xyz(&mut self) -> Result<[i16; 3], Error> {
        let mut data = [0; 6];
        self.read(Addr::DataX0, &mut data)?;
        Ok([
            i16::from_le_bytes([data[0], data[1]]),
            i16::from_le_bytes([data[2], data[3]]),
            i16::from_le_bytes([data[4], data[5]]),
        ])
    }
}
