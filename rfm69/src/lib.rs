#![cfg_attr(not(test), no_std)]

use bitbybit::{bitenum, bitfield};
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, Operation, SpiDevice};

#[bitenum(u7)]
#[derive(Debug, PartialEq)]
pub enum Addr {
    OpMode = 0x01,
    FrfMsb = 0x07,
    FrfMid = 0x08,
    FrfLsb = 0x09,
    Version = 0x10,
    TestPa1 = 0x5a,
    TestPa2 = 0x5c,
}

#[bitfield(u8)]
#[derive(Debug, PartialEq)]
pub struct Instruction {
    #[bits(0..=6, rw)]
    addr: Option<Addr>,
    #[bit(7, rw)]
    write: bool,
}

pub const VERSION: u8 = 0x24;

/// Crystal oscillator frequency.
pub const FXOSC: u32 = 32_000_000;

/// Supported carrier frequency bands in Hz.
pub const BANDS: [(u32, u32); 3] = [
    (290_000_000, 340_000_000),
    (424_000_000, 510_000_000),
    (862_000_000, 1_020_000_000),
];

/// Operating mode.
#[bitenum(u3)]
#[derive(Debug, PartialEq)]
pub enum Mode {
    Sleep = 0,
    Standby = 1,
    Synthesizer = 2,
    Transmitter = 3,
    Receiver = 4,
}

impl Mode {
    /// TESTPA1/TESTPA2 values. The +20 dBm boost is only allowed while
    /// transmitting.
    fn test_pa(&self) -> (u8, u8) {
        match self {
            Self::Transmitter => (0x5d, 0x7c),
            _ => (0x55, 0x70),
        }
    }
}

#[bitfield(u8, default = 0x04)]
#[derive(Debug, PartialEq)]
pub struct OpMode {
    #[bits(2..=4, rw)]
    pub mode: Option<Mode>,
    #[bit(5, rw)]
    pub listen_abort: bool,
    #[bit(6, rw)]
    pub listen_on: bool,
    #[bit(7, rw)]
    pub sequencer_off: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid version {0:#04x}")]
    Version(u8),
    #[error("Reserved mode in OPMODE {0:#04x}")]
    Mode(u8),
    #[error("Frequency {0} Hz outside the supported bands")]
    Frequency(u32),
    #[error("SPI {0}")]
    Bus(spi::ErrorKind),
    #[error("Data pin {0}")]
    Pin(digital::ErrorKind),
}

impl<E: spi::Error> From<E> for Error {
    fn from(value: E) -> Self {
        Self::Bus(value.kind())
    }
}

/// Carrier frequency to FRF register value, 24 bit.
///
/// `frf = frequency * 2**19 / FXOSC`, rounded. Frequencies outside [BANDS]
/// are rejected.
pub fn frequency_to_frf(frequency: u32) -> Result<u32, Error> {
    if !BANDS
        .iter()
        .any(|(low, high)| (*low..=*high).contains(&frequency))
    {
        return Err(Error::Frequency(frequency));
    }
    let fxosc = FXOSC as u64;
    let frf = (((frequency as u64) << 19) + fxosc / 2) / fxosc;
    if frf > 0xff_ffff {
        return Err(Error::Frequency(frequency));
    }
    Ok(frf as u32)
}

/// RFM69 with its DIO2 line used as continuous mode data input.
///
/// In continuous OOK transmit mode the carrier follows the data pin.
#[derive(Clone, Debug)]
pub struct Rfm69<B, P> {
    bus: B,
    data: P,
}

impl<B: SpiDevice<u8>, P: OutputPin> Rfm69<B, P> {
    pub fn new(bus: B, data: P) -> Self {
        Self { bus, data }
    }

    pub fn release(self) -> (B, P) {
        (self.bus, self.data)
    }

    pub fn write_register(&mut self, addr: Addr, value: u8) -> Result<(), Error> {
        Ok(self.bus.write(&[
            Instruction::builder()
                .with_addr(addr)
                .with_write(true)
                .build()
                .raw_value(),
            value,
        ])?)
    }

    pub fn read_register(&mut self, addr: Addr) -> Result<u8, Error> {
        let mut data = [0];
        self.bus.transaction(&mut [
            Operation::Write(&[Instruction::builder()
                .with_addr(addr)
                .with_write(false)
                .build()
                .raw_value()]),
            Operation::Read(&mut data),
        ])?;
        Ok(data[0])
    }

    /// Check the silicon version and go to standby.
    pub fn init(&mut self) -> Result<(), Error> {
        let version = self.read_register(Addr::Version)?;
        if version != VERSION {
            return Err(Error::Version(version));
        }
        self.set_mode(Mode::Standby)?;
        log::info!("RFM69 initialized");
        Ok(())
    }

    /// Set the carrier frequency in Hz. Returns the FRF register value.
    pub fn set_frequency(&mut self, frequency: u32) -> Result<u32, Error> {
        let frf = frequency_to_frf(frequency)?;
        let [_, msb, mid, lsb] = frf.to_be_bytes();
        self.write_register(Addr::FrfMsb, msb)?;
        self.write_register(Addr::FrfMid, mid)?;
        self.write_register(Addr::FrfLsb, lsb)?;
        Ok(frf)
    }

    pub fn mode(&mut self) -> Result<Mode, Error> {
        let opmode = self.read_register(Addr::OpMode)?;
        OpMode::new_with_raw_value(opmode)
            .mode()
            .map_err(|_| Error::Mode(opmode))
    }

    /// Transition to `mode`.
    ///
    /// The other OPMODE bits are preserved, the PA boost follows the mode and
    /// the carrier is keyed off.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error> {
        self.set_carrier(false)?;
        let (pa1, pa2) = mode.test_pa();
        let opmode =
            OpMode::new_with_raw_value(self.read_register(Addr::OpMode)?);
        self.write_register(
            Addr::OpMode,
            opmode.with_mode(mode).raw_value(),
        )?;
        self.write_register(Addr::TestPa1, pa1)?;
        self.write_register(Addr::TestPa2, pa2)?;
        Ok(())
    }

    /// Key the carrier through the data pin.
    pub fn set_carrier(&mut self, on: bool) -> Result<(), Error> {
        let res = if on {
            self.data.set_high()
        } else {
            self.data.set_low()
        };
        res.map_err(|e| Error::Pin(digital::Error::kind(&e)))
    }
}
