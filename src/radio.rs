use embedded_hal::{digital::OutputPin, spi::SpiDevice};
use rfm69::{Mode, Rfm69};

use super::{Alarm, Error};

/// Transmit an unmodulated carrier while the tone is present.
impl<B: SpiDevice<u8>, P: OutputPin> Alarm for Rfm69<B, P> {
    type Error = Error;

    fn raise(&mut self) -> Result<(), Error> {
        self.set_mode(Mode::Transmitter).map_err(Error::Radio)?;
        self.set_carrier(true).map_err(Error::Radio)
    }

    /// Standby, keying the carrier off.
    fn clear(&mut self) -> Result<(), Error> {
        self.set_mode(Mode::Standby).map_err(Error::Radio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::spi::{ErrorType, Operation};
    use std::vec::Vec;

    /// RFM69 register file.
    struct Regs([u8; 0x80]);

    impl ErrorType for Regs {
        type Error = Infallible;
    }

    impl SpiDevice<u8> for Regs {
        fn transaction(
            &mut self,
            operations: &mut [Operation<'_, u8>],
        ) -> Result<(), Infallible> {
            match operations {
                [Operation::Write([addr, value])] => {
                    self.0[(*addr & 0x7f) as usize] = *value;
                }
                [Operation::Write([addr]), Operation::Read(data)] => {
                    data[0] = self.0[*addr as usize];
                }
                _ => panic!("unexpected transaction"),
            }
            Ok(())
        }
    }

    /// Data pin recording every level written.
    #[derive(Default)]
    struct Pin(Vec<bool>);

    impl PinErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.push(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.push(true);
            Ok(())
        }
    }

    #[test]
    fn keying() {
        let mut radio = Rfm69::new(Regs([0; 0x80]), Pin::default());
        radio.raise().unwrap();
        assert_eq!(radio.mode(), Ok(Mode::Transmitter));
        radio.clear().unwrap();
        assert_eq!(radio.mode(), Ok(Mode::Standby));
        let (regs, pin) = radio.release();
        // One key-off per mode change, one key-on
        assert_eq!(pin.0, [false, true, false]);
        assert_eq!(regs.0[0x5a], 0x55);
    }
}
