use adxl345::{Adxl345, Axis};
use embedded_hal::spi::SpiDevice;

use super::{narrow, Error, Overrange, SampleSource, Settings};

/// One accelerometer axis as a sample source.
pub struct AxisSource<B> {
    dev: Adxl345<B>,
    axis: Axis,
    shift: u8,
    overrange: Overrange,
}

impl<B: SpiDevice<u8>> AxisSource<B> {
    /// Wrap an initialized device, sampling `settings.axis`.
    pub fn new(dev: Adxl345<B>, settings: &Settings) -> Self {
        Self {
            dev,
            axis: settings.axis,
            shift: settings.shift,
            overrange: settings.overrange,
        }
    }

    /// Initialize the device and apply the range and data rate settings.
    pub fn setup(
        mut dev: Adxl345<B>,
        settings: &Settings,
    ) -> Result<Self, Error> {
        dev.init().map_err(Error::Sensor)?;
        dev.set_range(settings.range).map_err(Error::Sensor)?;
        dev.set_data_rate(settings.rate).map_err(Error::Sensor)?;
        log::info!(
            "Sampling {:?} at {} mHz for {} mHz",
            settings.axis,
            settings.rate.millihertz(),
            settings.target_millihertz()
        );
        Ok(Self::new(dev, settings))
    }

    pub fn release(self) -> Adxl345<B> {
        self.dev
    }
}

impl<B: SpiDevice<u8>> SampleSource for AxisSource<B> {
    type Error = Error;

    fn sample(&mut self) -> Result<i8, Error> {
        let raw = self.dev.read_axis(self.axis).map_err(Error::Sensor)?;
        narrow(raw, self.shift, self.overrange)
    }
}
