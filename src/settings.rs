use adxl345::{Axis, DataRate, Range};
use serde::{Deserialize, Serialize};

use super::Error;

/// Sliding Goertzel geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Number of samples summed in the sliding window.
    pub window: u16,
    /// Samples per cycle of the target frequency, i.e. the sample rate
    /// divided by the target frequency. The sample rate must be an integer
    /// multiple of the target frequency.
    pub divisor: u16,
}

impl FilterConfig {
    /// Upper bound for both `window` and `divisor`.
    ///
    /// With samples in `[-128, 127]` and clocks in `[-127, 127]` each vector
    /// component is at most `16256`. A window of 256 of those sums to at most
    /// `4_161_536`, leaving headroom for the magnitude approximation in `i32`.
    pub const MAX: u16 = 256;

    pub const fn new(window: u16, divisor: u16) -> Self {
        Self { window, divisor }
    }

    /// Derive the divisor from sample and tone frequencies.
    ///
    /// Both rates are in the same (arbitrary) unit, e.g. mHz.
    pub fn from_rates(
        window: u16,
        sample_rate: u32,
        tone: u32,
    ) -> Result<Self, Error> {
        let ratio = Error::Ratio {
            sample: sample_rate,
            tone,
        };
        if tone == 0 || sample_rate % tone != 0 {
            return Err(ratio);
        }
        let divisor = u16::try_from(sample_rate / tone).map_err(|_| ratio)?;
        let config = Self::new(window, divisor);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(1..=Self::MAX).contains(&self.window) {
            return Err(Error::Window(self.window));
        }
        if !(1..=Self::MAX).contains(&self.divisor) {
            return Err(Error::Divisor(self.divisor));
        }
        Ok(())
    }
}

impl Default for FilterConfig {
    /// 200 Hz at 3200 Hz sampling, 80 ms window.
    fn default() -> Self {
        Self::new(256, 16)
    }
}

/// Handling of raw readings that do not fit an `i8` sample.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overrange {
    /// Saturate to `-128` or `127`.
    #[default]
    Clamp,
    /// Fail the read with [Error::Overrange].
    Reject,
}

/// Detection thresholds on the filter magnitude.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorSettings {
    /// Magnitude at or above which the tone is considered present.
    pub threshold: i32,
    /// Magnitude below which a present tone is considered gone.
    pub release: i32,
}

impl DetectorSettings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.release > self.threshold {
            return Err(Error::Release {
                threshold: self.threshold,
                release: self.release,
            });
        }
        Ok(())
    }
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            threshold: 50_000,
            release: 40_000,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub filter: FilterConfig,
    pub detector: DetectorSettings,
    /// Sample narrowing policy.
    #[serde(default)]
    pub overrange: Overrange,
    /// Right shift applied to raw readings before narrowing.
    #[serde(default)]
    pub shift: u8,
    /// Accelerometer measurement range.
    #[serde(default)]
    pub range: Range,
    /// Accelerometer output data rate, the filter sample rate.
    #[serde(default = "Settings::default_rate")]
    pub rate: DataRate,
    /// Sampled accelerometer axis.
    #[serde(default)]
    pub axis: Axis,
    /// Target tone in mHz. If given, `filter.divisor` must be
    /// `rate / tone`.
    #[serde(default)]
    pub tone: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            detector: DetectorSettings::default(),
            overrange: Overrange::default(),
            shift: 0,
            range: Range::default(),
            rate: Self::default_rate(),
            axis: Axis::default(),
            tone: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON.
    pub fn from_json(json: &[u8]) -> Result<Self, Error> {
        let (settings, _): (Self, _) = serde_json_core::from_slice(json)
            .map_err(|e| {
                log::warn!("Settings JSON: {:?}", e);
                Error::Json
            })?;
        settings.validate()?;
        Ok(settings)
    }

    fn default_rate() -> DataRate {
        DataRate::Hz3200
    }

    /// Frequency the filter is tuned to in mHz, rounded down.
    pub fn target_millihertz(&self) -> u32 {
        self.rate.millihertz() / self.filter.divisor as u32
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.filter.validate()?;
        self.detector.validate()?;
        if self.shift > 15 {
            return Err(Error::Shift(self.shift));
        }
        if let Some(tone) = self.tone {
            let expected = FilterConfig::from_rates(
                self.filter.window,
                self.rate.millihertz(),
                tone,
            )?
            .divisor;
            if expected != self.filter.divisor {
                return Err(Error::Tone {
                    divisor: self.filter.divisor,
                    expected,
                });
            }
        }
        Ok(())
    }
}
