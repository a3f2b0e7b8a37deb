//! # Tone detector
//!
//! Fixed-point detection of a single known frequency in a stream of `i8`
//! samples, for targets without floating point hardware.
//!
//! The core is [StreamingGoertzel]: a rotating reference vector is multiplied
//! with each sample and the resulting vectors are summed over a sliding
//! window. The magnitude of that sum is the amplitude of the target frequency
//! in the window. Everything runs in integer arithmetic with fixed capacity
//! storage and O(1) work per sample.
//!
//! Samples come from a [SampleSource] (e.g. an accelerometer axis via
//! [AxisSource]), detections are reported through an [Alarm] (e.g. an RFM69
//! transmitter) by a [Detector]. When samples are fed from an interrupt and the
//! magnitude is read elsewhere, use [SharedGoertzel].
#![cfg_attr(not(test), no_std)]

mod clock;
mod complex;
pub use complex::*;
mod detector;
pub use detector::*;
mod goertzel;
pub use goertzel::*;
mod radio;
mod sensor;
pub use sensor::*;
mod settings;
pub use settings::*;
mod shared;
pub use shared::*;
mod source;
pub use source::*;

pub use idsp::Complex;

#[cfg(test)]
pub mod testing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Window length {0} not in [1, 256]")]
    Window(u16),
    #[error("Divisor {0} not in [1, 256]")]
    Divisor(u16),
    #[error("Sample rate {sample} not a multiple of tone frequency {tone}")]
    Ratio { sample: u32, tone: u32 },
    #[error("Divisor {divisor} does not match the tone, expected {expected}")]
    Tone { divisor: u16, expected: u16 },
    #[error("Sample shift {0} exceeds 15")]
    Shift(u8),
    #[error("Sample {0} out of range")]
    Overrange(i16),
    #[error("Release {release} above threshold {threshold}")]
    Release { threshold: i32, release: i32 },
    #[error("Invalid settings JSON")]
    Json,
    #[error("Sensor")]
    Sensor(#[source] adxl345::Error),
    #[error("Radio")]
    Radio(#[source] rfm69::Error),
}
