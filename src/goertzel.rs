use core::iter;

use heapless::Vec;
use idsp::Complex;

use super::{
    clock::clock, ComplexMagnitude, Error, FilterConfig, SampleSource,
};

/// Storage capacity for clock tables and window buffers.
pub const CAPACITY: usize = FilterConfig::MAX as usize;

/// Streaming single frequency amplitude estimator.
///
/// A clock vector of length 127 revolves once every `divisor` samples. Each
/// sample is multiplied with the clock vector and the sum of the last `window`
/// such sample vectors is kept in an accumulator. The magnitude of the
/// accumulator is the amplitude of the target frequency in the window.
///
/// Bit widths: samples are `i8`, clocks in `[-127, 127]`, sample vectors in
/// `[-16256, 16256]` (`i16`). The accumulator holds at most 256 of those,
/// `|acc| <= 4_161_536`, which keeps [ComplexMagnitude::abs_approx] within
/// `i32`.
///
/// The accumulator is maintained incrementally: the oldest vector is
/// subtracted and the newest one added on every update. It is never
/// recomputed.
#[derive(Clone, Debug)]
pub struct StreamingGoertzel {
    config: FilterConfig,
    cos: Vec<i8, CAPACITY>,
    sin: Vec<i8, CAPACITY>,
    x: Vec<i16, CAPACITY>,
    y: Vec<i16, CAPACITY>,
    acc: Complex<i32>,
    phase: usize,
    bufpos: usize,
    fill: usize,
}

impl StreamingGoertzel {
    /// Build a filter.
    ///
    /// Fails with [Error::Window] or [Error::Divisor] if either value is not in
    /// `[1, 256]`.
    pub fn new(config: FilterConfig) -> Result<Self, Error> {
        config.validate()?;
        let divisor = config.divisor as usize;
        let window = config.window as usize;
        let (cos, sin) = (0..divisor).map(|i| clock(i, divisor)).unzip();
        Ok(Self {
            config,
            cos,
            sin,
            x: iter::repeat(0).take(window).collect(),
            y: iter::repeat(0).take(window).collect(),
            acc: Complex::default(),
            phase: 0,
            bufpos: 0,
            fill: 0,
        })
    }

    pub fn with(window: u16, divisor: u16) -> Result<Self, Error> {
        Self::new(FilterConfig::new(window, divisor))
    }

    /// Feed one sample.
    pub fn update(&mut self, sample: i8) {
        // Rotating clock vector
        let clock_x = self.cos[self.phase];
        let clock_y = self.sin[self.phase];
        self.phase += 1;
        if self.phase == self.cos.len() {
            self.phase = 0;
        }

        // |128 * 127| = 16256
        let vec_x = sample as i16 * clock_x as i16;
        let vec_y = sample as i16 * clock_y as i16;

        // Evict the oldest vector, then admit the new one.
        self.acc.re -= self.x[self.bufpos] as i32;
        self.acc.im -= self.y[self.bufpos] as i32;
        self.acc.re += vec_x as i32;
        self.acc.im += vec_y as i32;
        self.x[self.bufpos] = vec_x;
        self.y[self.bufpos] = vec_y;

        self.bufpos += 1;
        if self.bufpos == self.x.len() {
            self.bufpos = 0;
        }
        if self.fill < self.x.len() {
            self.fill += 1;
        }
    }

    /// Feed a batch of samples.
    pub fn process(&mut self, samples: &[i8]) {
        for &sample in samples {
            self.update(sample);
        }
    }

    /// Read one sample from `source` and feed it.
    ///
    /// Source errors are returned before any state is touched.
    pub fn pull<S: SampleSource>(
        &mut self,
        source: &mut S,
    ) -> Result<i8, S::Error> {
        let sample = source.sample()?;
        self.update(sample);
        Ok(sample)
    }

    /// Amplitude estimate of the target frequency over the current window.
    ///
    /// Non-negative. A full scale matched tone (amplitude 127) yields about
    /// `127 * 127 * window / 2`.
    pub fn magnitude(&self) -> i32 {
        self.acc.abs_approx()
    }

    /// Running sum of the buffered sample vectors.
    pub fn accumulator(&self) -> Complex<i32> {
        self.acc
    }

    /// Whether a full window of samples has been seen since construction or
    /// the last reset.
    pub fn primed(&self) -> bool {
        self.fill == self.x.len()
    }

    /// Clear the window, the accumulator and the clock phase.
    ///
    /// The clock tables are kept.
    pub fn reset(&mut self) {
        self.x.iter_mut().for_each(|x| *x = 0);
        self.y.iter_mut().for_each(|y| *y = 0);
        self.acc = Complex::default();
        self.phase = 0;
        self.bufpos = 0;
        self.fill = 0;
    }

    pub fn config(&self) -> FilterConfig {
        self.config
    }

    /// Index of the next clock vector, in `[0, divisor)`.
    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn cos_table(&self) -> &[i8] {
        &self.cos
    }

    pub fn sin_table(&self) -> &[i8] {
        &self.sin
    }
}
