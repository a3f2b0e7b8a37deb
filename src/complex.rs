use idsp::Complex;

/// Square root free magnitude of the fixed point [Complex].
pub trait ComplexMagnitude {
    /// Magnitude estimate without a square root.
    ///
    /// Alpha max plus beta min with `alpha = 28/32`, `beta = 17/32` and a
    /// floor of `max(|re|, |im|)`. Within 3% of the exact magnitude.
    fn abs_approx(&self) -> i32;
}

impl ComplexMagnitude for Complex<i32> {
    /// Both components must be within `i32::MAX / 45` in magnitude. For the
    /// sliding Goertzel accumulator they never exceed `256 * 16256`, so
    /// `32 * hi` stays below `133_169_152`.
    fn abs_approx(&self) -> i32 {
        let ax = self.re.abs();
        let ay = self.im.abs();
        let (hi, lo) = if ax > ay { (ax, ay) } else { (ay, ax) };
        debug_assert!(hi <= i32::MAX / 45);
        let opt1 = 28 * hi + 17 * lo;
        let opt2 = 32 * hi;
        opt1.max(opt2) >> 5
    }
}
