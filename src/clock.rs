//! Quantized clock vectors: `round(127 * (cos, sin)(2 pi index / divisor))`.
//!
//! `idsp::cossin()` is accurate to about `1e-5` of full scale, a few thousandths
//! of an output step. That decides every entry that is not close to a half
//! step. The remaining ones are evaluated exactly: exact ties (`127 / 2` at
//! multiples of `pi / 6`) are found by integer arithmetic and rounded away
//! from zero, everything else with a Q61 Taylor series.

/// `1.0` in Q61
const ONE: i128 = 1 << 61;

/// `pi / 2` in Q61
const HALF_PI: i128 = 0x3243_f6a8_885a_308d;

/// Distance to a half step (Q31, 1/32 of a step) below which the
/// `idsp::cossin()` value does not decide the rounding.
const MARGIN: u64 = 1 << 26;

/// Round a Q31 value scaled by 127 to the nearest integer, ties away from zero.
fn round_q31(v: i64) -> i8 {
    let m = ((v.unsigned_abs() + (1 << 30)) >> 31) as i8;
    if v < 0 {
        -m
    } else {
        m
    }
}

fn near_half(v: i64) -> bool {
    let frac = v.unsigned_abs() & ((1 << 31) - 1);
    frac.abs_diff(1 << 30) < MARGIN
}

/// Round a Q61 value scaled by 127. `tie` marks exact halves.
fn round_q61(v: i128, tie: bool) -> i8 {
    let v = v * 127;
    let m = (if tie {
        (v.unsigned_abs() >> 61) + 1
    } else {
        (v.unsigned_abs() + (1 << 60)) >> 61
    }) as i8;
    if v < 0 {
        -m
    } else {
        m
    }
}

/// `(cos, sin)` of `index / divisor` turns in Q61.
fn cossin_q61(index: usize, divisor: usize) -> (i128, i128) {
    let n = 4 * index as u128;
    let divisor = divisor as u128;
    let quadrant = (n / divisor) % 4;
    let mut u = n % divisor;
    // Reduce to [0, pi/4]
    let swap = 2 * u > divisor;
    if swap {
        u = divisor - u;
    }
    let x = HALF_PI * u as i128 / divisor as i128;

    let (mut cos, mut sin) = (0, 0);
    let mut term = ONE;
    let mut k = 0;
    while term != 0 {
        match k % 4 {
            0 => cos += term,
            1 => sin += term,
            2 => cos -= term,
            _ => sin -= term,
        }
        k += 1;
        term = ((term * x) >> 61) / k;
    }
    if swap {
        core::mem::swap(&mut cos, &mut sin);
    }
    match quadrant {
        0 => (cos, sin),
        1 => (-sin, cos),
        2 => (-cos, -sin),
        _ => (sin, -cos),
    }
}

fn exact(index: usize, divisor: usize) -> (i8, i8) {
    let (cos, sin) = cossin_q61(index, divisor);
    // Angle in units of pi/6 if it is a multiple of it.
    let sixth = (12 * index % divisor == 0).then_some(12 * index / divisor);
    let tie = |odd| sixth.is_some_and(|k| k % 2 == odd && k % 3 != 0);
    (round_q61(cos, tie(0)), round_q61(sin, tie(1)))
}

/// Clock vector at `index` of `divisor` steps per turn.
pub(crate) fn clock(index: usize, divisor: usize) -> (i8, i8) {
    let divisor64 = divisor as u64;
    let phase = (((index as u64) << 32) + divisor64 / 2) / divisor64;
    let (cos, sin) = idsp::cossin(phase as u32 as i32);
    let (cos, sin) = (cos as i64 * 127, sin as i64 * 127);
    if near_half(cos) || near_half(sin) {
        exact(index, divisor)
    } else {
        (round_q31(cos), round_q31(sin))
    }
}
