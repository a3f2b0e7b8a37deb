use rand_core::{RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;
use tone_detector::{
    Complex, ComplexMagnitude, FilterConfig, StreamingGoertzel,
};

use std::f64::consts::PI;
use std::vec::Vec;

pub fn isclose(a: f64, b: f64, rtol: f64, atol: f64) -> bool {
    (a - b).abs() <= a.abs().max(b.abs()) * rtol + atol
}

/// Sampled cosine, `frequency` in cycles per sample, rounded to `i8`.
fn tone(amplitude: f64, frequency: f64, phase: f64, len: usize) -> Vec<i8> {
    (0..len)
        .map(|i| {
            let z = 2. * PI * frequency * i as f64 + phase;
            let x = (amplitude * z.cos()).round();
            assert!((i8::MIN as f64..=i8::MAX as f64).contains(&x));
            x as i8
        })
        .collect()
}

fn random(seed: u64, len: usize) -> Vec<i8> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    (0..len).map(|_| rng.next_u32() as i8).collect()
}

/// Run `samples` through a fresh filter, returning the magnitude after each.
fn magnitudes(config: FilterConfig, samples: &[i8]) -> Vec<i32> {
    let mut f = StreamingGoertzel::new(config).unwrap();
    samples
        .iter()
        .map(|&s| {
            f.update(s);
            f.magnitude()
        })
        .collect()
}

/// Steady state magnitude of a matched tone: `127 * amplitude * window / 2`.
fn expected(amplitude: f64, window: u16) -> f64 {
    127. * amplitude * window as f64 / 2.
}

#[test]
fn matched_tone() {
    let config = FilterConfig::new(256, 16);
    let m = magnitudes(config, &tone(127., 1. / 16., 0., 1024));
    let steady = m[255];
    assert!(
        isclose(steady as f64, expected(127., 256), 0.03, 0.),
        "{} vs {}",
        steady,
        expected(127., 256)
    );
    // The window spans whole periods: nothing changes once it is full.
    assert!(m[255..].iter().all(|&x| x == steady));
    // Still filling
    assert!(m[..255].iter().all(|&x| x < steady));
}

#[test]
fn matched_tone_phase() {
    let config = FilterConfig::new(128, 8);
    for phase in [0., PI / 5., PI / 2., 2., PI] {
        let m = magnitudes(config, &tone(100., 1. / 8., phase, 512));
        assert!(
            isclose(m[511] as f64, expected(100., 128), 0.04, 0.),
            "phase {}: {}",
            phase,
            m[511]
        );
    }
}

#[test]
fn matched_tone_amplitude() {
    let config = FilterConfig::new(200, 20);
    for amplitude in [20., 50., 100., 127.] {
        let m = magnitudes(config, &tone(amplitude, 1. / 20., 0.3, 400));
        assert!(
            isclose(m[399] as f64, expected(amplitude, 200), 0.04, 127.),
            "amplitude {}: {}",
            amplitude,
            m[399]
        );
    }
}

#[test]
fn unrelated_tone() {
    let config = FilterConfig::new(256, 16);
    let matched = expected(127., 256);
    for frequency in [0.37, 0.5 / PI, 0.21, 0.45] {
        let m = magnitudes(config, &tone(127., frequency, 0., 1024));
        assert!(
            m[256..].iter().all(|&x| (x as f64) < matched / 20.),
            "frequency {}: {}",
            frequency,
            m[256..].iter().max().unwrap()
        );
    }
}

#[test]
fn harmonic_rejected() {
    let config = FilterConfig::new(256, 16);
    let matched = expected(127., 256);
    for harmonic in [0., 2., 3., 5.] {
        let m = magnitudes(config, &tone(127., harmonic / 16., 0., 512));
        assert!(
            (m[511] as f64) < matched / 100.,
            "harmonic {}: {}",
            harmonic,
            m[511]
        );
    }
}

#[test]
fn deterministic() {
    let config = FilterConfig::new(100, 7);
    let samples = random(0x5eed, 2000);
    let mut a = StreamingGoertzel::new(config).unwrap();
    let mut b = StreamingGoertzel::new(config).unwrap();
    for &s in samples.iter() {
        a.update(s);
        b.update(s);
        assert_eq!(a.accumulator(), b.accumulator());
        assert_eq!(a.magnitude(), b.magnitude());
    }
    assert_eq!(magnitudes(config, &samples), magnitudes(config, &samples));
}

#[test]
fn incremental_matches_direct() {
    for (window, divisor) in [(37, 11), (4, 4), (1, 1), (256, 3), (10, 256)] {
        let mut f = StreamingGoertzel::with(window, divisor).unwrap();
        let cos: Vec<i32> =
            f.cos_table().iter().map(|&c| c as i32).collect();
        let sin: Vec<i32> =
            f.sin_table().iter().map(|&s| s as i32).collect();
        let samples = random(window as u64 * 1000 + divisor as u64, 1500);
        for (n, &s) in samples.iter().enumerate() {
            f.update(s);
            let start = (n + 1).saturating_sub(window as usize);
            let direct = (start..=n).fold(Complex::new(0, 0), |acc, k| {
                let p = k % divisor as usize;
                let x = samples[k] as i32;
                Complex::new(acc.re + x * cos[p], acc.im + x * sin[p])
            });
            assert_eq!(
                f.accumulator(),
                direct,
                "({}, {}) at {}",
                window,
                divisor,
                n
            );
        }
    }
}

#[test]
fn full_scale_bound() {
    let bound = 256 * 128 * 127;
    for divisor in [1, 2, 256] {
        let mut f = StreamingGoertzel::with(256, divisor).unwrap();
        let samples = random(divisor as u64, 2000);
        for &s in samples.iter().chain([-128i8; 512].iter()) {
            f.update(s);
            let acc = f.accumulator();
            assert!(acc.re.abs() <= bound && acc.im.abs() <= bound);
            assert!(f.magnitude() >= 0);
        }
    }
}

#[test]
fn magnitude_within_three_percent() {
    let mut f = StreamingGoertzel::with(64, 9).unwrap();
    for &s in random(3, 5000).iter() {
        f.update(s);
        let acc = f.accumulator();
        let exact = (acc.re as f64).hypot(acc.im as f64);
        assert_eq!(f.magnitude(), acc.abs_approx());
        let approx = f.magnitude() as f64;
        assert!(isclose(approx, exact, 0.03, 1.), "{} vs {}", approx, exact);
    }
}
