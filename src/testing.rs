use std::vec::Vec;

pub fn isclose(a: f64, b: f64, rtol: f64, atol: f64) -> bool {
    (a - b).abs() <= a.abs().max(b.abs()) * rtol + atol
}

/// Sampled cosine, `frequency` in cycles per sample, rounded to `i8`.
pub fn tone(amplitude: f64, frequency: f64, phase: f64, len: usize) -> Vec<i8> {
    (0..len)
        .map(|i| {
            let z = 2. * core::f64::consts::PI * frequency * i as f64 + phase;
            let x = (amplitude * z.cos()).round();
            assert!((i8::MIN as f64..=i8::MAX as f64).contains(&x));
            x as i8
        })
        .collect()
}
