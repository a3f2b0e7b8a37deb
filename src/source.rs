use super::{Error, Overrange};

/// Something that produces one `i8` sample per call at a fixed cadence.
pub trait SampleSource {
    type Error;

    fn sample(&mut self) -> Result<i8, Self::Error>;
}

/// Narrow a raw reading to the `i8` sample range.
///
/// The reading is arithmetically shifted right by `shift` (at most 15) and then
/// either saturated or rejected according to `overrange`. Values are never
/// wrapped.
pub fn narrow(raw: i16, shift: u8, overrange: Overrange) -> Result<i8, Error> {
    let value = raw >> shift.min(15);
    match i8::try_from(value) {
        Ok(sample) => Ok(sample),
        Err(_) => match overrange {
            Overrange::Clamp => {
                log::warn!("Clamping sample {}", raw);
                Ok(value.clamp(i8::MIN as _, i8::MAX as _) as i8)
            }
            Overrange::Reject => Err(Error::Overrange(raw)),
        },
    }
}
