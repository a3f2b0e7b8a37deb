use super::{DetectorSettings, Error, StreamingGoertzel};

/// Downstream action on detection, e.g. keying a transmitter.
pub trait Alarm {
    type Error;

    fn raise(&mut self) -> Result<(), Self::Error>;
    fn clear(&mut self) -> Result<(), Self::Error>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The magnitude reached the threshold.
    Detected(i32),
    /// The magnitude fell below the release level.
    Cleared(i32),
}

/// Threshold comparator with hysteresis on the filter magnitude.
#[derive(Copy, Clone, Debug)]
pub struct Detector {
    settings: DetectorSettings,
    active: bool,
}

impl Detector {
    pub fn new(settings: DetectorSettings) -> Result<Self, Error> {
        settings.validate()?;
        Ok(Self {
            settings,
            active: false,
        })
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn settings(&self) -> DetectorSettings {
        self.settings
    }

    /// State change `magnitude` would cause, without applying it.
    fn edge(&self, magnitude: i32) -> Option<Event> {
        if !self.active && magnitude >= self.settings.threshold {
            Some(Event::Detected(magnitude))
        } else if self.active && magnitude < self.settings.release {
            Some(Event::Cleared(magnitude))
        } else {
            None
        }
    }

    fn commit(&mut self, event: Event) {
        match event {
            Event::Detected(magnitude) => {
                self.active = true;
                log::debug!("Tone detected: {}", magnitude);
            }
            Event::Cleared(magnitude) => {
                self.active = false;
                log::debug!("Tone cleared: {}", magnitude);
            }
        }
    }

    /// Compare a magnitude and report state changes.
    pub fn observe(&mut self, magnitude: i32) -> Option<Event> {
        let event = self.edge(magnitude);
        if let Some(event) = event {
            self.commit(event);
        }
        event
    }

    /// Observe the filter magnitude once its window is primed.
    pub fn poll(&mut self, filter: &StreamingGoertzel) -> Option<Event> {
        if !filter.primed() {
            return None;
        }
        self.observe(filter.magnitude())
    }

    /// Forward state changes to `alarm`.
    ///
    /// The state only changes once the alarm accepted it. After an alarm error
    /// the same edge is retried on the next call.
    pub fn drive<A: Alarm>(
        &mut self,
        alarm: &mut A,
        magnitude: i32,
    ) -> Result<Option<Event>, A::Error> {
        let event = self.edge(magnitude);
        if let Some(event) = event {
            match event {
                Event::Detected(_) => alarm.raise()?,
                Event::Cleared(_) => alarm.clear()?,
            }
            self.commit(event);
        }
        Ok(event)
    }
}
