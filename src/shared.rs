use core::cell::RefCell;

use critical_section::Mutex;

use super::{Complex, StreamingGoertzel};

/// A [StreamingGoertzel] shared between an interrupt feeding samples and
/// another context reading the magnitude.
///
/// The two accumulator words are updated in separate steps. Every access
/// here runs inside one critical section so a reader never sees a half
/// updated accumulator.
pub struct SharedGoertzel {
    filter: Mutex<RefCell<StreamingGoertzel>>,
}

impl SharedGoertzel {
    pub fn new(filter: StreamingGoertzel) -> Self {
        Self {
            filter: Mutex::new(RefCell::new(filter)),
        }
    }

    /// Run `f` with exclusive access to the filter.
    pub fn lock<R>(&self, f: impl FnOnce(&mut StreamingGoertzel) -> R) -> R {
        critical_section::with(|cs| f(&mut self.filter.borrow_ref_mut(cs)))
    }

    pub fn update(&self, sample: i8) {
        self.lock(|filter| filter.update(sample))
    }

    pub fn magnitude(&self) -> i32 {
        self.lock(|filter| filter.magnitude())
    }

    pub fn accumulator(&self) -> Complex<i32> {
        self.lock(|filter| filter.accumulator())
    }

    /// Magnitude and whether the window is primed, read atomically.
    pub fn snapshot(&self) -> (i32, bool) {
        self.lock(|filter| (filter.magnitude(), filter.primed()))
    }

    pub fn reset(&self) {
        self.lock(|filter| filter.reset())
    }

    pub fn into_inner(self) -> StreamingGoertzel {
        self.filter.into_inner().into_inner()
    }
}
