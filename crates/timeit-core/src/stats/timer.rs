//! Timing closures into an accumulator
//!
//! The elapsed time is folded by a drop guard, so a sample is recorded
//! exactly once whether the timed closure returns or panics.

use crate::stats::accumulator::Accumulator;
use crate::stats::nanos::Nanos;
use std::time::Instant;

/// Folds the time since `start` into the accumulator when finished or dropped
struct FoldOnExit<'a> {
    acc: &'a mut Accumulator,
    start: Instant,
    elapsed: Option<Nanos>,
}

impl<'a> FoldOnExit<'a> {
    fn start(acc: &'a mut Accumulator) -> Self {
        Self {
            acc,
            start: Instant::now(),
            elapsed: None,
        }
    }

    fn record(&mut self) -> Nanos {
        if let Some(elapsed) = self.elapsed {
            return elapsed;
        }
        let elapsed = Nanos::from(self.start.elapsed());
        // Marked before folding so an unwinding fold is never repeated by drop
        self.elapsed = Some(elapsed);
        self.acc.fold(elapsed);
        elapsed
    }
}

impl Drop for FoldOnExit<'_> {
    fn drop(&mut self) {
        self.record();
    }
}

impl Accumulator {
    /// Run `op`, fold its wall-clock duration and return that duration
    ///
    /// If `op` panics, the partial duration is still folded before the panic
    /// continues to unwind.
    ///
    /// # Example
    ///
    /// ```
    /// use timeit_core::Accumulator;
    ///
    /// let mut acc = Accumulator::new();
    /// let elapsed = acc.time_it(|| std::thread::sleep(std::time::Duration::from_millis(1)));
    ///
    /// assert_eq!(acc.samples(), 1);
    /// assert_eq!(acc.mean(), elapsed);
    /// ```
    pub fn time_it<F>(&mut self, op: F) -> Nanos
    where
        F: FnOnce(),
    {
        self.measure(op).1
    }

    /// Like [`time_it`](Self::time_it), also returning the result of `op`
    pub fn measure<F, R>(&mut self, op: F) -> (R, Nanos)
    where
        F: FnOnce() -> R,
    {
        let mut guard = FoldOnExit::start(self);
        let result = op();
        let elapsed = guard.record();
        (result, elapsed)
    }
}
