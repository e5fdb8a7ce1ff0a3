//! Running timing statistics
//!
//! Folds duration samples into count, mean, min, max and the Welford sum of
//! squared deltas (M2), from which population and sample variance are
//! derived on demand. No samples are retained.
//!
//! ## Integer arithmetic
//!
//! The mean is updated with integer division, which truncates toward zero.
//! This introduces a small drift compared to exact arithmetic and is kept
//! deliberately: the results are reproducible bit for bit. M2 is held in
//! 128-bit arithmetic so the product of two nanosecond deltas cannot
//! overflow for any realistic timing.
//!
//! ## Chaining
//!
//! An accumulator may be created chained to a shared accumulator; every
//! sample folded into it is then folded into the chained one as well, for
//! hierarchical aggregation (per-operation into global). The link is weak:
//! it does not keep the target alive, and a sample is simply not forwarded
//! once the target is gone.
//!
//! A chain must not loop back on itself. The link is only set at
//! construction, but replacing a shared accumulator's contents
//! (`*x.borrow_mut() = Accumulator::chained_to(&x)`) still builds a loop.
//! Every accumulator on a loop sits behind a `RefCell` that is mutably
//! borrowed while its fold runs, so the forward that would re-enter it finds
//! the target busy and is skipped instead of recursing. The same applies to
//! a target the caller is holding borrowed, for instance when timing a
//! per-operation accumulator inside its chained parent's `time_it`.

use crate::stats::flags::ExportFlags;
use crate::stats::nanos::Nanos;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Accumulator handle shared between the holders that fold into it
pub type SharedAccumulator = Rc<RefCell<Accumulator>>;

/// Running statistics over timing samples
///
/// # Example
///
/// ```
/// use timeit_core::{Accumulator, Nanos};
///
/// let mut acc = Accumulator::new();
/// acc.fold(Nanos(50));
/// acc.fold(Nanos(25));
///
/// assert_eq!(acc.samples(), 2);
/// assert_eq!(acc.mean(), Nanos(38));
/// assert_eq!(acc.min(), Nanos(25));
/// assert_eq!(acc.max(), Nanos(50));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    /// Number of samples folded so far
    samples: u64,
    /// Running mean
    mean: Nanos,
    /// Largest sample seen
    max: Nanos,
    /// Smallest sample seen
    min: Nanos,
    /// Sum of squared deltas (M2 in Welford's algorithm)
    m2: i128,
    /// Derived statistics to export; empty means all
    export_flags: ExportFlags,
    /// Accumulator that receives every folded sample
    chained: Option<Weak<RefCell<Accumulator>>>,
}

impl Accumulator {
    /// Create an empty, unchained accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty accumulator that forwards every sample to `next`
    ///
    /// `next` is not kept alive by the new accumulator. `next` must not
    /// itself chain back to the accumulator being built; a forward that would
    /// re-enter an accumulator is skipped.
    pub fn chained_to(next: &SharedAccumulator) -> Self {
        Self {
            chained: Some(Rc::downgrade(next)),
            ..Self::default()
        }
    }

    /// Restore an accumulator from previously observed state
    ///
    /// The result is unchained and exports every derived statistic.
    pub fn from_raw(samples: u64, mean: Nanos, max: Nanos, min: Nanos, m2: i128) -> Self {
        Self {
            samples,
            mean,
            max,
            min,
            m2,
            ..Self::default()
        }
    }

    /// Select the derived statistics to export
    pub fn with_export_flags(mut self, flags: ExportFlags) -> Self {
        self.export_flags = flags;
        self
    }

    /// Move the accumulator behind a shared handle so it can be chained to
    pub fn into_shared(self) -> SharedAccumulator {
        Rc::new(RefCell::new(self))
    }

    /// Fold one sample into the statistics
    ///
    /// The sample is forwarded to the chained accumulator after this
    /// accumulator has been updated. The forward is skipped, with a log
    /// event, when the target has been dropped or is currently borrowed
    /// (a loop in the chain, or a caller holding the target).
    pub fn fold(&mut self, sample: Nanos) {
        if self.samples == 0 || sample < self.min {
            self.min = sample;
        }
        if self.samples == 0 || sample > self.max {
            self.max = sample;
        }

        self.samples += 1;
        let delta1 = i128::from(sample.0) - i128::from(self.mean.0);
        self.mean =
            Nanos::saturating_from_i128(i128::from(self.mean.0) + delta1 / i128::from(self.samples));
        let delta2 = i128::from(sample.0) - i128::from(self.mean.0);
        self.m2 = self.m2.saturating_add(delta1.saturating_mul(delta2));

        trace!(sample = sample.0, samples = self.samples, "folded sample");

        if let Some(link) = &self.chained {
            match link.upgrade() {
                Some(next) => match next.try_borrow_mut() {
                    Ok(mut next) => next.fold(sample),
                    Err(_) => warn!(
                        sample = sample.0,
                        "chained accumulator is busy, sample not forwarded"
                    ),
                },
                None => debug!(sample = sample.0, "chained accumulator dropped, sample not forwarded"),
            }
        }
    }

    /// Population variance, `M2 / samples`
    ///
    /// Zero when no samples have been folded.
    pub fn variance(&self) -> Nanos {
        Nanos::saturating_from_i128(self.variance_raw())
    }

    /// Sample variance, `M2 / (samples - 1)`
    ///
    /// This is the unbiased estimator and should generally be preferred over
    /// [`variance`](Self::variance). Zero with fewer than two samples.
    pub fn sample_variance(&self) -> Nanos {
        Nanos::saturating_from_i128(self.sample_variance_raw())
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> Nanos {
        isqrt(self.variance_raw())
    }

    /// Sample standard deviation
    pub fn sample_std_dev(&self) -> Nanos {
        isqrt(self.sample_variance_raw())
    }

    fn variance_raw(&self) -> i128 {
        if self.samples == 0 {
            return 0;
        }
        self.m2 / i128::from(self.samples)
    }

    fn sample_variance_raw(&self) -> i128 {
        if self.samples <= 1 {
            return 0;
        }
        self.m2 / i128::from(self.samples - 1)
    }

    /// Number of samples folded so far
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Check if no samples have been folded
    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }

    /// Running mean
    pub fn mean(&self) -> Nanos {
        self.mean
    }

    /// Largest sample seen (zero when empty)
    pub fn max(&self) -> Nanos {
        self.max
    }

    /// Smallest sample seen (zero when empty)
    pub fn min(&self) -> Nanos {
        self.min
    }

    /// Raw Welford sum of squared deltas
    pub fn m2(&self) -> i128 {
        self.m2
    }

    /// Derived statistics selected for export
    pub fn export_flags(&self) -> ExportFlags {
        self.export_flags
    }

    /// Change the derived statistics selected for export
    pub fn set_export_flags(&mut self, flags: ExportFlags) {
        self.export_flags = flags;
    }

    /// The chained accumulator, if one was linked and is still alive
    pub fn chained(&self) -> Option<SharedAccumulator> {
        self.chained.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_m2(&mut self, m2: i128) {
        self.m2 = m2;
    }

    pub(crate) fn set_base(&mut self, samples: u64, mean: Nanos, max: Nanos, min: Nanos) {
        self.samples = samples;
        self.mean = mean;
        self.max = max;
        self.min = min;
    }
}

/// Square root through `f64`, truncated back to whole nanoseconds
fn isqrt(value: i128) -> Nanos {
    Nanos((value as f64).sqrt() as i64)
}

impl PartialEq for Accumulator {
    /// Chains compare by identity of the target.
    fn eq(&self, other: &Self) -> bool {
        let same_chain = match (&self.chained, &other.chained) {
            (None, None) => true,
            (Some(a), Some(b)) => Weak::ptr_eq(a, b),
            _ => false,
        };
        self.samples == other.samples
            && self.mean == other.mean
            && self.max == other.max
            && self.min == other.min
            && self.m2 == other.m2
            && self.export_flags == other.export_flags
            && same_chain
    }
}

impl Eq for Accumulator {}
