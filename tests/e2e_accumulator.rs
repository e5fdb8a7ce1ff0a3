//! E2E tests for the running statistics accumulator
//!
//! Verifies sample counting, extremes, the integer-truncating Welford
//! update and the chained fan-out through the public API.

use approx::assert_relative_eq;
use timeit::{Accumulator, Nanos};

fn fold_all(acc: &mut Accumulator, samples: &[i64]) {
    for &s in samples {
        acc.fold(Nanos(s));
    }
}

/// Sample count equals the number of folds
#[test]
fn test_sample_count_matches_folds() {
    let mut acc = Accumulator::new();
    for n in 1..=100u64 {
        acc.fold(Nanos((n as i64 * 7919) % 1000));
        assert_eq!(acc.samples(), n);
    }
}

/// Min and max are the literal extremes of the folded samples
#[test]
fn test_min_max_are_literal_extremes() {
    let samples = [420, 17, 999, -3, 512, 999, 0, 64];
    let mut acc = Accumulator::new();
    fold_all(&mut acc, &samples);

    assert_eq!(acc.min(), Nanos(*samples.iter().min().unwrap()));
    assert_eq!(acc.max(), Nanos(*samples.iter().max().unwrap()));
}

/// A single sample sets every statistic to that sample
#[test]
fn test_single_sample() {
    let mut acc = Accumulator::new();
    acc.fold(Nanos(1234));

    assert_eq!(acc.mean(), Nanos(1234));
    assert_eq!(acc.max(), Nanos(1234));
    assert_eq!(acc.min(), Nanos(1234));
    assert_eq!(acc.variance(), Nanos::ZERO);
    assert_eq!(acc.sample_variance(), Nanos::ZERO);
    assert_eq!(acc.std_dev(), Nanos::ZERO);
    assert_eq!(acc.sample_std_dev(), Nanos::ZERO);
}

/// Fold 50 then 25: the mean truncates toward zero
#[test]
fn test_truncating_mean_downward() {
    let mut acc = Accumulator::new();
    fold_all(&mut acc, &[50, 25]);

    assert_eq!(acc.samples(), 2);
    assert_eq!(acc.mean(), Nanos(38));
    assert_eq!(acc.max(), Nanos(50));
    assert_eq!(acc.min(), Nanos(25));
    assert_eq!(acc.m2(), 325);
}

/// Fold 50 then 75: the symmetric case
#[test]
fn test_truncating_mean_upward() {
    let mut acc = Accumulator::new();
    fold_all(&mut acc, &[50, 75]);

    assert_eq!(acc.mean(), Nanos(62));
    assert_eq!(acc.max(), Nanos(75));
    assert_eq!(acc.min(), Nanos(50));
    assert_eq!(acc.m2(), 325);
}

/// The truncation drift stays within one nanosecond per sample of the exact mean
#[test]
fn test_mean_drift_is_bounded() {
    let samples: Vec<i64> = (0..1000).map(|i| 1_000_000 + (i * 37) % 5000).collect();
    let mut acc = Accumulator::new();
    fold_all(&mut acc, &samples);

    let exact = samples.iter().sum::<i64>() as f64 / samples.len() as f64;
    let drift = (acc.mean().0 as f64 - exact).abs();
    assert!(
        drift <= samples.len() as f64,
        "mean {} drifted {} from exact {}",
        acc.mean(),
        drift,
        exact
    );
}

/// Derived statistics are zero with too few samples
#[test]
fn test_derived_statistics_edge_counts() {
    let empty = Accumulator::from_raw(0, Nanos::ZERO, Nanos::ZERO, Nanos::ZERO, 50);
    assert_eq!(empty.variance(), Nanos::ZERO);
    assert_eq!(empty.sample_variance(), Nanos::ZERO);
    assert_eq!(empty.std_dev(), Nanos::ZERO);

    let one = Accumulator::from_raw(1, Nanos::ZERO, Nanos::ZERO, Nanos::ZERO, 64);
    assert_eq!(one.sample_variance(), Nanos::ZERO);
    assert_eq!(one.std_dev(), Nanos(8));

    let two = Accumulator::from_raw(2, Nanos::ZERO, Nanos::ZERO, Nanos::ZERO, 50);
    assert_eq!(two.variance(), Nanos(25));

    let three = Accumulator::from_raw(3, Nanos::ZERO, Nanos::ZERO, Nanos::ZERO, 50);
    assert_eq!(three.sample_variance(), Nanos(25));
}

/// Welford's M2 matches the two-pass sum of squares for exact means
#[test]
fn test_m2_matches_two_pass() {
    // Every prefix mean is a whole number, so no truncation occurs
    let samples = [10, 30, 20, 40, 50];
    let mut acc = Accumulator::new();
    fold_all(&mut acc, &samples);

    let mean = samples.iter().sum::<i64>() / samples.len() as i64;
    let two_pass: i64 = samples.iter().map(|s| (s - mean) * (s - mean)).sum();

    assert_eq!(acc.mean(), Nanos(mean));
    assert_eq!(acc.m2(), i128::from(two_pass));
    assert_eq!(acc.variance(), Nanos(two_pass / 5));
    assert_eq!(acc.sample_variance(), Nanos(two_pass / 4));
}

/// A chained accumulator reaches the same state for a single sample
#[test]
fn test_chained_fold_identical_state() {
    let global = Accumulator::new().into_shared();
    let mut local = Accumulator::chained_to(&global);

    local.fold(Nanos(777));

    let global = global.borrow();
    assert_eq!(global.samples(), local.samples());
    assert_eq!(global.mean(), local.mean());
    assert_eq!(global.max(), local.max());
    assert_eq!(global.min(), local.min());
    assert_eq!(global.m2(), local.m2());
}

/// Several per-operation accumulators aggregate into one global
#[test]
fn test_hierarchical_aggregation() {
    let global = Accumulator::new().into_shared();
    let mut reads = Accumulator::chained_to(&global);
    let mut writes = Accumulator::chained_to(&global);

    fold_all(&mut reads, &[10, 20, 30]);
    fold_all(&mut writes, &[100, 200]);

    assert_eq!(reads.samples(), 3);
    assert_eq!(writes.samples(), 2);

    let global = global.borrow();
    assert_eq!(global.samples(), 5);
    assert_eq!(global.min(), Nanos(10));
    assert_eq!(global.max(), Nanos(200));
}

/// The chain does not keep its target alive
#[test]
fn test_chain_is_non_owning() {
    let global = Accumulator::new().into_shared();
    let mut local = Accumulator::chained_to(&global);
    assert_eq!(std::rc::Rc::strong_count(&global), 1);

    drop(global);
    local.fold(Nanos(1));

    assert_eq!(local.samples(), 1);
    assert!(local.chained().is_none());
}

/// Standard deviations agree with floating-point computation on realistic timings
#[test]
fn test_std_dev_close_to_float() {
    let samples: Vec<i64> = (0..500)
        .map(|i| 2_000_000 + ((i * 104_729) % 400_000) - 200_000)
        .collect();
    let mut acc = Accumulator::new();
    fold_all(&mut acc, &samples);

    let n = samples.len() as f64;
    let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / n;
    let ss: f64 = samples.iter().map(|&s| (s as f64 - mean).powi(2)).sum();

    assert_relative_eq!(acc.std_dev().0 as f64, (ss / n).sqrt(), max_relative = 1e-3);
    assert_relative_eq!(
        acc.sample_std_dev().0 as f64,
        (ss / (n - 1.0)).sqrt(),
        max_relative = 1e-3
    );
}
