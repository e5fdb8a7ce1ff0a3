//! Timeit Core - Running statistics for timing measurements
//!
//! This library folds a stream of duration samples into count, mean,
//! minimum, maximum and the Welford sum needed for variance and standard
//! deviation, without keeping the samples themselves. Accumulators can be
//! chained so that a per-operation accumulator also feeds a global one.

pub mod stats;

pub use stats::accumulator::{Accumulator, SharedAccumulator};
pub use stats::codec::{CodecError, Record};
pub use stats::flags::ExportFlags;
pub use stats::nanos::Nanos;

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
