//! Timeit - running timing statistics
//!
//! This library re-exports the accumulator, duration type and JSON codec
//! from `timeit-core`, and adds the pieces behind the `timeit` command:
//! persistent configuration and repeated timing of external commands.

pub mod cli;
pub mod config;
pub mod runner;

pub use timeit_core::stats;

pub use timeit_core::{Accumulator, CodecError, ExportFlags, Nanos, Record, SharedAccumulator};
pub use timeit_core::VERSION;
